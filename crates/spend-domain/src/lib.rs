//! spend-domain
//!
//! Pure domain models for the spending profile (category assignments,
//! the reconciled category tree, catalog entries, request bodies).
//! No I/O, no HTTP, no terminal. Only data types and shared traits.

pub mod assignment;
pub mod catalog;
pub mod common;
pub mod tree;

pub use assignment::*;
pub use catalog::*;
pub use common::*;
pub use tree::*;
