//! spend-core
//!
//! Category-tree reconciliation and the state around it for the spending view.
//! Depends on spend-domain. No terminal I/O, no concrete HTTP client: the
//! backend is reached through the [`SpendingBackend`] trait.

pub mod backend;
pub mod coordinator;
pub mod edit_session;
pub mod eligibility;
pub mod error;
pub mod reconcile;
pub mod store;

pub use backend::*;
pub use coordinator::*;
pub use edit_session::*;
pub use eligibility::*;
pub use error::*;
pub use reconcile::*;
pub use store::*;

#[cfg(test)]
mod tests;
