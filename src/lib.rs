#![doc(test(attr(deny(warnings))))]

//! Spending App wires the spending backend, the category reconciliation
//! core and the user's configuration into an interactive terminal shell.

pub mod cli;
pub mod errors;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with `filter` and emits a startup info log.
///
/// Only the first call takes effect.
pub fn init(filter: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(filter);
        tracing::info!("Spending App tracing initialized.");
    });
}
