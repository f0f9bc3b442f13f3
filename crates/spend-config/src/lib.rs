//! spend-config
//!
//! Persistent preferences for the spending front end: backend location,
//! request timeout, log filter and display settings.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::{default_base_dir, ConfigManager, API_URL_ENV, HOME_ENV, LOG_ENV};
pub use model::{AccessibilitySettings, Config, Theme};
