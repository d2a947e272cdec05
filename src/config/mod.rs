//! Configuration module.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Validation and account resolution (profile ids, date windows)

pub mod loader;
pub mod validation;

pub use loader::{AccountConfig, Config, NameField, OptionsConfig};
pub use validation::{platform_epoch, resolve_accounts, validate_config, Account};
