//! Filesystem module.
//!
//! Provides:
//! - Path and directory management
//! - Filename sanitization

pub mod naming;
pub mod paths;

pub use naming::{collapse_spaces, sanitize_name, truncate_chars};
pub use paths::{account_folder, cache_dir, ensure_dir};
