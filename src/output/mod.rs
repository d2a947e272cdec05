//! Output module.
//!
//! Provides:
//! - Styled console messages
//! - The abstract download progress observer and its renderers
//! - Statistics printing

pub mod console;
pub mod observer;
pub mod stats;

pub use console::{
    print_banner, print_config_summary, print_error, print_info, print_warning,
};
pub use observer::{IndicatifObserver, NoopObserver, ProgressObserver};
pub use stats::{print_account_stats, print_batch_stats};
