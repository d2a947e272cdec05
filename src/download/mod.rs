//! Download module.
//!
//! This module provides:
//! - Mapping of extracted items to per-file download tasks
//! - The concurrency-bounded, retrying download executor

pub mod executor;
pub mod task;

pub use executor::{DownloadExecutor, ExecutorOptions, RunReport};
pub use task::{count_targets, generate_tasks, DownloadTask};
