//! Douyin Downloader - batch downloader for published Douyin posts.
//!
//! This library drives the full pipeline for each configured account:
//! paginated metadata acquisition, typed extraction with date filtering, a
//! durable dedup ledger with crash recovery, and a concurrency-bounded
//! download pool.
//!
//! # Features
//!
//! - Sequential cursor pagination with per-page retry and date-window early
//!   stop
//! - Image gallery and video post extraction
//! - Append-only completed-download ledger plus a pending-work snapshot, so
//!   an interrupted run resumes where it died
//! - Bounded-concurrency streaming downloads with partial-file cleanup
//! - Scheduled session-cookie refresh during long batches
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use std::time::Duration;
//! use douyin_downloader::{Config, DouyinApi};
//! use douyin_downloader::api::{ConfigCredentials, QuerySigner};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("config.toml"))?;
//!     let credentials = Arc::new(ConfigCredentials::new(config.cookies.clone()));
//!     let api = DouyinApi::new(
//!         credentials,
//!         Arc::new(QuerySigner::default()),
//!         &config.options.user_agent,
//!         Duration::from_secs(config.options.timeout_seconds),
//!     )?;
//!
//!     // ... download logic
//!     Ok(())
//! }
//! ```

pub mod acquire;
pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod ledger;
pub mod media;
pub mod output;
pub mod scheduler;

// Re-exports for convenience
pub use api::DouyinApi;
pub use config::Config;
pub use download::{DownloadExecutor, RunReport};
pub use error::{Error, Result};
pub use ledger::{DownloadRecorder, PendingStore};
pub use media::{MediaKind, PostItem};
pub use scheduler::{BatchStats, Scheduler};
