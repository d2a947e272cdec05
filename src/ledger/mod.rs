//! Progress ledger: durable dedup record and crash-recovery snapshot.
//!
//! Both files live in a process-local cache directory and are deleted only on
//! a clean shutdown of the whole batch. The dedup record is a single-run
//! crash-recovery aid, not a permanent download history: a later invocation
//! starts clean and re-checks only the files already on disk.

pub mod recorder;
pub mod snapshot;

pub use recorder::{DownloadRecorder, RECORD_FILE};
pub use snapshot::{PendingSnapshot, PendingStore, SNAPSHOT_FILE};
