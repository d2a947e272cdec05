//! Pending-work snapshot for crash recovery.
//!
//! Written after extraction and before downloads begin for an account. Its
//! presence at startup means the previous run exited uncleanly; the
//! orchestrator then re-runs the download stage directly on the snapshotted
//! items instead of re-acquiring from the network.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::media::{PostItem, ResolvedAccount};

/// File name of the snapshot inside the cache directory.
pub const SNAPSHOT_FILE: &str = "pending.json";

/// Extracted-but-not-yet-downloaded items for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingSnapshot {
    pub account: ResolvedAccount,
    pub items: Vec<PostItem>,
}

/// Durable storage for the pending snapshot.
pub struct PendingStore {
    path: PathBuf,
}

impl PendingStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Persist the snapshot, replacing any previous one.
    pub fn save(&self, snapshot: &PendingSnapshot) -> Result<()> {
        let json = serde_json::to_vec(snapshot)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Load the snapshot if one exists. A corrupt file is reported and
    /// treated as absent rather than blocking startup.
    pub fn load(&self) -> Option<PendingSnapshot> {
        let content = match std::fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!("Could not read pending snapshot: {}", e);
                return None;
            }
        };
        match serde_json::from_slice(&content) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("Pending snapshot is corrupt, ignoring it: {}", e);
                None
            }
        }
    }

    /// Delete the snapshot. Called only on a clean shutdown.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
