//! Durable record of completed downloads.
//!
//! An append-only text file of dedup keys, one per line. A key is appended
//! only after the corresponding file is fully on disk, and each append is
//! flushed immediately so a crash right after a file write is still visible
//! on the next run. Reads may come from concurrent download tasks; writes are
//! serialized behind the same lock.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Result;

/// File name of the dedup record inside the cache directory.
pub const RECORD_FILE: &str = "IDRecorder.txt";

struct Inner {
    records: HashSet<String>,
    file: Option<File>,
}

/// Append-only set of completed-download dedup keys.
pub struct DownloadRecorder {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl DownloadRecorder {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            inner: Mutex::new(Inner {
                records: HashSet::new(),
                file: None,
            }),
        }
    }

    /// Read existing keys from disk. A missing file means an empty set, not
    /// an error.
    pub fn load(&self) -> Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        inner.records = match std::fs::read_to_string(&self.path) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(inner.records.len())
    }

    /// Whether a key is recorded as completed.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().unwrap().records.contains(key)
    }

    /// Record a key as completed and flush it to disk before returning.
    pub fn mark_complete(&self, key: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.records.insert(key.to_string()) {
            return Ok(());
        }
        if inner.file.is_none() {
            inner.file = Some(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.path)?,
            );
        }
        let file = inner.file.as_mut().unwrap();
        writeln!(file, "{}", key)?;
        file.sync_data()?;
        Ok(())
    }

    /// Delete the record file and forget all keys. Called only on a clean
    /// shutdown of the whole batch.
    pub fn clear(&self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.records.clear();
        inner.file = None;
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
