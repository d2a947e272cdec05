//! Path and directory management.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{Error, Result};

/// Folder suffix appended to every account download folder.
const FOLDER_SUFFIX: &str = "posts";

/// Build the download folder for an account: `UID<id>_<mark>_posts`.
pub fn account_folder(root: &Path, account_id: &str, account_mark: &str) -> PathBuf {
    root.join(format!("UID{}_{}_{}", account_id, account_mark, FOLDER_SUFFIX))
}

/// Create a directory and all parents if missing.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Process-local cache directory holding the download ledger and the pending
/// snapshot. Created on first use.
pub fn cache_dir() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "douyin-downloader").ok_or(Error::NoCacheDir)?;
    let dir = dirs.cache_dir().to_path_buf();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
