//! Download task generation.

use std::path::{Path, PathBuf};

use crate::ledger::DownloadRecorder;
use crate::media::{MediaKind, PostItem};

/// One file to fetch.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    pub url: String,
    pub path: PathBuf,
    /// Human-readable label used in progress events and reports.
    pub label: String,
    /// Key recorded in the ledger once the file is fully written. Gallery
    /// siblings share their parent post id, so a crash mid-gallery re-attempts
    /// only the files that are actually missing on disk.
    pub dedup_key: String,
}

/// Total number of files the item list would produce without skips.
pub fn count_targets(items: &[PostItem]) -> usize {
    items.iter().map(|item| item.downloads.len()).sum()
}

/// Map items to download tasks, dropping files that are already satisfied.
///
/// Two independent skip conditions, checked in no particular order: the dedup
/// key is in the ledger, or the destination file already exists with the
/// expected name.
pub fn generate_tasks(
    items: &[PostItem],
    folder: &Path,
    recorder: &DownloadRecorder,
    show_skipped: bool,
) -> Vec<DownloadTask> {
    let mut tasks = Vec::new();

    for item in items {
        for (index, url) in item.downloads.iter().enumerate() {
            let path = item.target_path(folder, index);
            let label = match item.kind {
                MediaKind::Gallery => format!("gallery {}_{}", item.id, index + 1),
                MediaKind::Video => format!("video {}", item.id),
            };

            let recorded = recorder.contains(&item.id);
            let on_disk = path.exists();
            if recorded || on_disk {
                if show_skipped {
                    tracing::info!(
                        "Skipping {}: {}",
                        label,
                        if recorded {
                            "download record exists"
                        } else {
                            "file already on disk"
                        }
                    );
                }
                continue;
            }

            tasks.push(DownloadTask {
                url: url.clone(),
                path,
                label,
                dedup_key: item.id.clone(),
            });
        }
    }

    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::RECORD_FILE;
    use chrono::NaiveDate;

    fn gallery_item(id: &str, urls: &[&str]) -> PostItem {
        PostItem {
            id: id.to_string(),
            desc: String::new(),
            create_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            kind: MediaKind::Gallery,
            downloads: urls.iter().map(|u| u.to_string()).collect(),
            file_stem: format!("stem-{}", id),
            video: None,
        }
    }

    fn video_item(id: &str) -> PostItem {
        PostItem {
            id: id.to_string(),
            desc: String::new(),
            create_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            kind: MediaKind::Video,
            downloads: vec![format!("https://v.example/{}.mp4", id)],
            file_stem: format!("stem-{}", id),
            video: None,
        }
    }

    fn empty_recorder(dir: &Path) -> DownloadRecorder {
        let recorder = DownloadRecorder::new(dir.join(RECORD_FILE));
        recorder.load().unwrap();
        recorder
    }

    #[test]
    fn test_one_task_per_file() {
        let tmp = tempfile::tempdir().unwrap();
        let recorder = empty_recorder(tmp.path());
        let items = vec![gallery_item("g1", &["u1", "u2", "u3"]), video_item("v1")];

        let tasks = generate_tasks(&items, tmp.path(), &recorder, false);
        assert_eq!(tasks.len(), 4);
        assert_eq!(count_targets(&items), 4);
        assert_eq!(tasks[0].path, tmp.path().join("stem-g1_1.jpeg"));
        assert_eq!(tasks[2].path, tmp.path().join("stem-g1_3.jpeg"));
        assert_eq!(tasks[3].path, tmp.path().join("stem-v1.mp4"));
        assert!(tasks.iter().take(3).all(|t| t.dedup_key == "g1"));
    }

    #[test]
    fn test_ledger_membership_skips_all_files() {
        // Dedup idempotence: with every key recorded, a second run
        // produces zero tasks and therefore zero network requests.
        let tmp = tempfile::tempdir().unwrap();
        let recorder = empty_recorder(tmp.path());
        recorder.mark_complete("g1").unwrap();
        recorder.mark_complete("v1").unwrap();
        let items = vec![gallery_item("g1", &["u1", "u2"]), video_item("v1")];

        let tasks = generate_tasks(&items, tmp.path(), &recorder, false);
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_existing_file_skips_only_that_file() {
        let tmp = tempfile::tempdir().unwrap();
        let recorder = empty_recorder(tmp.path());
        std::fs::write(tmp.path().join("stem-g1_1.jpeg"), b"data").unwrap();
        let items = vec![gallery_item("g1", &["u1", "u2"])];

        let tasks = generate_tasks(&items, tmp.path(), &recorder, false);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].path, tmp.path().join("stem-g1_2.jpeg"));
    }
}
