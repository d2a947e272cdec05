//! Normalized post representation.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of a post's media content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Gallery,
    Video,
}

impl MediaKind {
    /// Label used in generated file names.
    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Gallery => "gallery",
            MediaKind::Video => "video",
        }
    }

    /// File extension for downloaded files of this kind.
    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Gallery => "jpeg",
            MediaKind::Video => "mp4",
        }
    }
}

/// A post after extraction: normalized, filtered, ready to download.
///
/// Serialized into the pending snapshot, so resuming a crashed run needs no
/// network round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostItem {
    /// Post id; doubles as the dedup key for all files of this post.
    pub id: String,

    /// Cleaned, length-capped description.
    pub desc: String,

    /// Publish date.
    pub create_date: NaiveDate,

    pub kind: MediaKind,

    /// Download URLs: one per gallery image, exactly one for a video.
    /// Never empty for a retained item.
    pub downloads: Vec<String>,

    /// Sanitized file name stem shared by all files of this post.
    pub file_stem: String,

    /// Extra video metadata, absent for galleries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoMeta>,
}

impl PostItem {
    /// Destination path for the file at `index` (0-based) of this post.
    /// Gallery files get a 1-based suffix; a video is a single unsuffixed file.
    pub fn target_path(&self, folder: &Path, index: usize) -> PathBuf {
        match self.kind {
            MediaKind::Gallery => folder.join(format!(
                "{}_{}.{}",
                self.file_stem,
                index + 1,
                self.kind.extension()
            )),
            MediaKind::Video => folder.join(format!("{}.{}", self.file_stem, self.kind.extension())),
        }
    }
}

/// Video metadata kept alongside the download URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,

    /// Duration formatted `HH:MM:SS`.
    pub duration: String,

    pub width: u32,
    pub height: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<String>,
}

/// Account identity resolved from the first extracted post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAccount {
    /// Numeric account id, used in the destination folder name.
    pub id: String,

    /// Display label: the configured mark, or the nickname when the mark is
    /// empty.
    pub mark: String,
}
