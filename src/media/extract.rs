//! Post extraction and filtering.
//!
//! Turns raw API posts into [`PostItem`]s: required fields gate retention,
//! optional fields degrade to absent, and the caller's date window is applied
//! inclusively at both ends.

use chrono::{DateTime, NaiveDate};

use crate::api::types::{RawPost, VideoInfo};
use crate::config::{NameField, OptionsConfig};
use crate::fs::naming::{collapse_spaces, sanitize_name, truncate_chars};
use crate::media::item::{MediaKind, PostItem, ResolvedAccount, VideoMeta};

/// Fallback nickname when the payload carries none.
const UNKNOWN_NICKNAME: &str = "unknown account";

/// Date format used inside generated file names.
const STEM_DATE_FORMAT: &str = "%Y-%m-%d";

/// Extraction settings derived from the configuration.
pub struct Extractor {
    description_length: usize,
    name_format: Vec<NameField>,
    separator: String,
}

impl Extractor {
    pub fn new(options: &OptionsConfig) -> Self {
        Self {
            description_length: options.description_length,
            name_format: options.name_format.clone(),
            separator: options.name_separator.clone(),
        }
    }

    /// Resolve the account's numeric id and display mark from the first
    /// fetched post. One-time side read; the id is required for the
    /// destination folder name.
    pub fn extract_account(&self, post: &RawPost, configured_mark: &str) -> Option<ResolvedAccount> {
        let author = post.author.as_ref()?;
        let id = author.uid.clone()?;
        let name = sanitize_name(
            author.nickname.as_deref().unwrap_or(""),
            UNKNOWN_NICKNAME,
        );
        let mark = sanitize_name(configured_mark, &name);
        Some(ResolvedAccount { id, mark })
    }

    /// Extract and filter posts. Items missing required fields (id,
    /// timestamp) or yielding no usable download URL are dropped; the date
    /// window is inclusive at both ends.
    pub fn extract_items(
        &self,
        posts: &[RawPost],
        earliest: NaiveDate,
        latest: NaiveDate,
    ) -> Vec<PostItem> {
        posts
            .iter()
            .filter_map(|post| self.extract_item(post, earliest, latest))
            .collect()
    }

    fn extract_item(
        &self,
        post: &RawPost,
        earliest: NaiveDate,
        latest: NaiveDate,
    ) -> Option<PostItem> {
        let id = post.aweme_id.clone()?;
        let create_time = post.create_time?;
        let create_date = DateTime::from_timestamp(create_time, 0)?.date_naive();

        if create_date < earliest || create_date > latest {
            return None;
        }

        let desc = self.clean_description(post.desc.as_deref().unwrap_or(""));

        // Gallery when the images list is present and non-empty, video
        // otherwise. Either way at least one URL must survive extraction.
        let (kind, downloads, video) = match post.images.as_deref() {
            Some(images) if !images.is_empty() => {
                let urls: Vec<String> = images
                    .iter()
                    .filter_map(|image| image.url_list.as_ref()?.first().cloned())
                    .filter(|url| !url.is_empty())
                    .collect();
                if urls.is_empty() {
                    tracing::debug!("Dropping gallery post {} with no usable image URLs", id);
                    return None;
                }
                (MediaKind::Gallery, urls, None)
            }
            _ => {
                let video = post.video.as_ref()?;
                let url = video
                    .play_addr
                    .as_ref()?
                    .url_list
                    .as_ref()?
                    .first()
                    .cloned()
                    .filter(|url| !url.is_empty())?;
                (MediaKind::Video, vec![url], Some(video_meta(video)))
            }
        };

        let file_stem = self.build_stem(&id, &desc, create_date, kind);

        Some(PostItem {
            id,
            desc,
            create_date,
            kind,
            downloads,
            file_stem,
            video,
        })
    }

    fn clean_description(&self, desc: &str) -> String {
        let cleaned = collapse_spaces(&sanitize_name(desc, ""));
        truncate_chars(&cleaned, self.description_length)
    }

    /// Join the configured name fields into the file name stem.
    fn build_stem(&self, id: &str, desc: &str, create_date: NaiveDate, kind: MediaKind) -> String {
        let parts: Vec<String> = self
            .name_format
            .iter()
            .map(|field| match field {
                NameField::CreateTime => create_date.format(STEM_DATE_FORMAT).to_string(),
                NameField::Id => id.to_string(),
                NameField::Type => kind.label().to_string(),
                NameField::Desc => desc.to_string(),
            })
            .filter(|part| !part.is_empty())
            .collect();
        sanitize_name(&parts.join(&self.separator), id)
    }
}

/// Convert a millisecond duration into `HH:MM:SS`.
fn format_duration(duration_ms: i64) -> String {
    let total_seconds = duration_ms.max(0) / 1000;
    format!(
        "{:02}:{:02}:{:02}",
        total_seconds / 3600,
        total_seconds % 3600 / 60,
        total_seconds % 60
    )
}

fn video_meta(video: &VideoInfo) -> VideoMeta {
    VideoMeta {
        uri: video.play_addr.as_ref().and_then(|p| p.uri.clone()),
        duration: format_duration(video.duration.unwrap_or(0)),
        width: video.width.unwrap_or(0),
        height: video.height.unwrap_or(0),
        ratio: video.ratio.clone(),
    }
}
