//! Wire types for the post metadata API.
//!
//! Every leaf is optional: the payload is deeply nested and the API omits or
//! nulls fields freely. Missing data degrades to `None` during decoding and
//! extraction decides per field whether the post survives.

use serde::Deserialize;

/// One raw post as returned by the metadata endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPost {
    #[serde(default)]
    pub aweme_id: Option<String>,

    #[serde(default)]
    pub desc: Option<String>,

    /// Publish timestamp, seconds since epoch.
    #[serde(default)]
    pub create_time: Option<i64>,

    #[serde(default)]
    pub author: Option<AuthorInfo>,

    /// Present (non-empty) for gallery posts.
    #[serde(default)]
    pub images: Option<Vec<ImageInfo>>,

    /// Present for video posts.
    #[serde(default)]
    pub video: Option<VideoInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorInfo {
    #[serde(default)]
    pub uid: Option<String>,

    #[serde(default)]
    pub nickname: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageInfo {
    #[serde(default)]
    pub url_list: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub play_addr: Option<PlayAddress>,

    /// Duration in milliseconds.
    #[serde(default)]
    pub duration: Option<i64>,

    #[serde(default)]
    pub height: Option<u32>,

    #[serde(default)]
    pub width: Option<u32>,

    #[serde(default)]
    pub ratio: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayAddress {
    #[serde(default)]
    pub url_list: Option<Vec<String>>,

    #[serde(default)]
    pub uri: Option<String>,
}

/// Classified outcome of one page fetch.
#[derive(Debug)]
pub enum PageOutcome {
    /// A successfully fetched and parsed page.
    Page {
        items: Vec<RawPost>,
        /// Pagination position for the next request; a millisecond timestamp
        /// of the oldest post on this page.
        cursor: i64,
        has_more: bool,
    },
    /// Transport failure or malformed response; the same page may be retried.
    Transient,
    /// The account's posts are not visible with the current session.
    Restricted,
}
