//! Media module for post normalization and extraction.

pub mod extract;
pub mod item;

pub use extract::Extractor;
pub use item::{MediaKind, PostItem, ResolvedAccount, VideoMeta};
