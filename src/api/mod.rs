//! API module.
//!
//! This module provides:
//! - HTTP client for the posts metadata endpoint and media downloads
//! - Session credential storage and refresh
//! - Request signing seam
//! - Wire types

pub mod client;
pub mod credentials;
pub mod sign;
pub mod types;

use async_trait::async_trait;

pub use client::DouyinApi;
pub use credentials::{ConfigCredentials, CredentialStore};
pub use sign::{QuerySigner, Signer};
pub use types::{PageOutcome, RawPost};

/// Source of paginated post metadata.
///
/// [`DouyinApi`] is the production implementation; tests substitute synthetic
/// sources.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch one page of posts at `cursor` for the given profile id.
    async fn fetch_page(&self, sec_user_id: &str, cursor: i64) -> PageOutcome;
}
