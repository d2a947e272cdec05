//! Session credential storage.
//!
//! The core never acquires tokens itself: it consumes an opaque cookie blob
//! and asks for a refresh when the blob has been in use for too long.
//! Long download batches call [`CredentialStore::refresh`] between tasks
//! instead of running a detached timer, which keeps shutdown deterministic.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::error::Result;

/// Holds the current session credential.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// The `msToken` value from the credential blob, if present.
    fn ms_token(&self) -> Option<String>;

    /// The full blob rendered as a `Cookie` header value, if non-empty.
    fn cookie_header(&self) -> Option<String>;

    /// Refresh the credential. The acquisition mechanism (browser
    /// extraction, manual paste) lives outside the core.
    async fn refresh(&self) -> Result<()>;

    /// When the credential was last refreshed.
    fn last_refresh(&self) -> Instant;

    /// Whether the credential has been in use longer than `interval`.
    fn is_stale(&self, interval: Duration) -> bool {
        self.last_refresh().elapsed() >= interval
    }
}

/// Credential store backed by the cookie map from the configuration file.
///
/// `refresh` only re-stamps the clock and logs; an external integration can
/// replace this with a store that actually re-acquires the session.
pub struct ConfigCredentials {
    cookies: RwLock<HashMap<String, String>>,
    refreshed_at: RwLock<Instant>,
}

impl ConfigCredentials {
    pub fn new(cookies: HashMap<String, String>) -> Self {
        Self {
            cookies: RwLock::new(cookies),
            refreshed_at: RwLock::new(Instant::now()),
        }
    }
}

#[async_trait]
impl CredentialStore for ConfigCredentials {
    fn ms_token(&self) -> Option<String> {
        self.cookies.read().unwrap().get("msToken").cloned()
    }

    fn cookie_header(&self) -> Option<String> {
        let cookies = self.cookies.read().unwrap();
        if cookies.is_empty() {
            return None;
        }
        let mut pairs: Vec<String> =
            cookies.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        pairs.sort();
        Some(pairs.join("; "))
    }

    async fn refresh(&self) -> Result<()> {
        tracing::debug!("Credential refresh requested");
        *self.refreshed_at.write().unwrap() = Instant::now();
        Ok(())
    }

    fn last_refresh(&self) -> Instant {
        *self.refreshed_at.read().unwrap()
    }
}
