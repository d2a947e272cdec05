//! HTTP client for the post metadata API and for media file downloads.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::{header, Client};
use serde_json::Value;
use tokio::time::sleep;

use crate::api::credentials::CredentialStore;
use crate::api::sign::Signer;
use crate::api::types::{PageOutcome, RawPost};
use crate::api::PostSource;
use crate::error::{Error, Result};

/// Published-posts metadata endpoint.
const POST_API: &str = "https://www.douyin.com/aweme/v1/web/aweme/post/";

/// Referer sent with every request.
const REFERER: &str = "https://www.douyin.com/";

/// Anti-burst sleep bounds after each metadata request, in milliseconds.
/// A fixed randomized delay, not adaptive backoff.
const ANTI_BURST_MS: (u64, u64) = (1500, 4500);

/// Metadata API client. Issues one paginated posts request at a time; media
/// file downloads live in the download executor, which carries its own
/// timeout policy.
pub struct DouyinApi {
    client: Client,
    credentials: Arc<dyn CredentialStore>,
    signer: Arc<dyn Signer>,
}

impl DouyinApi {
    /// Create a new API client.
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        signer: Arc<dyn Signer>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::REFERER,
            REFERER.parse().expect("static referer header"),
        );

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            credentials,
            signer,
        })
    }

    /// Fixed query parameter set for one posts page.
    fn build_params(&self, sec_user_id: &str, cursor: i64) -> Vec<(String, String)> {
        let pairs: &[(&str, String)] = &[
            ("device_platform", "webapp".into()),
            ("aid", "6383".into()),
            ("channel", "channel_pc_web".into()),
            ("sec_user_id", sec_user_id.into()),
            ("max_cursor", cursor.to_string()),
            ("locate_query", "false".into()),
            ("show_live_replay_strategy", "1".into()),
            ("need_time_list", if cursor == 0 { "1" } else { "0" }.into()),
            ("time_list_query", "0".into()),
            ("whale_cut_token", String::new()),
            ("cut_version", "1".into()),
            ("count", "18".into()),
            ("publish_video_strategy_type", "2".into()),
            ("pc_client_type", "1".into()),
            ("version_code", "170400".into()),
            ("version_name", "17.4.0".into()),
            ("cookie_enabled", "true".into()),
            ("platform", "PC".into()),
            ("downlink", "10".into()),
        ];
        let mut params: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();

        if let Some(token) = self.credentials.ms_token() {
            params.push(("msToken".to_string(), token));
        }
        let signature = self.signer.sign(&params);
        params.push(("a_bogus".to_string(), signature));
        params
    }

    async fn fetch_page_attempt(&self, sec_user_id: &str, cursor: i64) -> PageOutcome {
        let params = self.build_params(sec_user_id, cursor);

        let mut request = self.client.get(POST_API).query(&params);
        if let Some(cookie) = self.credentials.cookie_header() {
            request = request.header(header::COOKIE, cookie);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Posts page request failed: {}", e);
                return PageOutcome::Transient;
            }
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Posts page body read failed: {}", e);
                return PageOutcome::Transient;
            }
        };
        tracing::debug!("Posts page response: HTTP {}, {} bytes", status, body.len());

        classify_page_body(&body)
    }

    async fn anti_burst(&self) {
        let (low, high) = ANTI_BURST_MS;
        let delay = rand::thread_rng().gen_range(low..=high);
        sleep(Duration::from_millis(delay)).await;
    }
}

#[async_trait]
impl PostSource for DouyinApi {
    /// Fetch one posts page, then sleep the anti-burst interval regardless
    /// of outcome.
    async fn fetch_page(&self, sec_user_id: &str, cursor: i64) -> PageOutcome {
        let outcome = self.fetch_page_attempt(sec_user_id, cursor).await;
        self.anti_burst().await;
        outcome
    }
}

/// Classify a metadata response body.
///
/// - unparsable JSON: `Transient` (empty body usually means a stale session)
/// - `aweme_list: null`: `Restricted`
/// - expected keys missing: `Transient` (a one-off anomaly, bounded by the
///   caller's retry budget)
fn classify_page_body(body: &str) -> PageOutcome {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => {
            if body.is_empty() {
                tracing::warn!("Empty response body; the session cookie may have expired");
            } else {
                tracing::warn!("Response body is not valid JSON");
            }
            return PageOutcome::Transient;
        }
    };

    let items = match value.get("aweme_list") {
        Some(Value::Null) => {
            tracing::warn!(
                "Posts are restricted; a logged-in session following this account is required"
            );
            return PageOutcome::Restricted;
        }
        Some(list) => match serde_json::from_value::<Vec<RawPost>>(list.clone()) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!("Unexpected aweme_list shape: {}", e);
                return PageOutcome::Transient;
            }
        },
        None => {
            tracing::warn!("Response is missing aweme_list");
            return PageOutcome::Transient;
        }
    };

    let Some(cursor) = value.get("max_cursor").and_then(Value::as_i64) else {
        tracing::warn!("Response is missing max_cursor");
        return PageOutcome::Transient;
    };

    let has_more = match value.get("has_more") {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0) != 0,
        _ => {
            tracing::warn!("Response is missing has_more");
            return PageOutcome::Transient;
        }
    };

    PageOutcome::Page {
        items,
        cursor,
        has_more,
    }
}
