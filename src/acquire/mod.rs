//! Account catalog acquisition.
//!
//! Drives the page fetcher in a strictly sequential loop: page N+1 depends on
//! page N's cursor, so there is no parallelism here. Failures never surface
//! as errors; acquisition returns whatever was collected and lets the caller
//! treat a short result as "try again later".

use chrono::{DateTime, NaiveDate};

use crate::api::{PageOutcome, PostSource, RawPost};

/// Result of one account's acquisition pass.
#[derive(Debug, Default)]
pub struct Acquisition {
    /// Everything collected before pagination stopped; possibly partial.
    pub posts: Vec<RawPost>,
    /// Whether pagination ended because the account's posts are not visible
    /// with the current session.
    pub restricted: bool,
}

/// Paginates through an account's published posts.
pub struct Acquirer<'a, S: PostSource> {
    source: &'a S,
    /// Attempts per page, including the first.
    retry_limit: u32,
}

impl<'a, S: PostSource> Acquirer<'a, S> {
    pub fn new(source: &'a S, retry_limit: u32) -> Self {
        Self {
            source,
            retry_limit: retry_limit.max(1),
        }
    }

    /// Fetch all pages for an account, oldest-bounded by `earliest`.
    ///
    /// Stops when the server reports no more pages, when the account turns
    /// out to be restricted, when a page exhausts its retry budget, or when
    /// the cursor has moved past the requested date window (early stop: all
    /// remaining posts are guaranteed older than `earliest`).
    pub async fn acquire_all(&self, sec_user_id: &str, earliest: NaiveDate) -> Acquisition {
        let mut acquired = Acquisition::default();
        let mut cursor = 0i64;

        loop {
            match self.fetch_page_with_retry(sec_user_id, cursor).await {
                PageOutcome::Page {
                    items: page,
                    cursor: next_cursor,
                    has_more,
                } => {
                    tracing::debug!(
                        "Fetched page at cursor {}: {} items",
                        cursor,
                        page.len()
                    );
                    acquired.posts.extend(page);
                    cursor = next_cursor;

                    if !has_more {
                        break;
                    }
                    if cursor_before(cursor, earliest) {
                        tracing::debug!(
                            "Early stop: cursor {} is before earliest date {}",
                            cursor,
                            earliest
                        );
                        break;
                    }
                }
                PageOutcome::Transient => {
                    tracing::warn!(
                        "Page at cursor {} failed {} times, stopping acquisition",
                        cursor,
                        self.retry_limit
                    );
                    break;
                }
                PageOutcome::Restricted => {
                    acquired.restricted = true;
                    break;
                }
            }
        }

        tracing::info!("Acquired {} posts for account", acquired.posts.len());
        acquired
    }

    /// Retry the same page on `Transient` up to the retry budget.
    async fn fetch_page_with_retry(&self, sec_user_id: &str, cursor: i64) -> PageOutcome {
        for attempt in 1..=self.retry_limit {
            match self.source.fetch_page(sec_user_id, cursor).await {
                PageOutcome::Transient if attempt < self.retry_limit => {
                    tracing::debug!(
                        "Transient failure at cursor {} (attempt {}/{})",
                        cursor,
                        attempt,
                        self.retry_limit
                    );
                }
                outcome => return outcome,
            }
        }
        PageOutcome::Transient
    }
}

/// Whether a millisecond cursor timestamp falls before `earliest`.
fn cursor_before(cursor_ms: i64, earliest: NaiveDate) -> bool {
    DateTime::from_timestamp_millis(cursor_ms)
        .map(|dt| dt.date_naive() < earliest)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn post(id: &str, create_time: i64) -> RawPost {
        RawPost {
            aweme_id: Some(id.to_string()),
            create_time: Some(create_time),
            ..Default::default()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Serves a scripted sequence of pages, counting fetches.
    struct ScriptedSource {
        pages: Mutex<Vec<PageOutcome>>,
        fetches: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(pages: Vec<PageOutcome>) -> Self {
            Self {
                pages: Mutex::new(pages),
                fetches: AtomicUsize::new(0),
            }
        }

        fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PostSource for ScriptedSource {
        async fn fetch_page(&self, _sec_user_id: &str, _cursor: i64) -> PageOutcome {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let mut pages = self.pages.lock().unwrap();
            if pages.is_empty() {
                PageOutcome::Transient
            } else {
                pages.remove(0)
            }
        }
    }

    // Millisecond timestamp for midday on a given date.
    fn midday_ms(y: i32, m: u32, d: u32) -> i64 {
        date(y, m, d)
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
            .timestamp_millis()
    }

    #[tokio::test]
    async fn test_accumulates_all_pages() {
        let source = ScriptedSource::new(vec![
            PageOutcome::Page {
                items: vec![post("1", 0), post("2", 0)],
                cursor: midday_ms(2024, 6, 1),
                has_more: true,
            },
            PageOutcome::Page {
                items: vec![post("3", 0)],
                cursor: midday_ms(2024, 5, 1),
                has_more: false,
            },
        ]);

        let acquired = Acquirer::new(&source, 5)
            .acquire_all("user", date(2024, 1, 1))
            .await;
        assert_eq!(acquired.posts.len(), 3);
        assert!(!acquired.restricted);
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_early_stop_skips_pages_outside_window() {
        // Page timestamps strictly decreasing; the second page's cursor is
        // already before the earliest date, so no third fetch may happen
        // even though the server reports more pages.
        let source = ScriptedSource::new(vec![
            PageOutcome::Page {
                items: vec![post("1", 0)],
                cursor: midday_ms(2024, 3, 1),
                has_more: true,
            },
            PageOutcome::Page {
                items: vec![post("2", 0)],
                cursor: midday_ms(2023, 12, 1),
                has_more: true,
            },
            PageOutcome::Page {
                items: vec![post("3", 0)],
                cursor: midday_ms(2023, 11, 1),
                has_more: true,
            },
        ]);

        let acquired = Acquirer::new(&source, 5)
            .acquire_all("user", date(2024, 1, 1))
            .await;
        assert_eq!(acquired.posts.len(), 2);
        assert_eq!(source.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_retry_budget_exhaustion() {
        // Always-transient source: attempted exactly retry_limit times,
        // then acquisition ends quietly with nothing collected.
        let source = ScriptedSource::new(vec![]);
        let acquired = Acquirer::new(&source, 5)
            .acquire_all("user", date(2024, 1, 1))
            .await;
        assert!(acquired.posts.is_empty());
        assert!(!acquired.restricted);
        assert_eq!(source.fetch_count(), 5);
    }

    #[tokio::test]
    async fn test_transient_then_success_retries_same_page() {
        let source = ScriptedSource::new(vec![
            PageOutcome::Transient,
            PageOutcome::Transient,
            PageOutcome::Page {
                items: vec![post("1", 0)],
                cursor: midday_ms(2024, 6, 1),
                has_more: false,
            },
        ]);

        let acquired = Acquirer::new(&source, 5)
            .acquire_all("user", date(2024, 1, 1))
            .await;
        assert_eq!(acquired.posts.len(), 1);
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_restricted_returns_partial_result() {
        let source = ScriptedSource::new(vec![
            PageOutcome::Page {
                items: vec![post("1", 0)],
                cursor: midday_ms(2024, 6, 1),
                has_more: true,
            },
            PageOutcome::Restricted,
        ]);

        let acquired = Acquirer::new(&source, 5)
            .acquire_all("user", date(2024, 1, 1))
            .await;
        assert_eq!(acquired.posts.len(), 1);
        assert!(acquired.restricted);
    }
}
