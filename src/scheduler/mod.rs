//! Batch orchestration.
//!
//! Sequences credential → acquisition → extraction → snapshot → download per
//! account, and across accounts. Accounts are processed one at a time: each
//! account's downloads finish before the next acquisition starts, which keeps
//! the dedup-before-download ordering trivially correct.
//!
//! On startup a leftover pending snapshot means the previous run died
//! mid-download; its items are completed first, straight from disk, before
//! any network acquisition. On a clean batch exit both ledger files are
//! deleted so the next invocation starts with empty dedup history.

use std::path::PathBuf;
use std::sync::Arc;

use crate::acquire::Acquirer;
use crate::api::{CredentialStore, PostSource};
use crate::config::{Account, OptionsConfig};
use crate::download::{DownloadExecutor, ExecutorOptions, RunReport};
use crate::error::{Error, Result};
use crate::fs::account_folder;
use crate::ledger::{DownloadRecorder, PendingSnapshot, PendingStore};
use crate::media::Extractor;
use crate::output::{print_account_stats, print_info, print_warning, ProgressObserver};

/// Aggregated counters across the whole batch.
#[derive(Debug, Default)]
pub struct BatchStats {
    pub accounts_processed: u64,
    pub accounts_failed: u64,
    pub files_downloaded: u64,
    pub files_skipped: u64,
    pub files_failed: u64,
}

impl BatchStats {
    fn absorb(&mut self, report: &RunReport) {
        self.files_downloaded += report.downloaded;
        self.files_skipped += report.skipped;
        self.files_failed += report.failed.len() as u64;
    }
}

/// Drives the whole batch.
pub struct Scheduler<S: PostSource> {
    source: Arc<S>,
    accounts: Vec<Account>,
    save_folder: PathBuf,
    retry_limit: u32,
    extractor: Extractor,
    executor: DownloadExecutor,
    recorder: Arc<DownloadRecorder>,
    pending: PendingStore,
}

impl<S: PostSource> Scheduler<S> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: Arc<S>,
        accounts: Vec<Account>,
        save_folder: PathBuf,
        options: &OptionsConfig,
        recorder: Arc<DownloadRecorder>,
        pending: PendingStore,
        credentials: Arc<dyn CredentialStore>,
        observer: Arc<dyn ProgressObserver>,
    ) -> Result<Self> {
        let executor = DownloadExecutor::new(
            Arc::clone(&recorder),
            credentials,
            observer,
            ExecutorOptions::from_config(options),
        )?;

        Ok(Self {
            source,
            accounts,
            save_folder,
            retry_limit: options.retry_limit,
            extractor: Extractor::new(options),
            executor,
            recorder,
            pending,
        })
    }

    /// Run the batch to completion.
    ///
    /// Account-level failures are reported and skipped; fatal errors
    /// (configuration, filesystem) abort immediately, leaving the ledger in
    /// place for the next run to resume from.
    pub async fn run(&self) -> Result<BatchStats> {
        let known = self.recorder.load()?;
        if known > 0 {
            tracing::debug!("Loaded {} completed-download records", known);
        }

        let mut stats = BatchStats::default();

        if let Some(snapshot) = self.pending.load() {
            print_info(&format!(
                "Previous run exited uncleanly; finishing {} pending items for {}",
                snapshot.items.len(),
                snapshot.account.mark
            ));
            let folder =
                account_folder(&self.save_folder, &snapshot.account.id, &snapshot.account.mark);
            let report = self.executor.run(&snapshot.items, &folder).await?;
            print_account_stats(&snapshot.account.mark, &report);
            stats.absorb(&report);
        }

        for (number, account) in self.accounts.iter().enumerate() {
            print_info(&format!(
                "Processing account {} of {}",
                number + 1,
                self.accounts.len()
            ));
            match self.process_account(account).await {
                Ok((mark, report)) => {
                    print_account_stats(&mark, &report);
                    stats.absorb(&report);
                    stats.accounts_processed += 1;
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    print_warning(&format!("Account skipped: {}", e));
                    stats.accounts_failed += 1;
                }
            }
        }

        // Clean shutdown: the ledger is a crash-recovery aid for this run,
        // not a permanent download history.
        self.recorder.clear()?;
        self.pending.clear()?;

        Ok(stats)
    }

    async fn process_account(&self, account: &Account) -> Result<(String, RunReport)> {
        let acquirer = Acquirer::new(self.source.as_ref(), self.retry_limit);
        let acquired = acquirer
            .acquire_all(&account.sec_user_id, account.earliest)
            .await;
        let posts = acquired.posts;
        if posts.is_empty() {
            if acquired.restricted {
                return Err(Error::Restricted(format!(
                    "{}; a logged-in session following this account is required",
                    account.sec_user_id
                )));
            }
            return Err(Error::Api(
                "no posts acquired; try again later".to_string(),
            ));
        }

        let resolved = self
            .extractor
            .extract_account(&posts[0], &account.mark)
            .ok_or_else(|| {
                Error::Api("could not resolve account identity from the first post".to_string())
            })?;
        print_info(&format!(
            "Account mark: {}; account id: {}",
            resolved.mark, resolved.id
        ));

        let items = self
            .extractor
            .extract_items(&posts, account.earliest, account.latest);
        if items.is_empty() {
            return Err(Error::Api(
                "no posts within the requested date window".to_string(),
            ));
        }

        // Durability checkpoint: from here on a crash resumes straight into
        // the download stage.
        self.pending.save(&PendingSnapshot {
            account: resolved.clone(),
            items: items.clone(),
        })?;

        let folder = account_folder(&self.save_folder, &resolved.id, &resolved.mark);
        let report = self.executor.run(&items, &folder).await?;
        Ok((resolved.mark, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ConfigCredentials, PageOutcome};
    use crate::config::platform_epoch;
    use crate::ledger::{RECORD_FILE, SNAPSHOT_FILE};
    use crate::media::{MediaKind, PostItem, ResolvedAccount};
    use crate::output::NoopObserver;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::net::SocketAddr;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn spawn_server(body: Vec<u8>, responses: usize) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            for _ in 0..responses {
                let Ok((mut sock, _)) = listener.accept().await else {
                    return;
                };
                let mut buf = [0u8; 2048];
                let _ = sock.read(&mut buf).await;
                let head = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = sock.write_all(head.as_bytes()).await;
                let _ = sock.write_all(&body).await;
                let _ = sock.shutdown().await;
            }
        });
        addr
    }

    /// Source that fails every fetch but asserts the pending snapshot's file
    /// was already downloaded before any acquisition happened.
    struct OrderCheckingSource {
        expected_file: PathBuf,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl PostSource for OrderCheckingSource {
        async fn fetch_page(&self, _sec_user_id: &str, _cursor: i64) -> PageOutcome {
            assert!(
                self.expected_file.exists(),
                "acquisition started before pending downloads finished"
            );
            self.fetches.fetch_add(1, Ordering::SeqCst);
            PageOutcome::Restricted
        }
    }

    fn account() -> Account {
        Account {
            mark: String::new(),
            sec_user_id: "sec_abc".into(),
            earliest: platform_epoch(),
            latest: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        }
    }

    fn snapshot_item(url: String) -> PostItem {
        PostItem {
            id: "100".into(),
            desc: String::new(),
            create_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            kind: MediaKind::Video,
            downloads: vec![url],
            file_stem: "stem".into(),
            video: None,
        }
    }

    fn scheduler_with<S: PostSource>(
        source: Arc<S>,
        accounts: Vec<Account>,
        dir: &Path,
    ) -> Scheduler<S> {
        let recorder = Arc::new(DownloadRecorder::new(dir.join(RECORD_FILE)));
        let pending = PendingStore::new(dir.join(SNAPSHOT_FILE));
        Scheduler::new(
            source,
            accounts,
            dir.join("saves"),
            &OptionsConfig::default(),
            recorder,
            pending,
            Arc::new(ConfigCredentials::new(Default::default())),
            Arc::new(NoopObserver),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_resume_runs_before_acquisition() {
        let tmp = tempfile::tempdir().unwrap();
        let body = b"resumed bytes".to_vec();
        let addr = spawn_server(body.clone(), 1).await;

        // Leftover snapshot from an "unclean" previous run.
        let pending = PendingStore::new(tmp.path().join(SNAPSHOT_FILE));
        pending
            .save(&PendingSnapshot {
                account: ResolvedAccount {
                    id: "42".into(),
                    mark: "somebody".into(),
                },
                items: vec![snapshot_item(format!("http://{}/v.mp4", addr))],
            })
            .unwrap();

        let expected_file = tmp
            .path()
            .join("saves/UID42_somebody_posts/stem.mp4");
        let source = Arc::new(OrderCheckingSource {
            expected_file: expected_file.clone(),
            fetches: AtomicUsize::new(0),
        });

        let scheduler = scheduler_with(Arc::clone(&source), vec![account()], tmp.path());
        let stats = scheduler.run().await.unwrap();

        assert_eq!(std::fs::read(&expected_file).unwrap(), body);
        assert_eq!(stats.files_downloaded, 1);
        // The configured account was still attempted (and failed as
        // restricted), after the resume.
        assert!(source.fetches.load(Ordering::SeqCst) > 0);
        assert_eq!(stats.accounts_failed, 1);
    }

    #[tokio::test]
    async fn test_restricted_account_reported_as_restricted() {
        let tmp = tempfile::tempdir().unwrap();
        let source = Arc::new(OrderCheckingSource {
            // The tmp dir itself, so the ordering assertion always holds.
            expected_file: tmp.path().to_path_buf(),
            fetches: AtomicUsize::new(0),
        });

        let scheduler = scheduler_with(source, vec![account()], tmp.path());
        let err = scheduler.process_account(&account()).await.unwrap_err();
        assert!(matches!(err, Error::Restricted(_)));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_clean_exit_clears_ledger_state() {
        let tmp = tempfile::tempdir().unwrap();

        // Pre-existing dedup records from this run.
        let recorder = DownloadRecorder::new(tmp.path().join(RECORD_FILE));
        recorder.load().unwrap();
        recorder.mark_complete("old").unwrap();
        drop(recorder);

        let source = Arc::new(OrderCheckingSource {
            expected_file: tmp.path().join("never-checked"),
            fetches: AtomicUsize::new(0),
        });
        let scheduler = scheduler_with(source, Vec::new(), tmp.path());
        scheduler.run().await.unwrap();

        assert!(!tmp.path().join(RECORD_FILE).exists());
        assert!(!tmp.path().join(SNAPSHOT_FILE).exists());
    }
}
