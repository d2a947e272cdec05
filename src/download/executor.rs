//! Concurrency-bounded download executor.
//!
//! Runs download tasks under a fixed-width pool, retries each task within a
//! bounded budget, streams bodies to disk chunk by chunk, and records every
//! completed file in the ledger. A failed task never aborts its siblings.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use reqwest::{header, Client, Response};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::api::CredentialStore;
use crate::config::OptionsConfig;
use crate::download::task::{count_targets, generate_tasks, DownloadTask};
use crate::error::{Error, Result};
use crate::fs::ensure_dir;
use crate::ledger::DownloadRecorder;
use crate::media::PostItem;
use crate::output::ProgressObserver;

/// Referer required by the media CDN.
const REFERER: &str = "https://www.douyin.com/";

/// Executor tunables.
#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    pub max_workers: usize,
    pub retry_limit: u32,
    pub refresh_interval: Duration,
    pub timeout: Duration,
    pub show_skipped: bool,
    pub user_agent: String,
}

impl ExecutorOptions {
    pub fn from_config(options: &OptionsConfig) -> Self {
        Self {
            max_workers: options.max_workers.max(1),
            retry_limit: options.retry_limit.max(1),
            refresh_interval: Duration::from_secs(options.cookie_refresh_seconds),
            timeout: Duration::from_secs(options.timeout_seconds),
            show_skipped: options.show_skipped,
            user_agent: options.user_agent.clone(),
        }
    }
}

/// Outcome of one executor run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub downloaded: u64,
    pub skipped: u64,
    /// Labels of tasks that exhausted their retry budget.
    pub failed: Vec<String>,
}

/// Downloads the files of extracted post items.
pub struct DownloadExecutor {
    client: Client,
    recorder: Arc<DownloadRecorder>,
    credentials: Arc<dyn CredentialStore>,
    observer: Arc<dyn ProgressObserver>,
    options: ExecutorOptions,
}

impl DownloadExecutor {
    pub fn new(
        recorder: Arc<DownloadRecorder>,
        credentials: Arc<dyn CredentialStore>,
        observer: Arc<dyn ProgressObserver>,
        options: ExecutorOptions,
    ) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::REFERER,
            REFERER.parse().expect("static referer header"),
        );

        // Connect/read timeouts rather than a total-request timeout: large
        // files legitimately take longer than any fixed budget, while a
        // stalled stream should still fail promptly.
        let client = Client::builder()
            .user_agent(&options.user_agent)
            .default_headers(headers)
            .connect_timeout(options.timeout)
            .read_timeout(options.timeout)
            .build()
            .map_err(|e| Error::Download(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            recorder,
            credentials,
            observer,
            options,
        })
    }

    /// Download every not-yet-satisfied file of `items` into `folder`.
    ///
    /// Inability to create the destination folder is fatal; individual task
    /// failures are collected into the report instead.
    pub async fn run(&self, items: &[PostItem], folder: &Path) -> Result<RunReport> {
        ensure_dir(folder)?;

        let total = count_targets(items);
        let tasks = generate_tasks(items, folder, &self.recorder, self.options.show_skipped);
        let skipped = (total - tasks.len()) as u64;
        tracing::info!(
            "{} files to download, {} already satisfied",
            tasks.len(),
            skipped
        );

        let results: Vec<(String, bool)> = futures::stream::iter(tasks)
            .map(|task| async move {
                let ok = self.run_task(&task).await;
                self.maybe_refresh_credentials().await;
                (task.label, ok)
            })
            .buffer_unordered(self.options.max_workers)
            .collect()
            .await;

        let mut report = RunReport {
            skipped,
            ..Default::default()
        };
        for (label, ok) in results {
            if ok {
                report.downloaded += 1;
            } else {
                report.failed.push(label);
            }
        }
        for label in &report.failed {
            tracing::warn!("Gave up on {} after {} attempts", label, self.options.retry_limit);
        }

        Ok(report)
    }

    /// Run one task within the retry budget. Marks the ledger exactly once,
    /// after the file is flushed and closed.
    async fn run_task(&self, task: &DownloadTask) -> bool {
        for attempt in 1..=self.options.retry_limit {
            match self.attempt(task).await {
                Ok(()) => {
                    if let Err(e) = self.recorder.mark_complete(&task.dedup_key) {
                        tracing::warn!("Could not record completion of {}: {}", task.label, e);
                    }
                    tracing::info!("Downloaded {}", task.label);
                    return true;
                }
                Err(e) => {
                    tracing::warn!(
                        "{} attempt {}/{} failed: {}",
                        task.label,
                        attempt,
                        self.options.retry_limit,
                        e
                    );
                }
            }
        }
        false
    }

    async fn attempt(&self, task: &DownloadTask) -> Result<()> {
        let response = self.client.get(&task.url).send().await?;

        let status = response.status().as_u16();
        if status != 200 && status != 206 {
            return Err(Error::Download(format!(
                "unexpected status {} for {}",
                status, task.url
            )));
        }
        let total = response
            .content_length()
            .filter(|len| *len > 0)
            .ok_or_else(|| Error::Download(format!("empty response for {}", task.url)))?;

        self.observer.task_started(&task.label, Some(total));
        let result = self.stream_to_file(task, response).await;
        self.observer.task_finished(&task.label);

        if result.is_err() {
            // A partial file must not outlive the attempt.
            let _ = tokio::fs::remove_file(&task.path).await;
        }
        result
    }

    async fn stream_to_file(&self, task: &DownloadTask, response: Response) -> Result<()> {
        let mut file = File::create(&task.path).await?;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| Error::Download(format!("stream interrupted: {}", e)))?;
            file.write_all(&chunk).await?;
            self.observer.task_advanced(&task.label, chunk.len() as u64);
        }

        file.flush().await?;
        file.sync_all().await?;
        Ok(())
    }

    /// Scheduled credential check between tasks; keeps long batches from
    /// hitting a mid-run session expiry without a detached timer.
    async fn maybe_refresh_credentials(&self) {
        if self.credentials.is_stale(self.options.refresh_interval) {
            if let Err(e) = self.credentials.refresh().await {
                tracing::warn!("Credential refresh failed: {}", e);
            }
        }
    }
}
