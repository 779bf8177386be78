//! Fetch coordinator - bounded-concurrency fetch pipeline
//!
//! This module drains the frontier for one run:
//! - Snapshots the pending (and stale) URLs once at the start
//! - Dispatches one task per URL, at most `worker_count` in flight
//! - Hashes successful bodies and commits them to the store
//! - Leaves failed URLs untouched so the next run retries them
//! - Stops dispatching when cancelled, letting in-flight fetches finish

use crate::config::PipelineConfig;
use crate::crawler::digest::{ContentHasher, Sha256Hasher};
use crate::crawler::fetcher::{FetchError, PageFetcher};
use crate::output::{log_progress, Progress};
use crate::storage::{CommitOutcome, SharedStore, StorageResult};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

/// Totals of one fetch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchReport {
    /// Size of the work set taken at the start of the run
    pub total: usize,
    pub dispatched: usize,
    pub completed: usize,
    pub succeeded: usize,
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub fetch_failures: usize,
    pub commit_failures: usize,
    /// Dispatch stopped early because the run was cancelled
    pub cancelled: bool,
}

/// Result of a single URL task
#[derive(Debug, Clone, Copy)]
enum TaskOutcome {
    Committed(CommitOutcome),
    FetchFailed,
    CommitFailed,
}

/// Everything a worker task needs, shared across tasks
struct TaskContext<F, H> {
    store: SharedStore,
    fetcher: F,
    hasher: H,
    fetch_timeout: Duration,
}

impl<F: PageFetcher, H: ContentHasher> TaskContext<F, H> {
    /// Fetches one URL and commits the result
    async fn process(&self, url: String) -> TaskOutcome {
        let fetched = tokio::time::timeout(
            self.fetch_timeout,
            self.fetcher.fetch(&url, self.fetch_timeout),
        )
        .await
        .unwrap_or_else(|_| Err(FetchError::Timeout { url: url.clone() }));

        let content = match fetched {
            Ok(content) => content,
            Err(e) => {
                tracing::debug!("Fetch failed, {} stays pending: {}", url, e);
                return TaskOutcome::FetchFailed;
            }
        };

        let digest = self.hasher.digest(&content);
        let fetched_at = Utc::now();
        let store = self.store.clone();
        let commit_url = url.clone();

        let committed = tokio::task::spawn_blocking(move || {
            store.commit_fetch(&commit_url, &content, &digest, fetched_at)
        })
        .await;

        match committed {
            Ok(Ok(outcome)) => {
                tracing::debug!("{}: {}", outcome, url);
                TaskOutcome::Committed(outcome)
            }
            Ok(Err(e)) => {
                tracing::warn!("Commit failed for {}, content discarded: {}", url, e);
                TaskOutcome::CommitFailed
            }
            Err(e) => {
                tracing::warn!("Commit task for {} did not finish: {}", url, e);
                TaskOutcome::CommitFailed
            }
        }
    }
}

impl FetchReport {
    fn record(&mut self, joined: Result<TaskOutcome, JoinError>) {
        self.completed += 1;

        match joined {
            Ok(TaskOutcome::Committed(outcome)) => {
                self.succeeded += 1;
                match outcome {
                    CommitOutcome::Added => self.added += 1,
                    CommitOutcome::Updated => self.updated += 1,
                    CommitOutcome::Unchanged => self.unchanged += 1,
                }
            }
            Ok(TaskOutcome::FetchFailed) => self.fetch_failures += 1,
            Ok(TaskOutcome::CommitFailed) => self.commit_failures += 1,
            Err(e) => {
                tracing::error!("Fetch task aborted: {}", e);
                self.fetch_failures += 1;
            }
        }
    }

    fn progress(&self) -> Progress {
        Progress::new("fetched", self.completed, self.total, self.succeeded)
    }
}

/// Drives concurrent fetching of every pending URL
pub struct FetchCoordinator<F, H = Sha256Hasher> {
    ctx: Arc<TaskContext<F, H>>,
    worker_count: usize,
    cancel: CancellationToken,
}

impl<F: PageFetcher> FetchCoordinator<F, Sha256Hasher> {
    /// Creates a coordinator that digests content with SHA-256
    pub fn new(store: SharedStore, fetcher: F, config: &PipelineConfig) -> Self {
        Self::with_hasher(store, fetcher, Sha256Hasher, config)
    }
}

impl<F: PageFetcher, H: ContentHasher> FetchCoordinator<F, H> {
    pub fn with_hasher(store: SharedStore, fetcher: F, hasher: H, config: &PipelineConfig) -> Self {
        Self {
            ctx: Arc::new(TaskContext {
                store,
                fetcher,
                hasher,
                fetch_timeout: config.fetch_timeout,
            }),
            worker_count: config.worker_count.max(1),
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the cancellation token, e.g. with one tied to Ctrl-C
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops dispatch of new fetches when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs one fetch pass, logging a progress line per finished task
    pub async fn run(&self) -> StorageResult<FetchReport> {
        self.run_with_progress(log_progress).await
    }

    /// Runs one fetch pass
    ///
    /// The work set is the pending URLs followed by the stale ones, read once
    /// before any task starts. `on_progress` sees `(completed, total,
    /// succeeded)` in completion order, each tick after that task's commit.
    ///
    /// Only reading the work set can fail; per-URL failures are counted in
    /// the report.
    pub async fn run_with_progress<P>(&self, mut on_progress: P) -> StorageResult<FetchReport>
    where
        P: FnMut(&Progress),
    {
        let mut work = self.ctx.store.list_pending()?;
        let pending = work.len();
        work.extend(self.ctx.store.list_stale()?);

        let mut report = FetchReport {
            total: work.len(),
            ..FetchReport::default()
        };

        tracing::info!(
            "Fetching {} URLs ({} pending, {} stale) with {} workers",
            report.total,
            pending,
            report.total - pending,
            self.worker_count
        );

        let semaphore = Arc::new(Semaphore::new(self.worker_count));
        let mut tasks = JoinSet::new();

        for url in work {
            // Finished tasks are recorded while waiting, so ticks are not held
            // back until the next permit frees up
            let permit = loop {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        report.cancelled = true;
                        break None;
                    }
                    Some(joined) = tasks.join_next() => {
                        report.record(joined);
                        on_progress(&report.progress());
                    }
                    permit = Arc::clone(&semaphore).acquire_owned() => break permit.ok(),
                }
            };

            let Some(permit) = permit else {
                break;
            };

            let ctx = Arc::clone(&self.ctx);
            tasks.spawn(async move {
                let _permit = permit;
                ctx.process(url).await
            });
            report.dispatched += 1;
        }

        if report.cancelled {
            tracing::info!(
                "Cancelled: waiting for {} in-flight fetches, {} URLs left for the next run",
                tasks.len(),
                report.total - report.dispatched
            );
        }

        while let Some(joined) = tasks.join_next().await {
            report.record(joined);
            on_progress(&report.progress());
        }

        tracing::info!(
            "Fetch run finished: {}/{} succeeded ({} added, {} updated, {} unchanged), {} fetch failures, {} commit failures",
            report.succeeded,
            report.completed,
            report.added,
            report.updated,
            report.unchanged,
            report.fetch_failures,
            report.commit_failures
        );

        Ok(report)
    }
}
