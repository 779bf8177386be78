//! Seeder - registers candidate URLs in the frontier
//!
//! Candidates are inserted one at a time. Already-known URLs are left
//! untouched, whatever their state. Inserts are idempotent, so a pass may
//! stop between any two candidates and be repeated later.

use crate::output::{log_progress, Progress};
use crate::storage::SharedStore;
use tokio_util::sync::CancellationToken;

/// Totals of one seeding pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub processed: usize,
    pub total: usize,
    pub inserted: usize,
    /// Candidates whose insert failed; they count as not inserted
    pub failed: usize,
    /// The pass stopped before reaching the end of the input
    pub cancelled: bool,
}

/// Reconciles a candidate list with the frontier store
pub struct Seeder {
    store: SharedStore,
    cancel: CancellationToken,
}

impl Seeder {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            cancel: CancellationToken::new(),
        }
    }

    /// Stops the pass before the next candidate once `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Seeds `candidates`, logging a progress line after each one
    pub fn seed<S: AsRef<str>>(&self, candidates: &[S]) -> SeedReport {
        self.seed_with_progress(candidates, log_progress)
    }

    /// Seeds `candidates`, passing `(processed, total, inserted)` to
    /// `on_progress` after each one
    ///
    /// A failed insert is logged and skipped. The pass runs to the end unless
    /// cancelled, in which case the remaining candidates are left out.
    pub fn seed_with_progress<S, P>(&self, candidates: &[S], mut on_progress: P) -> SeedReport
    where
        S: AsRef<str>,
        P: FnMut(&Progress),
    {
        let mut report = SeedReport {
            total: candidates.len(),
            ..SeedReport::default()
        };

        tracing::info!("Seeding {} candidate URLs", report.total);

        for candidate in candidates {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                tracing::info!(
                    "Seeding cancelled after {}/{} candidates",
                    report.processed,
                    report.total
                );
                break;
            }

            let url = candidate.as_ref();

            match self.store.seed_insert_if_absent(url) {
                Ok(true) => report.inserted += 1,
                Ok(false) => tracing::trace!("Already known: {}", url),
                Err(e) => {
                    tracing::warn!("Failed to seed {}: {}", url, e);
                    report.failed += 1;
                }
            }

            report.processed += 1;
            on_progress(&Progress::new(
                "inserted",
                report.processed,
                report.total,
                report.inserted,
            ));
        }

        tracing::info!(
            "Seeding finished: {} inserted, {} already known, {} failed",
            report.inserted,
            report.processed - report.inserted - report.failed,
            report.failed
        );

        report
    }
}
