//! Storage traits and error types
//!
//! This module defines the trait interface for frontier backends and
//! associated error types.

use crate::state::PageStatus;
use crate::storage::{CommitOutcome, PageRecord};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to open store at {}: {source}", path.display())]
    Init {
        path: PathBuf,
        source: rusqlite::Error,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Corrupt record for {url}: {reason}")]
    CorruptRecord { url: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for frontier backend implementations
///
/// Each write must be atomic for the row it touches. Callers share a backend
/// through [`SharedStore`](crate::storage::SharedStore), never directly.
pub trait FrontierStore: Send {
    // ===== Seeding =====

    /// Inserts a pending record unless `url` is already known
    ///
    /// # Returns
    ///
    /// `true` if a row was inserted, `false` if the URL already existed
    fn seed_insert_if_absent(&mut self, url: &str) -> StorageResult<bool>;

    // ===== Fetch Lifecycle =====

    /// Lists every URL whose content is not set yet
    fn list_pending(&self) -> StorageResult<Vec<String>>;

    /// Lists fetched URLs explicitly flagged for re-fetch
    fn list_stale(&self) -> StorageResult<Vec<String>>;

    /// Sets content, digest and timestamp of an existing record in one write
    ///
    /// Also clears the stale flag. Fails with `PageNotFound` if the URL is
    /// not in the store.
    fn commit_fetch(
        &mut self,
        url: &str,
        content: &[u8],
        digest: &str,
        fetched_at: DateTime<Utc>,
    ) -> StorageResult<CommitOutcome>;

    /// Flags a fetched record for re-fetch on the next run
    ///
    /// Returns `false` if the URL is unknown or still pending.
    fn mark_stale(&mut self, url: &str) -> StorageResult<bool>;

    /// Gets a page by URL
    fn get_page(&self, url: &str) -> StorageResult<Option<PageRecord>>;

    // ===== Statistics =====

    /// Counts pages by lifecycle status
    fn count_pages_by_state(&self, status: PageStatus) -> StorageResult<u64>;

    /// Gets total page count
    fn count_total_pages(&self) -> StorageResult<u64>;

    /// Counts fetched pages flagged stale
    fn count_stale_pages(&self) -> StorageResult<u64>;
}
