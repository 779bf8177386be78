//! Shared, mutex-guarded access to a frontier backend
//!
//! Workers clone a [`SharedStore`] and each operation holds the lock for a
//! single statement or transaction only.

use crate::state::PageStatus;
use crate::storage::traits::{FrontierStore, StorageError, StorageResult};
use crate::storage::{CommitOutcome, PageRecord};
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};

/// Cloneable handle to one frontier backend
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<dyn FrontierStore>>,
}

impl SharedStore {
    pub fn new<S: FrontierStore + 'static>(store: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, dyn FrontierStore + 'static>> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Unavailable("store lock poisoned".to_string()))
    }

    pub fn seed_insert_if_absent(&self, url: &str) -> StorageResult<bool> {
        self.lock()?.seed_insert_if_absent(url)
    }

    pub fn list_pending(&self) -> StorageResult<Vec<String>> {
        self.lock()?.list_pending()
    }

    pub fn list_stale(&self) -> StorageResult<Vec<String>> {
        self.lock()?.list_stale()
    }

    pub fn commit_fetch(
        &self,
        url: &str,
        content: &[u8],
        digest: &str,
        fetched_at: DateTime<Utc>,
    ) -> StorageResult<CommitOutcome> {
        self.lock()?.commit_fetch(url, content, digest, fetched_at)
    }

    pub fn mark_stale(&self, url: &str) -> StorageResult<bool> {
        self.lock()?.mark_stale(url)
    }

    pub fn get_page(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        self.lock()?.get_page(url)
    }

    pub fn count_pages_by_state(&self, status: PageStatus) -> StorageResult<u64> {
        self.lock()?.count_pages_by_state(status)
    }

    pub fn count_total_pages(&self) -> StorageResult<u64> {
        self.lock()?.count_total_pages()
    }

    pub fn count_stale_pages(&self) -> StorageResult<u64> {
        self.lock()?.count_stale_pages()
    }
}
