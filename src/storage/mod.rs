//! Storage module for persisting the frontier
//!
//! This module handles all database operations for the harvester, including:
//! - SQLite database initialization and schema management
//! - Idempotent seeding of candidate URLs
//! - Atomic commits of fetched content
//! - Stale flags for explicit re-fetches
//!
//! The pipeline reaches storage only through [`SharedStore`].

mod schema;
mod shared;
mod sqlite;
mod traits;

pub use shared::SharedStore;
pub use sqlite::SqliteStorage;
pub use traits::{FrontierStore, StorageError, StorageResult};

use crate::state::PageState;
use std::fmt;
use std::path::Path;

/// Opens the on-disk frontier and wraps it for shared use
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SharedStore)` - Store ready for seeding and fetching
/// * `Err(StorageError)` - Store could not be created or opened
pub fn open_store(path: &Path) -> StorageResult<SharedStore> {
    Ok(SharedStore::new(SqliteStorage::new(path)?))
}

/// Represents a page in the database
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub url: String,
    pub state: PageState,
    /// Flagged for re-fetch; only ever set on fetched pages
    pub stale: bool,
}

/// What a successful commit did to the stored record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The page was pending and now has content
    Added,
    /// The page had content with a different digest
    Updated,
    /// The page had content with the same digest
    Unchanged,
}

impl CommitOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for CommitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
