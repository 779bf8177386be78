//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the FrontierStore trait.

use crate::state::{PageState, PageStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{FrontierStore, StorageError, StorageResult};
use crate::storage::{CommitOutcome, PageRecord};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

/// Columns of a `pages` row before they are checked for consistency
struct RawPage {
    url: String,
    content: Option<Vec<u8>>,
    digest: Option<String>,
    updated_at: Option<String>,
    stale: bool,
}

impl RawPage {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            url: row.get(0)?,
            content: row.get(1)?,
            digest: row.get(2)?,
            updated_at: row.get(3)?,
            stale: row.get(4)?,
        })
    }

    fn into_record(self) -> StorageResult<PageRecord> {
        let updated_at = match self.updated_at {
            Some(text) => Some(
                DateTime::parse_from_rfc3339(&text)
                    .map_err(|e| StorageError::CorruptRecord {
                        url: self.url.clone(),
                        reason: format!("bad updated_at '{}': {}", text, e),
                    })?
                    .with_timezone(&Utc),
            ),
            None => None,
        };

        let state = PageState::from_columns(self.content, self.digest, updated_at).map_err(
            |e| StorageError::CorruptRecord {
                url: self.url.clone(),
                reason: e.to_string(),
            },
        )?;

        Ok(PageRecord {
            url: self.url,
            state,
            stale: self.stale,
        })
    }
}

impl SqliteStorage {
    /// Opens or creates the frontier database at `path`
    ///
    /// Missing parent directories are created. Any failure here is a store
    /// initialization failure.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let init_err = |source| StorageError::Init {
            path: path.to_path_buf(),
            source,
        };

        let conn = Connection::open(path).map_err(init_err)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )
        .map_err(init_err)?;

        initialize_schema(&conn).map_err(init_err)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn list_urls(&self, sql: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(sql)?;
        let urls = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(urls)
    }

    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl FrontierStore for SqliteStorage {
    // ===== Seeding =====

    fn seed_insert_if_absent(&mut self, url: &str) -> StorageResult<bool> {
        let inserted = self
            .conn
            .execute("INSERT OR IGNORE INTO pages (url) VALUES (?1)", params![url])?;
        Ok(inserted == 1)
    }

    // ===== Fetch Lifecycle =====

    fn list_pending(&self) -> StorageResult<Vec<String>> {
        self.list_urls("SELECT url FROM pages WHERE content IS NULL ORDER BY url")
    }

    fn list_stale(&self) -> StorageResult<Vec<String>> {
        self.list_urls(
            "SELECT url FROM pages WHERE stale = 1 AND content IS NOT NULL ORDER BY url",
        )
    }

    fn commit_fetch(
        &mut self,
        url: &str,
        content: &[u8],
        digest: &str,
        fetched_at: DateTime<Utc>,
    ) -> StorageResult<CommitOutcome> {
        let tx = self.conn.transaction()?;

        let previous: Option<Option<String>> = tx
            .query_row(
                "SELECT digest FROM pages WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;

        let outcome = match previous {
            None => return Err(StorageError::PageNotFound(url.to_string())),
            Some(None) => CommitOutcome::Added,
            Some(Some(old)) if old == digest => CommitOutcome::Unchanged,
            Some(Some(_)) => CommitOutcome::Updated,
        };

        tx.execute(
            "UPDATE pages SET content = ?1, digest = ?2, updated_at = ?3, stale = 0
             WHERE url = ?4",
            params![content, digest, fetched_at.to_rfc3339(), url],
        )?;
        tx.commit()?;

        Ok(outcome)
    }

    fn mark_stale(&mut self, url: &str) -> StorageResult<bool> {
        let changed = self.conn.execute(
            "UPDATE pages SET stale = 1 WHERE url = ?1 AND content IS NOT NULL",
            params![url],
        )?;
        Ok(changed == 1)
    }

    fn get_page(&self, url: &str) -> StorageResult<Option<PageRecord>> {
        let raw = self
            .conn
            .query_row(
                "SELECT url, content, digest, updated_at, stale FROM pages WHERE url = ?1",
                params![url],
                RawPage::from_row,
            )
            .optional()?;

        raw.map(RawPage::into_record).transpose()
    }

    // ===== Statistics =====

    fn count_pages_by_state(&self, status: PageStatus) -> StorageResult<u64> {
        match status {
            PageStatus::Pending => self.count("SELECT COUNT(*) FROM pages WHERE content IS NULL"),
            PageStatus::Fetched => {
                self.count("SELECT COUNT(*) FROM pages WHERE content IS NOT NULL")
            }
        }
    }

    fn count_total_pages(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM pages")
    }

    fn count_stale_pages(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM pages WHERE stale = 1 AND content IS NOT NULL")
    }
}
