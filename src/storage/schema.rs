//! Database schema definitions
//!
//! This module contains the SQL schema for the frontier database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per distinct URL; fetch columns are all set or all NULL
CREATE TABLE IF NOT EXISTS pages (
    url TEXT PRIMARY KEY,
    content BLOB,
    digest TEXT,
    updated_at TEXT,
    stale INTEGER NOT NULL DEFAULT 0,
    CHECK ((content IS NULL) = (digest IS NULL)),
    CHECK ((content IS NULL) = (updated_at IS NULL))
);

CREATE INDEX IF NOT EXISTS idx_pages_pending ON pages(url) WHERE content IS NULL;
CREATE INDEX IF NOT EXISTS idx_pages_stale ON pages(url) WHERE stale = 1;
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
