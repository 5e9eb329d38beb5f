//! SQLite-backed page store
//!
//! Connections come from an r2d2 pool so request handlers and the category
//! updater never share a single locked connection.

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::fmt;
use std::path::Path;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS pages (
    title TEXT PRIMARY KEY,
    body TEXT NOT NULL DEFAULT '',
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    title TEXT PRIMARY KEY,
    body TEXT NOT NULL DEFAULT '',
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS category_links (
    category TEXT NOT NULL,
    member TEXT NOT NULL,
    member_kind TEXT NOT NULL,
    PRIMARY KEY (category, member, member_kind),
    CHECK (category <> member)
);

CREATE INDEX IF NOT EXISTS idx_category_links_member ON category_links(member, member_kind);

CREATE TABLE IF NOT EXISTS auth_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    token TEXT NOT NULL UNIQUE,
    authenticated INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);
";

/// Store failures. A miss and an unreachable store are different outcomes for callers.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    NotFound,
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "not found"),
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(e: r2d2::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

pub struct Database {
    pool: DbPool,
}

impl Database {
    /// Open (or create) the database at `database_url`. `:memory:` gives a
    /// single-connection in-memory store, used by tests.
    pub fn new(database_url: &str) -> Result<Self, StoreError> {
        let in_memory = database_url == ":memory:";
        let manager = if in_memory {
            SqliteConnectionManager::memory()
        } else {
            if let Some(parent) = Path::new(database_url).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| StoreError::Unavailable(e.to_string()))?;
                }
            }
            SqliteConnectionManager::file(database_url)
        };
        let manager = manager.with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
        });

        // In-memory databases are per-connection, so the pool must hold exactly
        // one and never recycle it.
        let builder = if in_memory {
            Pool::builder().max_size(1).idle_timeout(None).max_lifetime(None)
        } else {
            Pool::builder().max_size(8)
        };
        let pool = builder.build(manager)?;

        let db = Self { pool };
        db.init(in_memory)?;
        Ok(db)
    }

    fn init(&self, in_memory: bool) -> Result<(), StoreError> {
        let conn = self.conn()?;
        if !in_memory {
            let mode: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
            log::debug!("[DB] journal_mode={}", mode);
        }
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Check out a pooled connection.
    pub fn conn(&self) -> Result<DbConn, StoreError> {
        Ok(self.pool.get()?)
    }
}

/// Parse an RFC 3339 column, surfacing corruption as a conversion error instead of panicking.
pub(crate) fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_file_database_creates_parent_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("wiki.db");
        let db = Database::new(path.to_str().unwrap()).expect("Failed to open database");

        assert!(path.exists());
        let count: i64 = db
            .conn()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_no_rows_maps_to_not_found() {
        let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert_eq!(err, StoreError::NotFound);

        let err: StoreError = rusqlite::Error::InvalidQuery.into();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
