//! SQLite database connection management for the dashboard.
//!
//! Provides the [`Database`] struct that wraps a `rusqlite::Connection`
//! and automatically runs schema migrations on open, and the
//! [`DatabaseHandle`] that gives the store an explicit open/close lifecycle.

use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

use super::migrations;
use crate::types::errors::StoreError;

const MEMORY_DSN: &str = ":memory:";

/// Core database wrapper providing SQLite connection management.
///
/// The `Database` struct owns a `rusqlite::Connection` and ensures that
/// all required tables and indexes are created when the database is opened.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) a SQLite database at the given file path and runs migrations.
    ///
    /// `":memory:"` opens an in-memory database. For file paths the parent
    /// directory is created when missing.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the connection cannot be established or migrations fail.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let path = path.as_ref();
        if path.as_os_str() == MEMORY_DSN {
            return Self::open_in_memory();
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    tracing::warn!(path = %parent.display(), error = %e, "failed to create database directory");
                }
            }
        }
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.run_migrations()?;
        Ok(db)
    }

    /// Opens an in-memory SQLite database and runs migrations.
    ///
    /// Useful for testing: the database is discarded when the `Database` is dropped.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the connection cannot be established or migrations fail.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> Result<(), rusqlite::Error> {
        migrations::run_all(&self.conn)
    }

    /// Returns a reference to the underlying `rusqlite::Connection`.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the connection, flushing any pending WAL state.
    pub fn close(self) -> Result<(), rusqlite::Error> {
        self.conn.close().map_err(|(_, e)| e)
    }
}

/// Explicitly constructed store handle with an open/close lifecycle.
///
/// Callers hold the handle and pass it (or the `Arc<Database>` it yields) to the
/// mutation API and the seed importer. There is no process-wide connection.
pub struct DatabaseHandle {
    path: String,
    db: Option<Arc<Database>>,
}

impl DatabaseHandle {
    /// Opens the store at `path` (`":memory:"` for an in-memory store).
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db = Database::open(path).map_err(|e| StoreError::OpenFailed(e.to_string()))?;
        tracing::debug!(path, "store opened");
        Ok(Self {
            path: path.to_string(),
            db: Some(Arc::new(db)),
        })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::open(MEMORY_DSN)
    }

    /// Returns the live database, or `StoreError::Closed` after `close`.
    pub fn get(&self) -> Result<Arc<Database>, StoreError> {
        self.db.clone().ok_or(StoreError::Closed)
    }

    pub fn is_open(&self) -> bool {
        self.db.is_some()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Closes the store. Idempotent.
    ///
    /// If other owners still hold the `Arc<Database>`, the connection closes when
    /// the last of them drops it.
    pub fn close(&mut self) -> Result<(), StoreError> {
        let Some(db) = self.db.take() else {
            return Ok(());
        };
        if let Ok(db) = Arc::try_unwrap(db) {
            db.close().map_err(|e| StoreError::OpenFailed(e.to_string()))?;
        }
        tracing::debug!(path = %self.path, "store closed");
        Ok(())
    }

    /// Closes and discards the handle so the next test starts from a fresh store.
    #[doc(hidden)]
    pub fn reset_for_tests(&mut self) {
        let _ = self.close();
    }
}

impl Drop for DatabaseHandle {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
