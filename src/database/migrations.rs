//! Schema migrations for the dashboard SQLite database.
//!
//! Uses a `schema_version` table to track which migrations have been applied.
//! Each migration runs exactly once and is recorded with a timestamp.

use rusqlite::Connection;

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Returns the current schema version from the database (0 if table doesn't exist).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Runs all pending schema migrations against the provided connection.
///
/// Migrations are versioned: each runs exactly once and is recorded in
/// the `schema_version` table. Safe to call on every startup.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    // Enable WAL and foreign keys (always, not versioned)
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Initial schema: groups, bookmarks, widgets, settings")?;
    }

    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![version, now, description],
    )?;
    Ok(())
}

/// V1: groups, bookmarks, widgets and the single settings row.
///
/// `bookmarks.group_id` has no ON DELETE action: a group that still owns
/// bookmarks cannot be deleted until they are released.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS bookmark_groups (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            icon TEXT,
            x INTEGER NOT NULL DEFAULT 0 CHECK (x >= 0),
            y INTEGER NOT NULL DEFAULT 0 CHECK (y >= 0),
            w INTEGER NOT NULL DEFAULT 8 CHECK (w >= 1),
            h INTEGER NOT NULL DEFAULT 4 CHECK (h >= 1)
        );

        CREATE TABLE IF NOT EXISTS bookmarks (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            url TEXT NOT NULL,
            icon TEXT,
            icon_only INTEGER NOT NULL DEFAULT 0,
            subtext TEXT,
            container TEXT,
            x INTEGER NOT NULL DEFAULT 0 CHECK (x >= 0),
            y INTEGER NOT NULL DEFAULT 0 CHECK (y >= 0),
            w INTEGER NOT NULL DEFAULT 4 CHECK (w >= 1),
            h INTEGER NOT NULL DEFAULT 2 CHECK (h >= 1),
            group_id TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (group_id) REFERENCES bookmark_groups(id)
        );

        CREATE INDEX IF NOT EXISTS idx_bookmarks_natural_key ON bookmarks(name, url);
        CREATE INDEX IF NOT EXISTS idx_bookmarks_group_id ON bookmarks(group_id);

        CREATE TABLE IF NOT EXISTS widgets (
            id TEXT PRIMARY KEY,
            widget_type TEXT NOT NULL,
            config TEXT NOT NULL DEFAULT '{}',
            bookmark_id TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (bookmark_id) REFERENCES bookmarks(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_widgets_bookmark_id ON widgets(bookmark_id);

        CREATE TABLE IF NOT EXISTS settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            yaml_path TEXT
        );
        ",
    )
}
