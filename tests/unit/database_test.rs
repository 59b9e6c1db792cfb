//! Unit tests for the dashboard database layer (connection, migrations, store handle).

use onedashboard::database::migrations::{get_schema_version, CURRENT_SCHEMA_VERSION};
use onedashboard::database::{Database, DatabaseHandle};
use onedashboard::types::errors::StoreError;
use tempfile::TempDir;

#[test]
fn test_open_in_memory_succeeds() {
    let db = Database::open_in_memory();
    assert!(db.is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_all_tables() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let conn = db.connection();

    for table in &["bookmark_groups", "bookmarks", "widgets", "settings", "schema_version"] {
        let exists: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name=?1",
                [table],
                |row| row.get(0),
            )
            .unwrap_or(false);
        assert!(exists, "Table '{}' should exist after migrations", table);
    }
}

#[test]
fn test_migrations_create_lookup_indexes() {
    let db = Database::open_in_memory().unwrap();
    for index in &["idx_bookmarks_natural_key", "idx_bookmarks_group_id", "idx_widgets_bookmark_id"] {
        let exists: bool = db
            .connection()
            .query_row(
                "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='index' AND name=?1",
                [index],
                |row| row.get(0),
            )
            .unwrap();
        assert!(exists, "Index '{}' should exist", index);
    }
}

#[test]
fn test_schema_version_recorded() {
    let db = Database::open_in_memory().unwrap();
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_foreign_keys_enabled() {
    let db = Database::open_in_memory().unwrap();
    let fk: i32 = db
        .connection()
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(fk, 1);
}

#[test]
fn test_settings_row_is_singleton() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.connection();
    conn.execute("INSERT INTO settings (id, yaml_path) VALUES (1, NULL)", []).unwrap();
    let second = conn.execute("INSERT INTO settings (id, yaml_path) VALUES (2, 'x')", []);
    assert!(second.is_err(), "only id = 1 is allowed in settings");
}

#[test]
fn test_reopen_file_database_keeps_data_and_version() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("dash.db");

    {
        let db = Database::open(&path).expect("open should create parent dir");
        db.connection()
            .execute(
                "INSERT INTO bookmark_groups (id, name, x, y, w, h) VALUES ('g1', 'Media', 0, 0, 8, 4)",
                [],
            )
            .unwrap();
    }

    let db = Database::open(&path).unwrap();
    let count: i32 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM bookmark_groups", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

// ─── Store handle lifecycle ───

#[test]
fn test_handle_get_after_close_fails() {
    let mut handle = DatabaseHandle::open_in_memory().unwrap();
    assert!(handle.is_open());
    assert!(handle.get().is_ok());

    handle.close().unwrap();
    assert!(!handle.is_open());
    assert_eq!(handle.get().err(), Some(StoreError::Closed));
}

#[test]
fn test_handle_close_is_idempotent() {
    let mut handle = DatabaseHandle::open_in_memory().unwrap();
    handle.close().unwrap();
    handle.close().unwrap();
}

#[test]
fn test_handle_close_with_outstanding_owner() {
    let mut handle = DatabaseHandle::open_in_memory().unwrap();
    let db = handle.get().unwrap();
    handle.close().unwrap();
    // The outstanding owner keeps a usable connection until it is dropped.
    let version = get_schema_version(db.connection());
    assert_eq!(version, CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_reset_for_tests_gives_fresh_store() {
    let mut handle = DatabaseHandle::open_in_memory().unwrap();
    handle
        .get()
        .unwrap()
        .connection()
        .execute(
            "INSERT INTO bookmark_groups (id, name, x, y, w, h) VALUES ('g1', 'Media', 0, 0, 8, 4)",
            [],
        )
        .unwrap();
    handle.reset_for_tests();
    assert!(handle.get().is_err());

    let fresh = DatabaseHandle::open_in_memory().unwrap();
    let count: i32 = fresh
        .get()
        .unwrap()
        .connection()
        .query_row("SELECT COUNT(*) FROM bookmark_groups", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn test_handle_open_failure_is_reported() {
    let tmp = TempDir::new().unwrap();
    // A directory cannot be opened as a database file.
    let err = DatabaseHandle::open(tmp.path().to_str().unwrap()).err();
    assert!(matches!(err, Some(StoreError::OpenFailed(_))));
}

#[test]
fn test_open_under_file_parent_fails() {
    let tmp = TempDir::new().unwrap();
    let blocker = tmp.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    // The parent cannot be created, so the open itself reports the failure.
    assert!(Database::open(blocker.join("dash.db")).is_err());
    let err = DatabaseHandle::open(blocker.join("dash.db").to_str().unwrap()).err();
    assert!(matches!(err, Some(StoreError::OpenFailed(_))));
}
