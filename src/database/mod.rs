//! Dashboard database layer.
//!
//! Provides SQLite connection management, the store handle lifecycle and
//! schema migrations.
//!
//! # Usage
//!
//! ```no_run
//! use onedashboard::database::{Database, DatabaseHandle};
//!
//! // Open a persistent database
//! let db = Database::open("data/dev.db").expect("failed to open database");
//!
//! // Or hold a handle with an explicit lifecycle
//! let mut handle = DatabaseHandle::open_in_memory().expect("failed to open store");
//! let conn_owner = handle.get().expect("store is open");
//! let _conn = conn_owner.connection();
//! drop(conn_owner);
//! handle.close().expect("failed to close store");
//! ```

pub mod connection;
pub mod migrations;

pub use connection::{Database, DatabaseHandle};
