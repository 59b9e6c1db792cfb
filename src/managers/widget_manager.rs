//! Widget Manager for the dashboard.
//!
//! Stores widgets attached to bookmarks. The `config` map is kept as a JSON
//! text column.

use rusqlite::{params, Connection};
use serde_json::{Map, Value};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::types::errors::WidgetError;
use crate::types::widget::{NewWidget, Widget};

/// Trait defining widget storage operations.
pub trait WidgetManagerTrait {
    fn add_widget(&mut self, bookmark_id: &str, input: &NewWidget) -> Result<Widget, WidgetError>;
    fn list_widgets(&self, bookmark_id: &str) -> Result<Vec<Widget>, WidgetError>;
    fn has_widget_type(&self, bookmark_id: &str, widget_type: &str) -> Result<bool, WidgetError>;
    /// Removes every widget owned by `bookmark_id`. Returns the number removed.
    fn delete_for_bookmark(&mut self, bookmark_id: &str) -> Result<usize, WidgetError>;
}

/// Widget manager backed by a SQLite connection.
pub struct WidgetManager<'a> {
    conn: &'a Connection,
}

impl<'a> WidgetManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn bookmark_exists(&self, bookmark_id: &str) -> Result<bool, WidgetError> {
        let count: i32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM bookmarks WHERE id = ?1",
                params![bookmark_id],
                |row| row.get(0),
            )
            .map_err(|e| WidgetError::DatabaseError(e.to_string()))?;
        Ok(count > 0)
    }
}

impl<'a> WidgetManagerTrait for WidgetManager<'a> {
    /// Attaches a widget. No de-duplication by type happens here.
    fn add_widget(&mut self, bookmark_id: &str, input: &NewWidget) -> Result<Widget, WidgetError> {
        if !self.bookmark_exists(bookmark_id)? {
            return Err(WidgetError::BookmarkNotFound(bookmark_id.to_string()));
        }

        let config_json = serde_json::to_string(&input.config)
            .map_err(|e| WidgetError::SerializationError(e.to_string()))?;
        let now = Self::now();
        let widget = Widget {
            id: Uuid::new_v4().to_string(),
            widget_type: input.widget_type.clone(),
            config: input.config.clone(),
            bookmark_id: Some(bookmark_id.to_string()),
            created_at: now,
            updated_at: now,
        };

        self.conn
            .execute(
                "INSERT INTO widgets (id, widget_type, config, bookmark_id, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![widget.id, widget.widget_type, config_json, bookmark_id, now, now],
            )
            .map_err(|e| WidgetError::DatabaseError(e.to_string()))?;

        Ok(widget)
    }

    fn list_widgets(&self, bookmark_id: &str) -> Result<Vec<Widget>, WidgetError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, widget_type, config, bookmark_id, created_at, updated_at \
                 FROM widgets WHERE bookmark_id = ?1 ORDER BY created_at, rowid",
            )
            .map_err(|e| WidgetError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(params![bookmark_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })
            .map_err(|e| WidgetError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            let (id, widget_type, config_json, bookmark_id, created_at, updated_at) =
                row.map_err(|e| WidgetError::DatabaseError(e.to_string()))?;
            let config: Map<String, Value> = serde_json::from_str(&config_json)
                .map_err(|e| WidgetError::SerializationError(e.to_string()))?;
            results.push(Widget {
                id,
                widget_type,
                config,
                bookmark_id,
                created_at,
                updated_at,
            });
        }
        Ok(results)
    }

    fn has_widget_type(&self, bookmark_id: &str, widget_type: &str) -> Result<bool, WidgetError> {
        let count: i32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM widgets WHERE bookmark_id = ?1 AND widget_type = ?2",
                params![bookmark_id, widget_type],
                |row| row.get(0),
            )
            .map_err(|e| WidgetError::DatabaseError(e.to_string()))?;
        Ok(count > 0)
    }

    fn delete_for_bookmark(&mut self, bookmark_id: &str) -> Result<usize, WidgetError> {
        self.conn
            .execute("DELETE FROM widgets WHERE bookmark_id = ?1", params![bookmark_id])
            .map_err(|e| WidgetError::DatabaseError(e.to_string()))
    }
}
