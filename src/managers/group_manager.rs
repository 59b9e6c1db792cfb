//! Group Manager for the dashboard.
//!
//! CRUD for bookmark groups, backed by SQLite via `rusqlite`.

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::types::errors::GroupError;
use crate::types::group::{Group, GroupLayoutPatch, NewGroup};
use crate::types::layout::GridRect;

/// Trait defining group storage operations.
pub trait GroupManagerTrait {
    fn create_group(&mut self, input: &NewGroup, rect: GridRect) -> Result<Group, GroupError>;
    fn get_group(&self, id: &str) -> Result<Option<Group>, GroupError>;
    fn update_layout(&mut self, id: &str, patch: &GroupLayoutPatch) -> Result<Group, GroupError>;
    /// Deletes the group row. Returns `false` when no such group existed.
    fn delete_group(&mut self, id: &str) -> Result<bool, GroupError>;
    fn list_groups(&self) -> Result<Vec<Group>, GroupError>;
}

/// Group manager backed by a SQLite connection.
pub struct GroupManager<'a> {
    conn: &'a Connection,
}

impl<'a> GroupManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_group(row: &rusqlite::Row) -> rusqlite::Result<Group> {
        Ok(Group {
            id: row.get(0)?,
            name: row.get(1)?,
            icon: row.get(2)?,
            x: row.get(3)?,
            y: row.get(4)?,
            w: row.get(5)?,
            h: row.get(6)?,
        })
    }
}

impl<'a> GroupManagerTrait for GroupManager<'a> {
    fn create_group(&mut self, input: &NewGroup, rect: GridRect) -> Result<Group, GroupError> {
        let rect = rect.normalized();
        let group = Group {
            id: Uuid::new_v4().to_string(),
            name: input.name.clone(),
            icon: input.icon.clone(),
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
        };

        self.conn
            .execute(
                "INSERT INTO bookmark_groups (id, name, icon, x, y, w, h) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![group.id, group.name, group.icon, group.x, group.y, group.w, group.h],
            )
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

        Ok(group)
    }

    fn get_group(&self, id: &str) -> Result<Option<Group>, GroupError> {
        self.conn
            .query_row(
                "SELECT id, name, icon, x, y, w, h FROM bookmark_groups WHERE id = ?1",
                params![id],
                Self::row_to_group,
            )
            .optional()
            .map_err(|e| GroupError::DatabaseError(e.to_string()))
    }

    /// Applies the provided layout fields, clamped to the layout floor.
    fn update_layout(&mut self, id: &str, patch: &GroupLayoutPatch) -> Result<Group, GroupError> {
        let mut group = self
            .get_group(id)?
            .ok_or_else(|| GroupError::NotFound(id.to_string()))?;
        group.set_rect(patch.apply_to(group.rect()));

        self.conn
            .execute(
                "UPDATE bookmark_groups SET x = ?1, y = ?2, w = ?3, h = ?4 WHERE id = ?5",
                params![group.x, group.y, group.w, group.h, group.id],
            )
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

        Ok(group)
    }

    fn delete_group(&mut self, id: &str) -> Result<bool, GroupError> {
        let affected = self
            .conn
            .execute("DELETE FROM bookmark_groups WHERE id = ?1", params![id])
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?;
        Ok(affected > 0)
    }

    fn list_groups(&self) -> Result<Vec<Group>, GroupError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, icon, x, y, w, h FROM bookmark_groups ORDER BY rowid")
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?;
        let rows = stmt
            .query_map([], Self::row_to_group)
            .map_err(|e| GroupError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| GroupError::DatabaseError(e.to_string()))?);
        }
        Ok(results)
    }
}
