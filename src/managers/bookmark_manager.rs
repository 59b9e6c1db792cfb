//! Bookmark Manager for the dashboard.
//!
//! Implements `BookmarkManagerTrait`: identity, lookups and field-level updates
//! for bookmark tiles, backed by SQLite via `rusqlite`. Invariants that span
//! entities (group reassignment, cascades) are enforced by the mutation API.

use rusqlite::{params, Connection, OptionalExtension};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::types::bookmark::{Bookmark, BookmarkPatch, NewBookmark};
use crate::types::errors::BookmarkError;
use crate::types::layout::GridRect;

const BOOKMARK_COLUMNS: &str = "id, name, url, icon, icon_only, subtext, container, \
     x, y, w, h, group_id, created_at, updated_at";

/// Trait defining bookmark storage operations.
pub trait BookmarkManagerTrait {
    fn create_bookmark(&mut self, input: &NewBookmark, rect: GridRect) -> Result<Bookmark, BookmarkError>;
    fn get_bookmark(&self, id: &str) -> Result<Option<Bookmark>, BookmarkError>;
    fn find_by_natural_key(&self, name: &str, url: &str) -> Result<Option<Bookmark>, BookmarkError>;
    fn update_bookmark(&mut self, id: &str, patch: &BookmarkPatch) -> Result<Bookmark, BookmarkError>;
    /// Deletes the bookmark row. Returns `false` when no such bookmark existed.
    fn delete_bookmark(&mut self, id: &str) -> Result<bool, BookmarkError>;
    fn list_bookmarks(&self, group_id: Option<&str>) -> Result<Vec<Bookmark>, BookmarkError>;
    fn list_all_bookmarks(&self) -> Result<Vec<Bookmark>, BookmarkError>;
    /// Detaches every bookmark of `group_id` and moves it to the root origin.
    fn release_group(&mut self, group_id: &str) -> Result<Vec<Bookmark>, BookmarkError>;
}

/// Bookmark manager backed by a SQLite connection.
pub struct BookmarkManager<'a> {
    conn: &'a Connection,
}

impl<'a> BookmarkManager<'a> {
    /// Creates a new `BookmarkManager` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Returns the current UNIX timestamp in seconds.
    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    /// Checks whether a group with the given ID exists.
    pub fn group_exists(&self, group_id: &str) -> Result<bool, BookmarkError> {
        let count: i32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM bookmark_groups WHERE id = ?1",
                params![group_id],
                |row| row.get(0),
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        Ok(count > 0)
    }

    /// Reads a single `Bookmark` row into a struct.
    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        Ok(Bookmark {
            id: row.get(0)?,
            name: row.get(1)?,
            url: row.get(2)?,
            icon: row.get(3)?,
            icon_only: row.get::<_, i32>(4)? != 0,
            subtext: row.get(5)?,
            container: row.get(6)?,
            x: row.get(7)?,
            y: row.get(8)?,
            w: row.get(9)?,
            h: row.get(10)?,
            group_id: row.get(11)?,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
        })
    }

    fn query_bookmarks(
        &self,
        sql: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<Bookmark>, BookmarkError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        let rows = stmt
            .query_map(args, Self::row_to_bookmark)
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| BookmarkError::DatabaseError(e.to_string()))?);
        }
        Ok(results)
    }
}

impl<'a> BookmarkManagerTrait for BookmarkManager<'a> {
    /// Inserts a new ungrouped bookmark at `rect`. Returns the stored record.
    fn create_bookmark(&mut self, input: &NewBookmark, rect: GridRect) -> Result<Bookmark, BookmarkError> {
        let rect = rect.normalized();
        let now = Self::now();
        let bookmark = Bookmark {
            id: Uuid::new_v4().to_string(),
            name: input.name.clone(),
            url: input.url.clone(),
            icon: input.icon.clone(),
            icon_only: input.icon_only,
            subtext: input.subtext.clone(),
            container: input.container.clone(),
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
            group_id: None,
            created_at: now,
            updated_at: now,
        };

        self.conn
            .execute(
                "INSERT INTO bookmarks (id, name, url, icon, icon_only, subtext, container, \
                 x, y, w, h, group_id, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, NULL, ?12, ?13)",
                params![
                    bookmark.id,
                    bookmark.name,
                    bookmark.url,
                    bookmark.icon,
                    bookmark.icon_only as i32,
                    bookmark.subtext,
                    bookmark.container,
                    bookmark.x,
                    bookmark.y,
                    bookmark.w,
                    bookmark.h,
                    bookmark.created_at,
                    bookmark.updated_at,
                ],
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        Ok(bookmark)
    }

    fn get_bookmark(&self, id: &str) -> Result<Option<Bookmark>, BookmarkError> {
        let sql = format!("SELECT {} FROM bookmarks WHERE id = ?1", BOOKMARK_COLUMNS);
        self.conn
            .query_row(&sql, params![id], Self::row_to_bookmark)
            .optional()
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))
    }

    /// Looks a bookmark up by `(name, url)`, the seed file's natural key.
    fn find_by_natural_key(&self, name: &str, url: &str) -> Result<Option<Bookmark>, BookmarkError> {
        let sql = format!(
            "SELECT {} FROM bookmarks WHERE name = ?1 AND url = ?2 ORDER BY created_at, rowid LIMIT 1",
            BOOKMARK_COLUMNS
        );
        self.conn
            .query_row(&sql, params![name, url], Self::row_to_bookmark)
            .optional()
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))
    }

    /// Applies only the fields present in `patch`; everything else keeps its stored value.
    fn update_bookmark(&mut self, id: &str, patch: &BookmarkPatch) -> Result<Bookmark, BookmarkError> {
        let mut bookmark = self
            .get_bookmark(id)?
            .ok_or_else(|| BookmarkError::NotFound(id.to_string()))?;

        if let Some(Some(gid)) = &patch.group_id {
            if !self.group_exists(gid)? {
                return Err(BookmarkError::GroupNotFound(gid.clone()));
            }
        }

        if let Some(name) = &patch.name {
            bookmark.name = name.clone();
        }
        if let Some(url) = &patch.url {
            bookmark.url = url.clone();
        }
        if let Some(icon) = &patch.icon {
            bookmark.icon = icon.clone();
        }
        if let Some(subtext) = &patch.subtext {
            bookmark.subtext = subtext.clone();
        }
        if let Some(container) = &patch.container {
            bookmark.container = container.clone();
        }
        if let Some(icon_only) = patch.icon_only {
            bookmark.icon_only = icon_only;
        }
        if let Some(group_id) = &patch.group_id {
            bookmark.group_id = group_id.clone();
        }
        let rect = GridRect {
            x: patch.x.unwrap_or(bookmark.x),
            y: patch.y.unwrap_or(bookmark.y),
            w: patch.w.unwrap_or(bookmark.w),
            h: patch.h.unwrap_or(bookmark.h),
        };
        bookmark.set_rect(rect.normalized());
        bookmark.updated_at = Self::now();

        self.conn
            .execute(
                "UPDATE bookmarks SET name = ?1, url = ?2, icon = ?3, icon_only = ?4, subtext = ?5, \
                 container = ?6, x = ?7, y = ?8, w = ?9, h = ?10, group_id = ?11, updated_at = ?12 \
                 WHERE id = ?13",
                params![
                    bookmark.name,
                    bookmark.url,
                    bookmark.icon,
                    bookmark.icon_only as i32,
                    bookmark.subtext,
                    bookmark.container,
                    bookmark.x,
                    bookmark.y,
                    bookmark.w,
                    bookmark.h,
                    bookmark.group_id,
                    bookmark.updated_at,
                    bookmark.id,
                ],
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        Ok(bookmark)
    }

    fn delete_bookmark(&mut self, id: &str) -> Result<bool, BookmarkError> {
        let affected = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?1", params![id])
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        Ok(affected > 0)
    }

    /// Lists bookmarks in a specific group (or the root grid if `group_id` is `None`).
    fn list_bookmarks(&self, group_id: Option<&str>) -> Result<Vec<Bookmark>, BookmarkError> {
        match group_id {
            Some(gid) => self.query_bookmarks(
                &format!(
                    "SELECT {} FROM bookmarks WHERE group_id = ?1 ORDER BY created_at, rowid",
                    BOOKMARK_COLUMNS
                ),
                &[&gid],
            ),
            None => self.query_bookmarks(
                &format!(
                    "SELECT {} FROM bookmarks WHERE group_id IS NULL ORDER BY created_at, rowid",
                    BOOKMARK_COLUMNS
                ),
                &[],
            ),
        }
    }

    fn list_all_bookmarks(&self) -> Result<Vec<Bookmark>, BookmarkError> {
        self.query_bookmarks(
            &format!("SELECT {} FROM bookmarks ORDER BY created_at, rowid", BOOKMARK_COLUMNS),
            &[],
        )
    }

    fn release_group(&mut self, group_id: &str) -> Result<Vec<Bookmark>, BookmarkError> {
        let mut released = self.list_bookmarks(Some(group_id))?;
        let now = Self::now();

        self.conn
            .execute(
                "UPDATE bookmarks SET group_id = NULL, x = 0, y = 0, updated_at = ?1 WHERE group_id = ?2",
                params![now, group_id],
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        for bookmark in &mut released {
            bookmark.group_id = None;
            bookmark.set_rect(bookmark.rect().at_origin());
            bookmark.updated_at = now;
        }
        Ok(released)
    }
}
