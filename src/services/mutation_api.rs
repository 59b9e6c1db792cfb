//! Mutation API for the dashboard.
//!
//! The only write path into the store. Every operation checks its invariants,
//! runs as one SQLite transaction and returns the record the caller should
//! reconcile against.

use rusqlite::Connection;

use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::managers::group_manager::{GroupManager, GroupManagerTrait};
use crate::managers::layout_state::LayoutBackend;
use crate::managers::widget_manager::{WidgetManager, WidgetManagerTrait};
use crate::types::bookmark::{Bookmark, BookmarkPatch, BookmarkTile, NewBookmark};
use crate::types::dashboard::DashboardSnapshot;
use crate::types::errors::MutationError;
use crate::types::group::{Group, GroupDeletion, GroupLayout, GroupLayoutPatch, GroupTile, NewGroup};
use crate::types::layout::GridRect;
use crate::types::widget::{NewWidget, Widget};

/// Mutation API over a borrowed store connection.
pub struct MutationApi<'a> {
    conn: &'a Connection,
}

impl<'a> MutationApi<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Creates an ungrouped bookmark at the default layout (0,0 4x2).
    pub fn create_bookmark(&self, input: &NewBookmark) -> Result<Bookmark, MutationError> {
        let mut bookmarks = BookmarkManager::new(self.conn);
        let bookmark = bookmarks.create_bookmark(input, GridRect::bookmark_default())?;
        tracing::debug!(id = %bookmark.id, name = %bookmark.name, "bookmark created");
        Ok(bookmark)
    }

    pub fn get_bookmark(&self, id: &str) -> Result<Bookmark, MutationError> {
        BookmarkManager::new(self.conn)
            .get_bookmark(id)?
            .ok_or_else(|| MutationError::NotFound(format!("bookmark {}", id)))
    }

    /// Applies a partial update.
    ///
    /// Changing the group reference (including detaching) moves the tile into a
    /// different coordinate space, so its position is reset to the origin before
    /// any `x`/`y` carried by the same patch is applied.
    pub fn update_bookmark(&self, id: &str, patch: &BookmarkPatch) -> Result<Bookmark, MutationError> {
        let tx = self.conn.unchecked_transaction()?;
        let updated = {
            let mut bookmarks = BookmarkManager::new(&tx);
            let current = bookmarks
                .get_bookmark(id)?
                .ok_or_else(|| MutationError::NotFound(format!("bookmark {}", id)))?;

            let mut patch = patch.clone();
            if let Some(target) = &patch.group_id {
                if *target != current.group_id {
                    patch.x = Some(patch.x.unwrap_or(0));
                    patch.y = Some(patch.y.unwrap_or(0));
                }
            }
            bookmarks.update_bookmark(id, &patch)?
        };
        tx.commit()?;

        tracing::debug!(id, group = ?updated.group_id, "bookmark updated");
        Ok(updated)
    }

    /// Deletes a bookmark and its widgets. Deleting an absent id succeeds.
    pub fn delete_bookmark(&self, id: &str) -> Result<(), MutationError> {
        let tx = self.conn.unchecked_transaction()?;
        let existed = {
            let removed_widgets = WidgetManager::new(&tx).delete_for_bookmark(id)?;
            let existed = BookmarkManager::new(&tx).delete_bookmark(id)?;
            tracing::debug!(id, existed, removed_widgets, "bookmark deleted");
            existed
        };
        tx.commit()?;
        if !existed {
            tracing::debug!(id, "delete of absent bookmark treated as success");
        }
        Ok(())
    }

    /// Attaches a widget to an existing bookmark.
    pub fn add_widget(&self, bookmark_id: &str, input: &NewWidget) -> Result<Widget, MutationError> {
        let widget = WidgetManager::new(self.conn).add_widget(bookmark_id, input)?;
        tracing::debug!(bookmark_id, widget_type = %widget.widget_type, "widget added");
        Ok(widget)
    }

    pub fn list_widgets(&self, bookmark_id: &str) -> Result<Vec<Widget>, MutationError> {
        Ok(WidgetManager::new(self.conn).list_widgets(bookmark_id)?)
    }

    /// Creates an empty group at the default layout (0,0 8x4).
    pub fn create_group(&self, input: &NewGroup) -> Result<Group, MutationError> {
        let group = GroupManager::new(self.conn).create_group(input, GridRect::group_default())?;
        tracing::debug!(id = %group.id, name = %group.name, "group created");
        Ok(group)
    }

    pub fn update_group_layout(&self, id: &str, patch: &GroupLayoutPatch) -> Result<GroupLayout, MutationError> {
        let group = GroupManager::new(self.conn).update_layout(id, patch)?;
        tracing::debug!(id, x = group.x, y = group.y, w = group.w, h = group.h, "group layout updated");
        Ok(GroupLayout {
            id: group.id,
            x: group.x,
            y: group.y,
            w: group.w,
            h: group.h,
        })
    }

    /// Deletes a group, releasing its bookmarks to the root origin.
    ///
    /// Deleting an absent id succeeds with an empty release list.
    pub fn delete_group(&self, id: &str) -> Result<GroupDeletion, MutationError> {
        let tx = self.conn.unchecked_transaction()?;
        let released = {
            let mut groups = GroupManager::new(&tx);
            if groups.get_group(id)?.is_none() {
                return Ok(GroupDeletion { ok: true, released: Vec::new() });
            }
            let released = BookmarkManager::new(&tx).release_group(id)?;
            groups.delete_group(id)?;
            released
        };
        tx.commit()?;

        tracing::debug!(id, released = released.len(), "group deleted");
        Ok(GroupDeletion { ok: true, released })
    }

    /// Reads the store partitioned into root tiles and group tiles.
    pub fn load_dashboard(&self) -> Result<DashboardSnapshot, MutationError> {
        let bookmarks = BookmarkManager::new(self.conn).list_all_bookmarks()?;
        let groups = GroupManager::new(self.conn).list_groups()?;
        let widgets = WidgetManager::new(self.conn);

        let mut snapshot = DashboardSnapshot {
            bookmarks: Vec::new(),
            groups: groups.into_iter().map(GroupTile::new).collect(),
        };

        for bookmark in bookmarks {
            let tile = BookmarkTile {
                widgets: widgets.list_widgets(&bookmark.id)?,
                bookmark,
            };
            let owner = tile
                .bookmark
                .group_id
                .as_deref()
                .and_then(|gid| snapshot.groups.iter_mut().find(|g| g.id() == gid));
            match owner {
                Some(group) => group.bookmarks.push(tile),
                None => snapshot.bookmarks.push(tile),
            }
        }
        Ok(snapshot)
    }
}

impl<'a> LayoutBackend for MutationApi<'a> {
    fn update_bookmark(&mut self, id: &str, patch: &BookmarkPatch) -> Result<Bookmark, MutationError> {
        MutationApi::update_bookmark(self, id, patch)
    }

    fn update_group_layout(&mut self, id: &str, patch: &GroupLayoutPatch) -> Result<GroupLayout, MutationError> {
        MutationApi::update_group_layout(self, id, patch)
    }

    fn delete_bookmark(&mut self, id: &str) -> Result<(), MutationError> {
        MutationApi::delete_bookmark(self, id)
    }

    fn delete_group(&mut self, id: &str) -> Result<GroupDeletion, MutationError> {
        MutationApi::delete_group(self, id)
    }
}
