//! Client layout state for the dashboard.
//!
//! An in-memory mirror of the root tiles and of each group's tiles. User
//! actions update this state first and then call the mutation API through the
//! [`LayoutBackend`] seam. Overlapping calls are neither queued nor coalesced:
//! the store keeps whichever write lands last.

use serde::{Deserialize, Serialize};

use crate::types::bookmark::{Bookmark, BookmarkPatch, BookmarkTile};
use crate::types::dashboard::DashboardSnapshot;
use crate::types::errors::{LayoutError, MutationError};
use crate::types::group::{Group, GroupDeletion, GroupLayout, GroupLayoutPatch, GroupTile};
use crate::types::layout::GridRect;
use crate::types::widget::Widget;

/// Drag id prefix for bookmark tiles.
pub const BOOKMARK_DRAG_PREFIX: &str = "bk:";
/// Drop zone id prefix for groups.
pub const GROUP_DROP_PREFIX: &str = "grp:";

/// The mutation calls the layout state issues after an optimistic update.
pub trait LayoutBackend {
    fn update_bookmark(&mut self, id: &str, patch: &BookmarkPatch) -> Result<Bookmark, MutationError>;
    fn update_group_layout(&mut self, id: &str, patch: &GroupLayoutPatch) -> Result<GroupLayout, MutationError>;
    fn delete_bookmark(&mut self, id: &str) -> Result<(), MutationError>;
    fn delete_group(&mut self, id: &str) -> Result<GroupDeletion, MutationError>;
}

/// What to do with an optimistic change when its mutation call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackPolicy {
    /// Leave the optimistic change in place and surface the error.
    #[default]
    Keep,
    /// Restore the state captured before the change, then surface the error.
    Revert,
}

/// Where a bookmark tile currently lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "group_id", rename_all = "snake_case")]
pub enum Placement {
    Root,
    InGroup(String),
}

impl Placement {
    fn group_id(&self) -> Option<&str> {
        match self {
            Placement::Root => None,
            Placement::InGroup(gid) => Some(gid),
        }
    }
}

/// Where a dragged tile was released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Group(String),
    Root,
}

impl DropTarget {
    /// A `grp:<id>` drop zone routes into that group; anything else is the root grid.
    pub fn from_over_id(over_id: Option<&str>) -> Self {
        match over_id.and_then(|id| id.strip_prefix(GROUP_DROP_PREFIX)) {
            Some(gid) if !gid.is_empty() => DropTarget::Group(gid.to_string()),
            _ => DropTarget::Root,
        }
    }
}

/// Result of handling a drag end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DropOutcome {
    /// Not in edit mode, or the dragged item is not a bookmark tile.
    Ignored,
    /// The tile was dropped on the container it already lives in.
    Unchanged { bookmark_id: String },
    Moved { bookmark_id: String, to: Placement },
}

/// Optimistic mirror of the dashboard layout.
#[derive(Debug, Clone, Default)]
pub struct LayoutState {
    root: Vec<BookmarkTile>,
    groups: Vec<GroupTile>,
    edit_mode: bool,
    rollback: RollbackPolicy,
}

impl LayoutState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hydrates the state from a store read.
    pub fn from_snapshot(snapshot: DashboardSnapshot) -> Self {
        Self {
            root: snapshot.bookmarks,
            groups: snapshot.groups,
            ..Self::default()
        }
    }

    pub fn with_rollback(mut self, policy: RollbackPolicy) -> Self {
        self.rollback = policy;
        self
    }

    /// Replaces tiles with a fresh store read, keeping edit mode and policy.
    pub fn replace(&mut self, snapshot: DashboardSnapshot) {
        self.root = snapshot.bookmarks;
        self.groups = snapshot.groups;
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            bookmarks: self.root.clone(),
            groups: self.groups.clone(),
        }
    }

    pub fn root_tiles(&self) -> &[BookmarkTile] {
        &self.root
    }

    pub fn groups(&self) -> &[GroupTile] {
        &self.groups
    }

    pub fn group(&self, group_id: &str) -> Option<&GroupTile> {
        self.groups.iter().find(|g| g.id() == group_id)
    }

    pub fn rollback_policy(&self) -> RollbackPolicy {
        self.rollback
    }

    // ─── Edit mode ───

    pub fn is_editing(&self) -> bool {
        self.edit_mode
    }

    pub fn set_edit(&mut self, on: bool) {
        self.edit_mode = on;
    }

    pub fn toggle_edit(&mut self) -> bool {
        self.edit_mode = !self.edit_mode;
        self.edit_mode
    }

    // ─── Lookups ───

    pub fn placement(&self, bookmark_id: &str) -> Option<Placement> {
        if self.root.iter().any(|t| t.id() == bookmark_id) {
            return Some(Placement::Root);
        }
        self.groups
            .iter()
            .find(|g| g.bookmarks.iter().any(|t| t.id() == bookmark_id))
            .map(|g| Placement::InGroup(g.id().to_string()))
    }

    pub fn tile(&self, bookmark_id: &str) -> Option<&BookmarkTile> {
        self.root
            .iter()
            .chain(self.groups.iter().flat_map(|g| g.bookmarks.iter()))
            .find(|t| t.id() == bookmark_id)
    }

    fn tile_mut(&mut self, bookmark_id: &str) -> Option<&mut BookmarkTile> {
        self.root
            .iter_mut()
            .chain(self.groups.iter_mut().flat_map(|g| g.bookmarks.iter_mut()))
            .find(|t| t.id() == bookmark_id)
    }

    /// Removes the tile from whichever collection holds it.
    fn take_tile(&mut self, bookmark_id: &str) -> Option<BookmarkTile> {
        if let Some(idx) = self.root.iter().position(|t| t.id() == bookmark_id) {
            return Some(self.root.remove(idx));
        }
        for group in &mut self.groups {
            if let Some(idx) = group.bookmarks.iter().position(|t| t.id() == bookmark_id) {
                return Some(group.bookmarks.remove(idx));
            }
        }
        None
    }

    // ─── Reconciliation with server records ───

    /// Appends a server-created bookmark to the root collection.
    pub fn apply_created_bookmark(&mut self, bookmark: Bookmark) {
        if self.tile(&bookmark.id).is_none() {
            self.root.push(BookmarkTile::new(bookmark));
        }
    }

    pub fn apply_created_group(&mut self, group: Group) {
        if self.group(&group.id).is_none() {
            self.groups.push(GroupTile::new(group));
        }
    }

    /// Copies descriptive fields from an edit-form result onto the local tile.
    pub fn apply_updated_bookmark(&mut self, updated: &Bookmark) -> Result<(), LayoutError> {
        let tile = self
            .tile_mut(&updated.id)
            .ok_or_else(|| LayoutError::TileNotFound(updated.id.clone()))?;
        let b = &mut tile.bookmark;
        b.name = updated.name.clone();
        b.url = updated.url.clone();
        b.icon = updated.icon.clone();
        b.subtext = updated.subtext.clone();
        b.icon_only = updated.icon_only;
        b.container = updated.container.clone();
        b.updated_at = updated.updated_at;
        Ok(())
    }

    /// Attaches a server-created widget to its tile, if the tile is shown.
    pub fn apply_added_widget(&mut self, widget: Widget) {
        let Some(owner) = widget.bookmark_id.clone() else {
            return;
        };
        if let Some(tile) = self.tile_mut(&owner) {
            tile.widgets.push(widget);
        }
    }

    /// Copies a group's stored layout onto its local tile.
    pub fn apply_group_layout(&mut self, layout: &GroupLayout) -> Result<(), LayoutError> {
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.id() == layout.id)
            .ok_or_else(|| LayoutError::TileNotFound(layout.id.clone()))?;
        group.group.set_rect(GridRect::new(layout.x, layout.y, layout.w, layout.h));
        Ok(())
    }

    // ─── Optimistic mutations ───

    fn finish<T>(
        &mut self,
        saved: Option<(Vec<BookmarkTile>, Vec<GroupTile>)>,
        result: Result<T, MutationError>,
    ) -> Result<T, LayoutError> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                if let Some((root, groups)) = saved {
                    tracing::debug!(error = %err, "reverting optimistic layout change");
                    self.root = root;
                    self.groups = groups;
                }
                Err(LayoutError::Mutation(err))
            }
        }
    }

    fn save_point(&self) -> Option<(Vec<BookmarkTile>, Vec<GroupTile>)> {
        match self.rollback {
            RollbackPolicy::Revert => Some((self.root.clone(), self.groups.clone())),
            RollbackPolicy::Keep => None,
        }
    }

    /// Moves a tile into `group_id`, resetting it to the group grid's origin.
    ///
    /// Dropping onto the group the tile already lives in changes nothing
    /// locally; the call still goes out and is idempotent at the store. A group
    /// this state does not hold is `TileNotFound` and nothing is sent.
    pub fn move_into_group<B: LayoutBackend + ?Sized>(
        &mut self,
        bookmark_id: &str,
        group_id: &str,
        backend: &mut B,
    ) -> Result<Placement, LayoutError> {
        let placement = self
            .placement(bookmark_id)
            .ok_or_else(|| LayoutError::TileNotFound(bookmark_id.to_string()))?;
        if self.group(group_id).is_none() {
            return Err(LayoutError::TileNotFound(group_id.to_string()));
        }
        let saved = self.save_point();

        if placement.group_id() != Some(group_id) {
            if let Some(mut tile) = self.take_tile(bookmark_id) {
                tile.bookmark.group_id = Some(group_id.to_string());
                tile.bookmark.set_rect(tile.bookmark.rect().at_origin());
                if let Some(group) = self.groups.iter_mut().find(|g| g.id() == group_id) {
                    group.bookmarks.push(tile);
                }
            }
        }

        let result = backend.update_bookmark(bookmark_id, &BookmarkPatch::group(Some(group_id)));
        self.finish(saved, result)?;
        Ok(Placement::InGroup(group_id.to_string()))
    }

    /// Moves a tile out of its group onto the root grid's origin.
    pub fn move_to_root<B: LayoutBackend + ?Sized>(
        &mut self,
        bookmark_id: &str,
        backend: &mut B,
    ) -> Result<Placement, LayoutError> {
        let placement = self
            .placement(bookmark_id)
            .ok_or_else(|| LayoutError::TileNotFound(bookmark_id.to_string()))?;
        let saved = self.save_point();

        if placement != Placement::Root {
            if let Some(mut tile) = self.take_tile(bookmark_id) {
                tile.bookmark.group_id = None;
                tile.bookmark.set_rect(tile.bookmark.rect().at_origin());
                self.root.push(tile);
            }
        }

        let result = backend.update_bookmark(bookmark_id, &BookmarkPatch::group(None));
        self.finish(saved, result)?;
        Ok(Placement::Root)
    }

    /// Routes a drag end. `active_id` is the dragged item, `over_id` the drop zone (if any).
    pub fn handle_drop<B: LayoutBackend + ?Sized>(
        &mut self,
        active_id: &str,
        over_id: Option<&str>,
        backend: &mut B,
    ) -> Result<DropOutcome, LayoutError> {
        if !self.edit_mode {
            return Ok(DropOutcome::Ignored);
        }
        let Some(bookmark_id) = active_id.strip_prefix(BOOKMARK_DRAG_PREFIX) else {
            return Ok(DropOutcome::Ignored);
        };
        let before = self
            .placement(bookmark_id)
            .ok_or_else(|| LayoutError::TileNotFound(bookmark_id.to_string()))?;

        let after = match DropTarget::from_over_id(over_id) {
            DropTarget::Group(gid) => self.move_into_group(bookmark_id, &gid, backend)?,
            DropTarget::Root => self.move_to_root(bookmark_id, backend)?,
        };

        if before == after {
            Ok(DropOutcome::Unchanged { bookmark_id: bookmark_id.to_string() })
        } else {
            Ok(DropOutcome::Moved { bookmark_id: bookmark_id.to_string(), to: after })
        }
    }

    /// Grows or shrinks a bookmark tile by a relative delta, floored at 1x1.
    pub fn resize_bookmark<B: LayoutBackend + ?Sized>(
        &mut self,
        bookmark_id: &str,
        dw: i32,
        dh: i32,
        backend: &mut B,
    ) -> Result<GridRect, LayoutError> {
        let saved = self.save_point();
        let tile = self
            .tile_mut(bookmark_id)
            .ok_or_else(|| LayoutError::TileNotFound(bookmark_id.to_string()))?;
        let rect = tile.bookmark.rect().resized_by(dw, dh);
        tile.bookmark.set_rect(rect);

        let result = backend.update_bookmark(bookmark_id, &BookmarkPatch::size(rect.w, rect.h));
        self.finish(saved, result)?;
        Ok(rect)
    }

    /// Grows or shrinks a group tile by a relative delta, floored at 1x1.
    pub fn resize_group<B: LayoutBackend + ?Sized>(
        &mut self,
        group_id: &str,
        dw: i32,
        dh: i32,
        backend: &mut B,
    ) -> Result<GridRect, LayoutError> {
        let saved = self.save_point();
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.id() == group_id)
            .ok_or_else(|| LayoutError::TileNotFound(group_id.to_string()))?;
        let rect = group.group.rect().resized_by(dw, dh);
        group.group.set_rect(rect);

        let result = backend.update_group_layout(group_id, &GroupLayoutPatch::size(rect.w, rect.h));
        self.finish(saved, result)?;
        Ok(rect)
    }

    /// Deletes a bookmark at the store, then drops the tile locally.
    pub fn delete_bookmark<B: LayoutBackend + ?Sized>(
        &mut self,
        bookmark_id: &str,
        backend: &mut B,
    ) -> Result<(), LayoutError> {
        backend.delete_bookmark(bookmark_id)?;
        self.take_tile(bookmark_id);
        Ok(())
    }

    /// Deletes a group at the store, then moves the released tiles to the root collection.
    ///
    /// Tiles the group held locally but the server did not list as released are
    /// moved to the root origin too, so no bookmark drops out of view.
    pub fn delete_group<B: LayoutBackend + ?Sized>(
        &mut self,
        group_id: &str,
        backend: &mut B,
    ) -> Result<Vec<Bookmark>, LayoutError> {
        let deletion = backend.delete_group(group_id)?;

        let removed = self
            .groups
            .iter()
            .position(|g| g.id() == group_id)
            .map(|idx| self.groups.remove(idx));
        let mut local_tiles = removed.map(|g| g.bookmarks).unwrap_or_default();

        for released in &deletion.released {
            let widgets = local_tiles
                .iter()
                .position(|t| t.id() == released.id)
                .map(|idx| local_tiles.remove(idx).widgets)
                .unwrap_or_default();
            self.take_tile(&released.id);
            self.root.push(BookmarkTile {
                bookmark: released.clone(),
                widgets,
            });
        }

        // Tiles the server did not list still exist at the store.
        for mut tile in local_tiles {
            tile.bookmark.group_id = None;
            tile.bookmark.set_rect(tile.bookmark.rect().at_origin());
            self.root.push(tile);
        }
        Ok(deletion.released)
    }
}
