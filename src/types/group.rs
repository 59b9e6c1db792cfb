use serde::{Deserialize, Serialize};

use super::bookmark::{Bookmark, BookmarkTile};
use super::layout::GridRect;

/// A named container of bookmark tiles with its own child grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Group {
    pub fn rect(&self) -> GridRect {
        GridRect { x: self.x, y: self.y, w: self.w, h: self.h }
    }

    pub fn set_rect(&mut self, rect: GridRect) {
        self.x = rect.x;
        self.y = rect.y;
        self.w = rect.w;
        self.h = rect.h;
    }
}

/// Input for creating a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewGroup {
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Partial layout update for a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupLayoutPatch {
    #[serde(default)]
    pub x: Option<i32>,
    #[serde(default)]
    pub y: Option<i32>,
    #[serde(default)]
    pub w: Option<i32>,
    #[serde(default)]
    pub h: Option<i32>,
}

impl GroupLayoutPatch {
    pub fn size(w: i32, h: i32) -> Self {
        Self { w: Some(w), h: Some(h), ..Self::default() }
    }

    /// Applies the provided fields onto `rect`, then clamps to the layout floor.
    pub fn apply_to(&self, rect: GridRect) -> GridRect {
        GridRect {
            x: self.x.unwrap_or(rect.x),
            y: self.y.unwrap_or(rect.y),
            w: self.w.unwrap_or(rect.w),
            h: self.h.unwrap_or(rect.h),
        }
        .normalized()
    }
}

/// Layout returned by a group layout update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupLayout {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// Result of deleting a group: the bookmarks that were released to the root grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupDeletion {
    pub ok: bool,
    pub released: Vec<Bookmark>,
}

/// A group together with the tiles it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTile {
    #[serde(flatten)]
    pub group: Group,
    #[serde(default)]
    pub bookmarks: Vec<BookmarkTile>,
}

impl GroupTile {
    pub fn new(group: Group) -> Self {
        Self { group, bookmarks: Vec::new() }
    }

    pub fn id(&self) -> &str {
        &self.group.id
    }
}
