use serde::{Deserialize, Serialize};

/// Minimum tile width in grid units.
pub const MIN_W: i32 = 1;
/// Minimum tile height in grid units.
pub const MIN_H: i32 = 1;

/// Default span of a newly created bookmark tile.
pub const BOOKMARK_DEFAULT_W: i32 = 4;
pub const BOOKMARK_DEFAULT_H: i32 = 2;

/// Default span of a newly created group tile.
pub const GROUP_DEFAULT_W: i32 = 8;
pub const GROUP_DEFAULT_H: i32 = 4;

/// Position and size of a tile, in grid units.
///
/// Coordinates are relative to the grid that owns the tile: the page root for
/// ungrouped bookmarks and groups, the group's child grid for grouped bookmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl GridRect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }.normalized()
    }

    /// Default layout for a new bookmark: origin, 4x2.
    pub fn bookmark_default() -> Self {
        Self::new(0, 0, BOOKMARK_DEFAULT_W, BOOKMARK_DEFAULT_H)
    }

    /// Default layout for a new group: origin, 8x4.
    pub fn group_default() -> Self {
        Self::new(0, 0, GROUP_DEFAULT_W, GROUP_DEFAULT_H)
    }

    /// Clamps position to the origin quadrant and size to the 1x1 floor.
    pub fn normalized(self) -> Self {
        Self {
            x: clamp_position(self.x),
            y: clamp_position(self.y),
            w: clamp_width(self.w),
            h: clamp_height(self.h),
        }
    }

    /// Applies a relative resize, never going below the 1x1 floor.
    pub fn resized_by(self, dw: i32, dh: i32) -> Self {
        Self {
            w: clamp_width(self.w.saturating_add(dw)),
            h: clamp_height(self.h.saturating_add(dh)),
            ..self
        }
    }

    /// Same size, moved to the origin of its grid.
    pub fn at_origin(self) -> Self {
        Self { x: 0, y: 0, ..self }
    }
}

pub fn clamp_position(v: i32) -> i32 {
    v.max(0)
}

pub fn clamp_width(w: i32) -> i32 {
    w.max(MIN_W)
}

pub fn clamp_height(h: i32) -> i32 {
    h.max(MIN_H)
}
