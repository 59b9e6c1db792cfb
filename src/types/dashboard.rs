use serde::{Deserialize, Serialize};

use super::bookmark::BookmarkTile;
use super::group::GroupTile;

/// The store partitioned the way the page renders it: root tiles and group tiles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    /// Bookmarks with no owning group.
    pub bookmarks: Vec<BookmarkTile>,
    /// Groups, each carrying the bookmarks it owns.
    pub groups: Vec<GroupTile>,
}
