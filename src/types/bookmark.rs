use serde::{Deserialize, Deserializer, Serialize};

use super::layout::GridRect;
use super::widget::Widget;

/// A bookmark tile as persisted in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub name: String,
    pub url: String,
    pub icon: Option<String>,
    pub icon_only: bool,
    pub subtext: Option<String>,
    pub container: Option<String>,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub group_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Bookmark {
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

/// Input for creating a bookmark. Layout always starts at the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBookmark {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub subtext: Option<String>,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub icon_only: bool,
}

impl NewBookmark {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            ..Self::default()
        }
    }
}

/// Field-level update for a bookmark; `None` leaves the stored value untouched.
///
/// Nullable columns use `Option<Option<_>>`: `Some(None)` clears the value.
/// For `group_id`, `Some(None)` detaches the bookmark from its group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookmarkPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "present_or_null", skip_serializing_if = "Option::is_none")]
    pub icon: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_or_null", skip_serializing_if = "Option::is_none")]
    pub subtext: Option<Option<String>>,
    #[serde(default, deserialize_with = "present_or_null", skip_serializing_if = "Option::is_none")]
    pub container: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_only: Option<bool>,
    #[serde(default, deserialize_with = "present_or_null", skip_serializing_if = "Option::is_none")]
    pub group_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<i32>,
}

impl BookmarkPatch {
    pub fn group(group_id: Option<&str>) -> Self {
        Self {
            group_id: Some(group_id.map(str::to_string)),
            ..Self::default()
        }
    }

    pub fn size(w: i32, h: i32) -> Self {
        Self {
            w: Some(w),
            h: Some(h),
            ..Self::default()
        }
    }
}

/// Maps an explicit JSON `null` to `Some(None)` while a missing key stays `None`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A bookmark together with its widgets, as handed to the layout state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkTile {
    #[serde(flatten)]
    pub bookmark: Bookmark,
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

impl BookmarkTile {
    pub fn new(bookmark: Bookmark) -> Self {
        Self { bookmark, widgets: Vec::new() }
    }

    pub fn id(&self) -> &str {
        &self.bookmark.id
    }
}
