use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level shape of the declarative seed file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub bookmarks: Vec<SeedBookmark>,
}

/// One declared bookmark. `(name, url)` is its natural key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedBookmark {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default, rename = "iconOnly")]
    pub icon_only: Option<bool>,
    #[serde(default)]
    pub subtext: Option<String>,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub x: Option<i64>,
    #[serde(default)]
    pub y: Option<i64>,
    #[serde(default)]
    pub w: Option<i64>,
    #[serde(default)]
    pub h: Option<i64>,
    #[serde(default)]
    pub widgets: Vec<SeedWidget>,
}

/// A widget declared on a seed bookmark. Matched by `widget_type` on re-import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeedWidget {
    #[serde(rename = "type")]
    pub widget_type: String,
    #[serde(default)]
    pub config: Map<String, Value>,
}

/// Outcome of one import pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ImportReport {
    Applied {
        created: usize,
        updated: usize,
        widgets_created: usize,
    },
    Skipped {
        reason: String,
    },
}

impl ImportReport {
    pub fn is_applied(&self) -> bool {
        matches!(self, ImportReport::Applied { .. })
    }
}
