use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A widget attached to a bookmark. `widget_type` keys into the widget registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: String,
    #[serde(rename = "type")]
    pub widget_type: String,
    #[serde(default)]
    pub config: Map<String, Value>,
    pub bookmark_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Input for attaching a widget to a bookmark.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewWidget {
    #[serde(rename = "type")]
    pub widget_type: String,
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl NewWidget {
    pub fn new(widget_type: &str) -> Self {
        Self {
            widget_type: widget_type.to_string(),
            config: Map::new(),
        }
    }
}
