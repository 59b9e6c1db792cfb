//! Widget Registry for the dashboard.
//!
//! Maps a widget type key to the module that knows how to present it. Rendering
//! an unregistered type yields a fallback block naming the type instead of an error.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Presentation produced for one widget instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedWidget {
    pub widget_type: String,
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
    /// Set when no module is registered for `widget_type`.
    #[serde(default)]
    pub fallback: bool,
}

impl RenderedWidget {
    pub fn unknown(widget_type: &str) -> Self {
        Self {
            widget_type: widget_type.to_string(),
            title: widget_type.to_string(),
            body: format!("Unknown widget: {}", widget_type),
            actions: Vec::new(),
            fallback: true,
        }
    }
}

/// A widget type the dashboard can render.
pub trait WidgetModule: Send + Sync {
    fn key(&self) -> &str;
    fn title(&self) -> &str;
    fn render(&self, config: &Map<String, Value>) -> RenderedWidget;
}

/// Summary of a registered module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetDescriptor {
    pub key: String,
    pub title: String,
}

/// Download client status widget. Shows a placeholder transfer rate.
pub struct QbittorrentWidget;

impl QbittorrentWidget {
    pub const KEY: &'static str = "qbittorrent";
}

impl WidgetModule for QbittorrentWidget {
    fn key(&self) -> &str {
        Self::KEY
    }

    fn title(&self) -> &str {
        "qBittorrent"
    }

    fn render(&self, config: &Map<String, Value>) -> RenderedWidget {
        let title = config
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_else(|| self.title())
            .to_string();
        RenderedWidget {
            widget_type: Self::KEY.to_string(),
            title,
            body: "Down: 0 MB/s \u{2022} Up: 0 MB/s".to_string(),
            actions: vec!["Pause All".to_string()],
            fallback: false,
        }
    }
}

/// Registry of widget modules keyed by type.
#[derive(Clone, Default)]
pub struct WidgetRegistry {
    modules: HashMap<String, Arc<dyn WidgetModule>>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in modules.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(QbittorrentWidget));
        registry
    }

    /// Registers a module, replacing any previous one with the same key.
    pub fn register(&mut self, module: Arc<dyn WidgetModule>) -> Option<Arc<dyn WidgetModule>> {
        self.modules.insert(module.key().to_string(), module)
    }

    pub fn get(&self, widget_type: &str) -> Option<Arc<dyn WidgetModule>> {
        self.modules.get(widget_type).cloned()
    }

    pub fn contains(&self, widget_type: &str) -> bool {
        self.modules.contains_key(widget_type)
    }

    /// Registered modules, sorted by key.
    pub fn list(&self) -> Vec<WidgetDescriptor> {
        let mut out: Vec<WidgetDescriptor> = self
            .modules
            .values()
            .map(|m| WidgetDescriptor {
                key: m.key().to_string(),
                title: m.title().to_string(),
            })
            .collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        out
    }

    pub fn render(&self, widget_type: &str, config: &Map<String, Value>) -> RenderedWidget {
        match self.modules.get(widget_type) {
            Some(module) => module.render(config),
            None => RenderedWidget::unknown(widget_type),
        }
    }
}

impl std::fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.modules.keys().collect();
        keys.sort();
        f.debug_struct("WidgetRegistry").field("modules", &keys).finish()
    }
}
