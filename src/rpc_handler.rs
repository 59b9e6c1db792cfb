//! RPC method handler for the dashboard JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches synchronous calls; `handle_container_health`
//! is the one async method and runs on the binary's tokio runtime.

use std::sync::Mutex;

use crate::app::App;
use crate::managers::layout_state::LayoutState;
use crate::services::icon_resolver::resolve_icon;
use crate::services::mutation_api::MutationApi;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::bookmark::{BookmarkPatch, NewBookmark};
use crate::types::group::{GroupLayoutPatch, NewGroup};
use crate::types::widget::NewWidget;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

fn i32_param(params: &Value, key: &str) -> Result<i32, String> {
    let raw = params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| format!("missing {}", key))?;
    i32::try_from(raw).map_err(|_| format!("{} out of range: {}", key, raw))
}

fn from_params<T: DeserializeOwned>(value: &Value) -> Result<T, String> {
    serde_json::from_value(value.clone()).map_err(|e| format!("invalid params: {}", e))
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

fn layout_json(layout: &LayoutState) -> Result<Value, String> {
    let snapshot = layout.snapshot();
    Ok(json!({
        "edit_mode": layout.is_editing(),
        "bookmarks": to_json(&snapshot.bookmarks)?,
        "groups": to_json(&snapshot.groups)?,
    }))
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Dashboard ───
        "dashboard.load" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.reload_layout().map_err(|e| e.to_string())?;
            to_json(&a.layout.snapshot())
        }

        // ─── Bookmarks ───
        "bookmark.create" => {
            let input: NewBookmark = from_params(params)?;
            if input.name.trim().is_empty() {
                return Err("missing name".to_string());
            }
            if input.url.trim().is_empty() {
                return Err("missing url".to_string());
            }
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let db = a.db().map_err(|e| e.to_string())?;
            let created = MutationApi::new(db.connection())
                .create_bookmark(&input)
                .map_err(|e| e.to_string())?;
            a.layout.apply_created_bookmark(created.clone());
            to_json(&created)
        }
        "bookmark.get" => {
            let id = str_param(params, "id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let db = a.db().map_err(|e| e.to_string())?;
            let bookmark = MutationApi::new(db.connection())
                .get_bookmark(id)
                .map_err(|e| e.to_string())?;
            to_json(&bookmark)
        }
        "bookmark.update" => {
            let id = str_param(params, "id")?;
            let patch: BookmarkPatch = from_params(params.get("patch").unwrap_or(&json!({})))?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let db = a.db().map_err(|e| e.to_string())?;
            let updated = MutationApi::new(db.connection())
                .update_bookmark(id, &patch)
                .map_err(|e| e.to_string())?;

            let moves_tile = patch.group_id.is_some()
                || patch.x.is_some()
                || patch.y.is_some()
                || patch.w.is_some()
                || patch.h.is_some();
            if moves_tile {
                a.reload_layout().map_err(|e| e.to_string())?;
            } else if a.layout.apply_updated_bookmark(&updated).is_err() {
                tracing::debug!(id, "updated bookmark is not in the layout");
            }
            to_json(&updated)
        }
        "bookmark.delete" => {
            let id = str_param(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let a = &mut *a;
            let db = a.db().map_err(|e| e.to_string())?;
            let mut api = MutationApi::new(db.connection());
            a.layout.delete_bookmark(id, &mut api).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }

        // ─── Widgets ───
        "widget.add" => {
            let bookmark_id = str_param(params, "bookmark_id")?;
            let input: NewWidget = from_params(params)?;
            if input.widget_type.trim().is_empty() {
                return Err("missing type".to_string());
            }
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let db = a.db().map_err(|e| e.to_string())?;
            let widget = MutationApi::new(db.connection())
                .add_widget(bookmark_id, &input)
                .map_err(|e| e.to_string())?;
            a.layout.apply_added_widget(widget.clone());
            to_json(&widget)
        }
        "widget.list" => {
            let bookmark_id = str_param(params, "bookmark_id")?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let db = a.db().map_err(|e| e.to_string())?;
            let widgets = MutationApi::new(db.connection())
                .list_widgets(bookmark_id)
                .map_err(|e| e.to_string())?;
            to_json(&widgets)
        }
        "widget.types" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            to_json(&a.widgets.list())
        }
        "widget.render" => {
            let widget_type = str_param(params, "type")?;
            let config: Map<String, Value> = match params.get("config") {
                Some(Value::Object(map)) => map.clone(),
                _ => Map::new(),
            };
            let a = app.lock().map_err(|e| e.to_string())?;
            to_json(&a.widgets.render(widget_type, &config))
        }

        // ─── Groups ───
        "group.create" => {
            let input: NewGroup = from_params(params)?;
            if input.name.trim().is_empty() {
                return Err("missing name".to_string());
            }
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let db = a.db().map_err(|e| e.to_string())?;
            let group = MutationApi::new(db.connection())
                .create_group(&input)
                .map_err(|e| e.to_string())?;
            a.layout.apply_created_group(group.clone());
            to_json(&group)
        }
        "group.update_layout" => {
            let id = str_param(params, "id")?;
            let patch: GroupLayoutPatch = from_params(params)?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let db = a.db().map_err(|e| e.to_string())?;
            let layout = MutationApi::new(db.connection())
                .update_group_layout(id, &patch)
                .map_err(|e| e.to_string())?;
            if a.layout.apply_group_layout(&layout).is_err() {
                tracing::debug!(id, "updated group is not in the layout");
            }
            to_json(&layout)
        }
        "group.delete" => {
            let id = str_param(params, "id")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let a = &mut *a;
            let db = a.db().map_err(|e| e.to_string())?;
            let mut api = MutationApi::new(db.connection());
            let released = a.layout.delete_group(id, &mut api).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true, "released": to_json(&released)?}))
        }

        // ─── Layout state ───
        "layout.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            layout_json(&a.layout)
        }
        "layout.toggle_edit" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let editing = match params.get("on").and_then(|v| v.as_bool()) {
                Some(on) => {
                    a.layout.set_edit(on);
                    on
                }
                None => a.layout.toggle_edit(),
            };
            Ok(json!({"edit_mode": editing}))
        }
        "layout.drop" => {
            let active_id = str_param(params, "active_id")?;
            let over_id = params.get("over_id").and_then(|v| v.as_str());
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let a = &mut *a;
            let db = a.db().map_err(|e| e.to_string())?;
            let mut api = MutationApi::new(db.connection());
            let outcome = a
                .layout
                .handle_drop(active_id, over_id, &mut api)
                .map_err(|e| e.to_string())?;
            to_json(&outcome)
        }
        "layout.resize_bookmark" => {
            let id = str_param(params, "id")?;
            let dw = i32_param(params, "dw")?;
            let dh = i32_param(params, "dh")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let a = &mut *a;
            let db = a.db().map_err(|e| e.to_string())?;
            let mut api = MutationApi::new(db.connection());
            let rect = a
                .layout
                .resize_bookmark(id, dw, dh, &mut api)
                .map_err(|e| e.to_string())?;
            to_json(&rect)
        }
        "layout.resize_group" => {
            let id = str_param(params, "id")?;
            let dw = i32_param(params, "dw")?;
            let dh = i32_param(params, "dh")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let a = &mut *a;
            let db = a.db().map_err(|e| e.to_string())?;
            let mut api = MutationApi::new(db.connection());
            let rect = a
                .layout
                .resize_group(id, dw, dh, &mut api)
                .map_err(|e| e.to_string())?;
            to_json(&rect)
        }

        // ─── Settings & seeding ───
        "settings.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let engine = a.settings_engine().map_err(|e| e.to_string())?;
            Ok(json!({
                "yaml_path": engine.get_settings().yaml_path,
                "seed_path": engine.seed_path().to_string_lossy(),
            }))
        }
        "settings.set_seed_path" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let mut engine = a.settings_engine().map_err(|e| e.to_string())?;
            let written = match params.get("path") {
                Some(Value::String(path)) => engine.set_seed_path(path),
                Some(Value::Null) | None => engine.clear_seed_path(),
                Some(_) => return Err("path must be a string or null".to_string()),
            };
            written.map_err(|e| e.to_string())?;
            Ok(json!({
                "yaml_path": engine.get_settings().yaml_path,
                "seed_path": engine.seed_path().to_string_lossy(),
            }))
        }
        "seed.import" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let report = a.import_seed();
            if report.is_applied() {
                a.reload_layout().map_err(|e| e.to_string())?;
            }
            to_json(&report)
        }

        // ─── Icons ───
        "icon.resolve" => {
            let icon = str_param(params, "icon")?;
            Ok(json!({"url": resolve_icon(icon)}))
        }

        "container.health" => Err("container.health is async; use handle_container_health".to_string()),

        _ => Err(format!("unknown method: {}", method)),
    }
}

/// Looks up the health of a container, named directly (`container`) or
/// through a bookmark (`bookmark_id`). The app lock is released before the
/// runtime is contacted.
pub async fn handle_container_health(app: &Mutex<App>, params: &Value) -> Result<Value, String> {
    let (service, container) = {
        let a = app.lock().map_err(|e| e.to_string())?;
        let container = match (params.get("container"), params.get("bookmark_id")) {
            (Some(Value::String(name)), _) => Some(name.clone()),
            (_, Some(Value::String(id))) => {
                let db = a.db().map_err(|e| e.to_string())?;
                MutationApi::new(db.connection())
                    .get_bookmark(id)
                    .map_err(|e| e.to_string())?
                    .container
            }
            _ => None,
        };
        (a.health.clone(), container)
    };

    let health = service.get_container_health(container.as_deref()).await;
    Ok(json!({"container": container, "health": health}))
}
