//! Seed Importer for the dashboard.
//!
//! One-way sync from the declarative YAML seed file into the store. New
//! bookmarks are created with their declared (or default) layout; existing ones,
//! matched by `(name, url)`, only get descriptive fields refreshed so a layout
//! arranged by hand is never overwritten. Widgets are added per missing type.
//!
//! Seeding is best effort: a missing or invalid file, or a store that is not
//! open, skips the whole pass without touching anything.

use rusqlite::Connection;
use std::fs;
use std::path::Path;

use crate::database::connection::DatabaseHandle;
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::managers::widget_manager::{WidgetManager, WidgetManagerTrait};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::bookmark::{Bookmark, BookmarkPatch, NewBookmark};
use crate::types::errors::SeedError;
use crate::types::layout::{GridRect, BOOKMARK_DEFAULT_H, BOOKMARK_DEFAULT_W};
use crate::types::seed::{ImportReport, SeedBookmark, SeedFile, SeedWidget};
use crate::types::widget::NewWidget;

/// Counts from a successful pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Applied {
    created: usize,
    updated: usize,
    widgets_created: usize,
}

/// Imports seed definitions through a borrowed store connection.
pub struct SeedImporter<'a> {
    conn: &'a Connection,
}

impl<'a> SeedImporter<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Imports the seed file at `path`. Never fails; problems are reported as `Skipped`.
    pub fn import_file(&self, path: &Path) -> ImportReport {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "seed file not readable, skipping import");
                return ImportReport::Skipped {
                    reason: SeedError::Io(e.to_string()).to_string(),
                };
            }
        };
        self.import_str(&content)
    }

    /// Imports seed definitions from YAML text. Never fails.
    pub fn import_str(&self, yaml: &str) -> ImportReport {
        match self.try_import_str(yaml) {
            Ok(applied) => {
                tracing::info!(
                    created = applied.created,
                    updated = applied.updated,
                    widgets_created = applied.widgets_created,
                    "seed import applied"
                );
                ImportReport::Applied {
                    created: applied.created,
                    updated: applied.updated,
                    widgets_created: applied.widgets_created,
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "seed import skipped");
                ImportReport::Skipped { reason: err.to_string() }
            }
        }
    }

    fn try_import_str(&self, yaml: &str) -> Result<Applied, SeedError> {
        let seed = parse_seed(yaml)?;
        validate_seed(&seed)?;
        self.apply(&seed)
    }

    /// Applies every entry inside one transaction; any failure rolls the pass back.
    fn apply(&self, seed: &SeedFile) -> Result<Applied, SeedError> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| SeedError::DatabaseError(e.to_string()))?;

        let mut applied = Applied::default();
        {
            let mut bookmarks = BookmarkManager::new(&tx);
            let mut widgets = WidgetManager::new(&tx);

            for entry in &seed.bookmarks {
                let found = bookmarks
                    .find_by_natural_key(&entry.name, &entry.url)
                    .map_err(|e| SeedError::DatabaseError(e.to_string()))?;

                let bookmark_id = match found {
                    None => {
                        let created = bookmarks
                            .create_bookmark(&new_bookmark_from(entry), declared_rect(entry))
                            .map_err(|e| SeedError::DatabaseError(e.to_string()))?;
                        applied.created += 1;
                        created.id
                    }
                    Some(existing) => {
                        let patch = descriptive_patch(entry, &existing);
                        if patch != BookmarkPatch::default() {
                            bookmarks
                                .update_bookmark(&existing.id, &patch)
                                .map_err(|e| SeedError::DatabaseError(e.to_string()))?;
                            applied.updated += 1;
                        }
                        existing.id
                    }
                };

                applied.widgets_created +=
                    add_missing_widgets(&mut widgets, &bookmark_id, &entry.widgets)?;
            }
        }

        tx.commit()
            .map_err(|e| SeedError::DatabaseError(e.to_string()))?;
        Ok(applied)
    }
}

/// Runs the startup import: resolve the seed path from settings, then import.
///
/// A closed store or an unreadable settings row skips the pass.
pub fn import_at_startup(handle: &DatabaseHandle, base_dir: Option<&Path>) -> ImportReport {
    let db = match handle.get() {
        Ok(db) => db,
        Err(e) => {
            tracing::debug!(error = %e, "store not ready, skipping seed import");
            return ImportReport::Skipped {
                reason: SeedError::StoreNotReady(e.to_string()).to_string(),
            };
        }
    };

    let mut settings = SettingsEngine::new(db.clone(), base_dir.map(Path::to_path_buf));
    if let Err(e) = settings.load() {
        tracing::debug!(error = %e, "settings unreadable, skipping seed import");
        return ImportReport::Skipped {
            reason: SeedError::StoreNotReady(e.to_string()).to_string(),
        };
    }

    let path = settings.seed_path();
    tracing::debug!(path = %path.display(), "importing seed file");
    SeedImporter::new(db.connection()).import_file(&path)
}

fn parse_seed(yaml: &str) -> Result<SeedFile, SeedError> {
    if yaml.trim().is_empty() {
        return Ok(SeedFile::default());
    }
    let parsed: Option<SeedFile> =
        serde_yaml::from_str(yaml).map_err(|e| SeedError::Parse(e.to_string()))?;
    Ok(parsed.unwrap_or_default())
}

fn validate_seed(seed: &SeedFile) -> Result<(), SeedError> {
    for (idx, entry) in seed.bookmarks.iter().enumerate() {
        let at = |msg: String| SeedError::Validation(format!("bookmarks[{}] ({}): {}", idx, entry.name, msg));

        url::Url::parse(&entry.url).map_err(|e| at(format!("invalid url {:?}: {}", entry.url, e)))?;

        for (field, value) in [("x", entry.x), ("y", entry.y)] {
            if let Some(v) = value {
                if v < 0 || v > i64::from(i32::MAX) {
                    return Err(at(format!("{} must be a non-negative integer, got {}", field, v)));
                }
            }
        }
        for (field, value) in [("w", entry.w), ("h", entry.h)] {
            if let Some(v) = value {
                if v <= 0 || v > i64::from(i32::MAX) {
                    return Err(at(format!("{} must be a positive integer, got {}", field, v)));
                }
            }
        }
        if let Some(w) = entry.widgets.iter().find(|w| w.widget_type.trim().is_empty()) {
            return Err(at(format!("widget type cannot be empty (config {:?})", w.config)));
        }
    }
    Ok(())
}

fn new_bookmark_from(entry: &SeedBookmark) -> NewBookmark {
    NewBookmark {
        name: entry.name.clone(),
        url: entry.url.clone(),
        icon: entry.icon.clone(),
        subtext: entry.subtext.clone(),
        container: entry.container.clone(),
        icon_only: entry.icon_only.unwrap_or(false),
    }
}

/// Declared layout, with defaults for anything left out. Values were range-checked.
fn declared_rect(entry: &SeedBookmark) -> GridRect {
    let pick = |v: Option<i64>, default: i32| v.and_then(|v| i32::try_from(v).ok()).unwrap_or(default);
    GridRect::new(
        pick(entry.x, 0),
        pick(entry.y, 0),
        pick(entry.w, BOOKMARK_DEFAULT_W),
        pick(entry.h, BOOKMARK_DEFAULT_H),
    )
}

/// Descriptive fields the seed declares and that differ from the stored record.
///
/// Layout and group membership are never part of the patch.
fn descriptive_patch(entry: &SeedBookmark, existing: &Bookmark) -> BookmarkPatch {
    let mut patch = BookmarkPatch::default();
    if entry.icon.is_some() && entry.icon != existing.icon {
        patch.icon = Some(entry.icon.clone());
    }
    if let Some(icon_only) = entry.icon_only {
        if icon_only != existing.icon_only {
            patch.icon_only = Some(icon_only);
        }
    }
    if entry.container.is_some() && entry.container != existing.container {
        patch.container = Some(entry.container.clone());
    }
    if entry.subtext.is_some() && entry.subtext != existing.subtext {
        patch.subtext = Some(entry.subtext.clone());
    }
    patch
}

fn add_missing_widgets(
    widgets: &mut WidgetManager<'_>,
    bookmark_id: &str,
    declared: &[SeedWidget],
) -> Result<usize, SeedError> {
    let mut added = 0;
    for w in declared {
        let exists = widgets
            .has_widget_type(bookmark_id, &w.widget_type)
            .map_err(|e| SeedError::DatabaseError(e.to_string()))?;
        if exists {
            continue;
        }
        let input = NewWidget {
            widget_type: w.widget_type.clone(),
            config: w.config.clone(),
        };
        widgets
            .add_widget(bookmark_id, &input)
            .map_err(|e| SeedError::DatabaseError(e.to_string()))?;
        added += 1;
    }
    Ok(added)
}
