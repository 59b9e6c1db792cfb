// Dashboard Settings Engine
// Manages the single persisted settings row: where the seed file lives.
// An absent override falls back to config/one-dashboard.yaml under the base directory.

use rusqlite::{params, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::database::connection::Database;
use crate::types::errors::SettingsError;
use crate::types::settings::{Setting, DEFAULT_SEED_RELATIVE_PATH};

/// Trait defining the settings engine interface.
pub trait SettingsEngineTrait {
    fn load(&mut self) -> Result<Setting, SettingsError>;
    fn get_settings(&self) -> &Setting;
    fn seed_path(&self) -> PathBuf;
    fn set_seed_path(&mut self, path: &str) -> Result<(), SettingsError>;
    fn clear_seed_path(&mut self) -> Result<(), SettingsError>;
}

/// Settings engine implementation that persists the settings row in SQLite.
pub struct SettingsEngine {
    db: Arc<Database>,
    base_dir: PathBuf,
    settings: Setting,
}

impl SettingsEngine {
    /// Creates a new SettingsEngine.
    ///
    /// `base_dir` anchors the default seed path and relative overrides; `None`
    /// uses the current working directory.
    pub fn new(db: Arc<Database>, base_dir: Option<PathBuf>) -> Self {
        let base_dir = base_dir
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            db,
            base_dir,
            settings: Setting::default(),
        }
    }

    /// The seed path used when no override is stored.
    pub fn default_seed_path(&self) -> PathBuf {
        self.base_dir.join(DEFAULT_SEED_RELATIVE_PATH)
    }

    fn write_yaml_path(&mut self, value: Option<&str>) -> Result<(), SettingsError> {
        self.db
            .connection()
            .execute(
                "INSERT INTO settings (id, yaml_path) VALUES (1, ?1) \
                 ON CONFLICT(id) DO UPDATE SET yaml_path = excluded.yaml_path",
                params![value],
            )
            .map_err(|e| SettingsError::DatabaseError(e.to_string()))?;
        self.settings.yaml_path = value.map(str::to_string);
        Ok(())
    }
}

impl SettingsEngineTrait for SettingsEngine {
    /// Loads the settings row. A missing row yields the defaults.
    fn load(&mut self) -> Result<Setting, SettingsError> {
        let yaml_path: Option<String> = self
            .db
            .connection()
            .query_row("SELECT yaml_path FROM settings WHERE id = 1", [], |row| row.get(0))
            .optional()
            .map_err(|e| SettingsError::DatabaseError(e.to_string()))?
            .flatten();

        self.settings = Setting { yaml_path };
        Ok(self.settings.clone())
    }

    fn get_settings(&self) -> &Setting {
        &self.settings
    }

    /// Resolved seed file path: the stored override, or the default location.
    fn seed_path(&self) -> PathBuf {
        match &self.settings.yaml_path {
            Some(p) => self.base_dir.join(Path::new(p)),
            None => self.default_seed_path(),
        }
    }

    fn set_seed_path(&mut self, path: &str) -> Result<(), SettingsError> {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            return Err(SettingsError::InvalidValue(
                "seed path cannot be empty".to_string(),
            ));
        }
        self.write_yaml_path(Some(trimmed))
    }

    fn clear_seed_path(&mut self) -> Result<(), SettingsError> {
        self.write_yaml_path(None)
    }
}
