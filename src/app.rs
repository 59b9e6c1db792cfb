//! App Core for the dashboard.
//!
//! Central struct holding the store, the widget registry, the container health
//! service and the client layout state, and running the startup/shutdown sequence.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::database::connection::{Database, DatabaseHandle};
use crate::managers::layout_state::LayoutState;
use crate::services::container_health::{ContainerHealthService, HealthPoller};
use crate::services::mutation_api::MutationApi;
use crate::services::seed_importer::import_at_startup;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::services::widget_registry::WidgetRegistry;
use crate::types::errors::{MutationError, SettingsError, StoreError};
use crate::types::seed::ImportReport;
use crate::types::settings::AppConfig;

/// Central application struct.
///
/// `MutationApi` and the entity managers borrow a connection, so they are
/// created on demand from [`App::db`] rather than stored here.
pub struct App {
    pub config: AppConfig,
    pub store: DatabaseHandle,
    pub widgets: WidgetRegistry,
    pub health: ContainerHealthService,
    pub layout: LayoutState,
    base_dir: Option<PathBuf>,
}

impl App {
    /// Opens the store and builds the services described by `config`.
    pub fn new(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let store = DatabaseHandle::open(&config.db_path)?;
        let health = ContainerHealthService::from_endpoint(&config.runtime_endpoint)?;

        Ok(Self {
            config,
            store,
            widgets: WidgetRegistry::with_builtins(),
            health,
            layout: LayoutState::new(),
            base_dir: None,
        })
    }

    /// App over an in-memory store with default settings elsewhere.
    pub fn open_in_memory() -> Result<Self, Box<dyn std::error::Error>> {
        Self::new(AppConfig::in_memory())
    }

    /// Anchors the default seed path and relative seed overrides at `dir`
    /// instead of the working directory.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// The live database, or `StoreError::Closed` after shutdown.
    pub fn db(&self) -> Result<Arc<Database>, StoreError> {
        self.store.get()
    }

    /// A settings engine with the stored row already loaded.
    pub fn settings_engine(&self) -> Result<SettingsEngine, SettingsError> {
        let db = self
            .db()
            .map_err(|e| SettingsError::DatabaseError(e.to_string()))?;
        let mut engine = SettingsEngine::new(db, self.base_dir.clone());
        engine.load()?;
        Ok(engine)
    }

    /// Runs one seed import pass against the configured seed file.
    pub fn import_seed(&self) -> ImportReport {
        import_at_startup(&self.store, self.base_dir.as_deref())
    }

    /// Re-reads the store into the layout state, keeping edit mode.
    pub fn reload_layout(&mut self) -> Result<(), MutationError> {
        let db = self
            .db()
            .map_err(|e| MutationError::DatabaseError(e.to_string()))?;
        let snapshot = MutationApi::new(db.connection()).load_dashboard()?;
        self.layout.replace(snapshot);
        Ok(())
    }

    /// Starts polling `container` at the configured interval. Must be called
    /// from within a tokio runtime.
    pub fn health_poller(&self, container: Option<String>) -> HealthPoller {
        let every = Duration::from_secs(self.config.health_interval_secs);
        HealthPoller::spawn(self.health.clone(), container, every)
    }

    /// Startup sequence: seed the store (best effort), then hydrate the layout.
    pub fn startup(&mut self) -> ImportReport {
        let report = self.import_seed();
        if let Err(e) = self.reload_layout() {
            tracing::warn!(error = %e, "failed to load dashboard on startup");
        }
        report
    }

    /// Shutdown sequence: close the store.
    pub fn shutdown(&mut self) {
        if let Err(e) = self.store.close() {
            tracing::warn!(error = %e, "failed to close store");
        }
    }
}
