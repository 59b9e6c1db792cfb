use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Seed file location used when no override is stored, relative to the working directory.
pub const DEFAULT_SEED_RELATIVE_PATH: &str = "config/one-dashboard.yaml";

/// Default database location, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "data/dev.db";

/// Default Docker Engine socket.
pub const DEFAULT_DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Default container health poll interval.
pub const DEFAULT_HEALTH_INTERVAL_SECS: u64 = 15;

/// The single persisted settings row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    /// Override for the seed file path; `None` means the default location.
    pub yaml_path: Option<String>,
}

/// Where the container runtime's inspection API is reachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "address", rename_all = "snake_case")]
pub enum RuntimeEndpoint {
    /// Docker Engine API over a Unix domain socket.
    UnixSocket(PathBuf),
    /// Docker Engine API over TCP, e.g. `http://127.0.0.1:2375`.
    Http(String),
}

impl Default for RuntimeEndpoint {
    fn default() -> Self {
        RuntimeEndpoint::UnixSocket(PathBuf::from(DEFAULT_DOCKER_SOCKET))
    }
}

/// Process-level configuration, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub db_path: String,
    pub runtime_endpoint: RuntimeEndpoint,
    pub health_interval_secs: u64,
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            runtime_endpoint: RuntimeEndpoint::default(),
            health_interval_secs: DEFAULT_HEALTH_INTERVAL_SECS,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Configuration for tests: in-memory database, defaults elsewhere.
    pub fn in_memory() -> Self {
        Self {
            db_path: ":memory:".to_string(),
            ..Self::default()
        }
    }
}
