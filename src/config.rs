//! Process configuration and logging setup.
//!
//! Environment variables:
//! - `ONE_DASHBOARD_DB`: database file (default `data/dev.db`, `:memory:` accepted)
//! - `ONE_DASHBOARD_DOCKER_HOST`: `unix:///path/to/docker.sock` or `http://host:port`
//! - `ONE_DASHBOARD_HEALTH_INTERVAL_SECS`: container health poll interval
//! - `ONE_DASHBOARD_LOG`: tracing filter directives (default `info`)

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::types::errors::ConfigError;
use crate::types::settings::{AppConfig, RuntimeEndpoint};

pub const ENV_DB: &str = "ONE_DASHBOARD_DB";
pub const ENV_DOCKER_HOST: &str = "ONE_DASHBOARD_DOCKER_HOST";
pub const ENV_HEALTH_INTERVAL: &str = "ONE_DASHBOARD_HEALTH_INTERVAL_SECS";
pub const ENV_LOG: &str = "ONE_DASHBOARD_LOG";

impl AppConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = AppConfig::default();

        if let Some(db) = get(ENV_DB) {
            config.db_path = db;
        }
        if let Some(host) = get(ENV_DOCKER_HOST) {
            config.runtime_endpoint = parse_runtime_endpoint(&host)?;
        }
        if let Some(raw) = get(ENV_HEALTH_INTERVAL) {
            config.health_interval_secs = match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_HEALTH_INTERVAL.to_string(),
                        value: raw,
                    })
                }
            };
        }
        if let Some(filter) = get(ENV_LOG) {
            config.log_filter = filter;
        }
        Ok(config)
    }
}

/// Parses a Docker host string.
///
/// `unix://` addresses must be absolute paths; `http(s)://` addresses are kept as given.
pub fn parse_runtime_endpoint(raw: &str) -> Result<RuntimeEndpoint, ConfigError> {
    if let Some(path) = raw.strip_prefix("unix://") {
        if !path.starts_with('/') {
            return Err(ConfigError::UnsupportedEndpoint(raw.to_string()));
        }
        return Ok(RuntimeEndpoint::UnixSocket(PathBuf::from(path)));
    }
    match url::Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {
            Ok(RuntimeEndpoint::Http(raw.to_string()))
        }
        // Docker's own tcp:// scheme, served over plain HTTP.
        Ok(url) if url.scheme() == "tcp" && url.has_host() => {
            Ok(RuntimeEndpoint::Http(format!("http://{}", &raw["tcp://".len()..])))
        }
        _ => Err(ConfigError::UnsupportedEndpoint(raw.to_string())),
    }
}

/// Installs the global tracing subscriber, writing to stderr.
///
/// Stdout carries the RPC protocol, so nothing may log there. Invalid
/// directives in `filter` fall back to `info`. Calling twice is harmless.
pub fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
