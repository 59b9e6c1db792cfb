//! Container Health for the dashboard.
//!
//! Asks the container runtime for the state of the container backing a
//! bookmark. Every failure collapses into [`ContainerHealth::Unknown`]: health
//! is decoration on a tile, never an error the dashboard has to handle.

use http_body_util::{BodyExt, Empty, Limited};
use hyper::body::Bytes;
use hyper::client::conn::http1;
use hyper::{header, Request, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::Value;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UnixStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{timeout, MissedTickBehavior};
use url::Url;

use crate::types::errors::{ConfigError, HealthError};
use crate::types::health::ContainerHealth;
use crate::types::settings::RuntimeEndpoint;

const RUNTIME_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_INSPECT_BODY: usize = 1 << 20;
const SOCKET_BASE: &str = "http://docker/";
const SOCKET_HOST: &str = "docker";

/// Boxed future returned by [`ContainerRuntime::inspect_status`].
pub type StatusFuture<'a> = Pin<Box<dyn Future<Output = Result<String, HealthError>> + Send + 'a>>;

/// A container runtime that can report a container's raw state string.
pub trait ContainerRuntime: Send + Sync {
    /// Returns `State.Status` for the named container, e.g. `"running"`.
    fn inspect_status<'a>(&'a self, name: &'a str) -> StatusFuture<'a>;
}

/// Pulls `State.Status` out of a Docker inspect document.
fn status_from_inspect(body: &Value) -> Result<String, HealthError> {
    body.get("State")
        .and_then(|state| state.get("Status"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| HealthError::Protocol("inspect response has no State.Status".to_string()))
}

/// `/containers/{name}/json` under `base`, with `name` escaped as one path segment.
fn inspect_url(base: &Url, name: &str) -> Result<Url, HealthError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| HealthError::Protocol(format!("{} cannot be a base URL", base)))?
        .pop_if_empty()
        .extend(["containers", name, "json"]);
    Ok(url)
}

// ─── Docker over a Unix socket ───

/// Docker Engine API reached through its Unix domain socket.
#[derive(Debug, Clone)]
pub struct DockerSocketRuntime {
    socket_path: PathBuf,
}

impl DockerSocketRuntime {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    async fn inspect(&self, name: &str) -> Result<String, HealthError> {
        let base = Url::parse(SOCKET_BASE).map_err(|e| HealthError::Protocol(e.to_string()))?;
        let url = inspect_url(&base, name)?;
        let request = Request::get(url.path())
            .header(header::HOST, SOCKET_HOST)
            .header(header::ACCEPT, "application/json")
            .body(Empty::<Bytes>::new())
            .map_err(|e| HealthError::Protocol(e.to_string()))?;

        let stream = timeout(RUNTIME_TIMEOUT, UnixStream::connect(&self.socket_path))
            .await
            .map_err(|_| HealthError::Unreachable("connect timeout".to_string()))?
            .map_err(|e| HealthError::Unreachable(format!("{}: {}", self.socket_path.display(), e)))?;
        let (mut sender, conn) = http1::handshake(TokioIo::new(stream))
            .await
            .map_err(|e| HealthError::Unreachable(e.to_string()))?;
        let driver = tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::debug!(error = %e, "runtime connection closed");
            }
        });

        let exchange = async {
            let response = sender
                .send_request(request)
                .await
                .map_err(|e| HealthError::Unreachable(e.to_string()))?;
            let status = response.status();
            let body = Limited::new(response.into_body(), MAX_INSPECT_BODY)
                .collect()
                .await
                .map_err(|e| HealthError::Protocol(format!("inspect body: {}", e)))?
                .to_bytes();
            Ok::<_, HealthError>((status, body))
        };
        let outcome = timeout(RUNTIME_TIMEOUT, exchange).await;
        driver.abort();
        let (status, body) = outcome.map_err(|_| HealthError::Unreachable("response timeout".to_string()))??;

        match status {
            s if s.is_success() => {
                let doc: Value = serde_json::from_slice(&body)
                    .map_err(|e| HealthError::Protocol(format!("invalid inspect body: {}", e)))?;
                status_from_inspect(&doc)
            }
            StatusCode::NOT_FOUND => Err(HealthError::ContainerNotFound(name.to_string())),
            other => Err(HealthError::Protocol(format!("unexpected HTTP status {}", other))),
        }
    }
}

impl ContainerRuntime for DockerSocketRuntime {
    fn inspect_status<'a>(&'a self, name: &'a str) -> StatusFuture<'a> {
        Box::pin(self.inspect(name))
    }
}

// ─── Docker over TCP ───

/// Docker Engine API reached over plain HTTP, e.g. a socket proxy on `http://127.0.0.1:2375`.
#[derive(Debug, Clone)]
pub struct DockerHttpRuntime {
    base: Url,
    client: reqwest::Client,
}

impl DockerHttpRuntime {
    pub fn new(base: &str) -> Result<Self, ConfigError> {
        let base = Url::parse(base)
            .map_err(|e| ConfigError::UnsupportedEndpoint(format!("{}: {}", base, e)))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(ConfigError::UnsupportedEndpoint(base.to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(RUNTIME_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::UnsupportedEndpoint(e.to_string()))?;
        Ok(Self { base, client })
    }

    async fn inspect(&self, name: &str) -> Result<String, HealthError> {
        let url = inspect_url(&self.base, name)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HealthError::Unreachable(e.to_string()))?;

        match response.status() {
            s if s.is_success() => {
                let doc: Value = response
                    .json()
                    .await
                    .map_err(|e| HealthError::Protocol(format!("invalid inspect body: {}", e)))?;
                status_from_inspect(&doc)
            }
            reqwest::StatusCode::NOT_FOUND => Err(HealthError::ContainerNotFound(name.to_string())),
            other => Err(HealthError::Protocol(format!("unexpected HTTP status {}", other))),
        }
    }
}

impl ContainerRuntime for DockerHttpRuntime {
    fn inspect_status<'a>(&'a self, name: &'a str) -> StatusFuture<'a> {
        Box::pin(self.inspect(name))
    }
}

// ─── Service ───

/// Resolves container names to [`ContainerHealth`].
#[derive(Clone)]
pub struct ContainerHealthService {
    runtime: Arc<dyn ContainerRuntime>,
}

impl ContainerHealthService {
    pub fn new(runtime: Arc<dyn ContainerRuntime>) -> Self {
        Self { runtime }
    }

    /// Builds the service for a configured endpoint.
    pub fn from_endpoint(endpoint: &RuntimeEndpoint) -> Result<Self, ConfigError> {
        let runtime: Arc<dyn ContainerRuntime> = match endpoint {
            RuntimeEndpoint::UnixSocket(path) => Arc::new(DockerSocketRuntime::new(path.clone())),
            RuntimeEndpoint::Http(base) => Arc::new(DockerHttpRuntime::new(base)?),
        };
        Ok(Self::new(runtime))
    }

    /// Health of `container`. A missing or blank name is `Unknown` without
    /// contacting the runtime; so is any runtime failure.
    pub async fn get_container_health(&self, container: Option<&str>) -> ContainerHealth {
        let Some(name) = container.map(str::trim).filter(|n| !n.is_empty()) else {
            return ContainerHealth::Unknown;
        };
        match self.runtime.inspect_status(name).await {
            Ok(status) => ContainerHealth::from_status(&status),
            Err(err) => {
                tracing::debug!(container = name, error = %err, "container health unavailable");
                ContainerHealth::Unknown
            }
        }
    }
}

impl std::fmt::Debug for ContainerHealthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerHealthService").finish_non_exhaustive()
    }
}

// ─── Polling ───

/// Re-queries one container's health on a fixed interval.
///
/// The first query runs immediately. Without a container name nothing is
/// polled and the value stays `Unknown`. The task is aborted on [`stop`] or drop.
///
/// [`stop`]: HealthPoller::stop
pub struct HealthPoller {
    rx: watch::Receiver<ContainerHealth>,
    task: Option<JoinHandle<()>>,
}

impl HealthPoller {
    /// Spawns the polling task on the current tokio runtime.
    pub fn spawn(service: ContainerHealthService, container: Option<String>, every: Duration) -> Self {
        let (tx, rx) = watch::channel(ContainerHealth::Unknown);
        let container = container.filter(|c| !c.trim().is_empty());

        let task = container.map(|name| {
            tracing::info!(container = %name, interval_secs = every.as_secs(), "health poller started");
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(every.max(Duration::from_millis(1)));
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    let health = service.get_container_health(Some(&name)).await;
                    if tx.send(health).is_err() {
                        break;
                    }
                }
            })
        });

        Self { rx, task }
    }

    /// Latest observed health.
    pub fn current(&self) -> ContainerHealth {
        *self.rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ContainerHealth> {
        self.rx.clone()
    }

    pub fn is_polling(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn stop(mut self) {
        self.abort();
    }

    fn abort(&mut self) {
        if let Some(task) = self.task.take() {
            tracing::info!("health poller stopped");
            task.abort();
        }
    }
}

impl Drop for HealthPoller {
    fn drop(&mut self) {
        self.abort();
    }
}
