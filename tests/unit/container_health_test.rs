//! Unit tests for Container Health.
//!
//! A scripted runtime covers the status mapping and degradation rules; a
//! throwaway Unix socket server stands in for the Docker daemon.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use onedashboard::services::container_health::{
    ContainerHealthService, ContainerRuntime, DockerSocketRuntime, HealthPoller, StatusFuture,
};
use onedashboard::types::errors::HealthError;
use onedashboard::types::health::ContainerHealth;
use rstest::rstest;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixListener;

/// Answers from a fixed table and records every name it was asked about.
#[derive(Default)]
struct ScriptedRuntime {
    statuses: HashMap<String, Result<String, HealthError>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRuntime {
    fn with(name: &str, answer: Result<&str, HealthError>) -> Self {
        let mut statuses = HashMap::new();
        statuses.insert(name.to_string(), answer.map(str::to_string));
        Self { statuses, calls: Mutex::new(Vec::new()) }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ContainerRuntime for ScriptedRuntime {
    fn inspect_status<'a>(&'a self, name: &'a str) -> StatusFuture<'a> {
        self.calls.lock().unwrap().push(name.to_string());
        let answer = self
            .statuses
            .get(name)
            .cloned()
            .unwrap_or_else(|| Err(HealthError::ContainerNotFound(name.to_string())));
        Box::pin(async move { answer })
    }
}

fn service(runtime: &Arc<ScriptedRuntime>) -> ContainerHealthService {
    ContainerHealthService::new(runtime.clone())
}

#[rstest]
#[case("running", ContainerHealth::Running)]
#[case("exited", ContainerHealth::Exited)]
#[case("stopped", ContainerHealth::Stopped)]
#[case("paused", ContainerHealth::Unknown)]
#[case("restarting", ContainerHealth::Unknown)]
#[case("", ContainerHealth::Unknown)]
fn test_status_mapping(#[case] status: &str, #[case] expected: ContainerHealth) {
    assert_eq!(ContainerHealth::from_status(status), expected);
}

#[test]
fn test_health_serializes_lowercase() {
    assert_eq!(serde_json::to_value(ContainerHealth::Running).unwrap(), "running");
    assert_eq!(ContainerHealth::Unknown.to_string(), "unknown");
}

#[tokio::test]
async fn test_running_container() {
    let runtime = Arc::new(ScriptedRuntime::with("plex", Ok("running")));
    let health = service(&runtime).get_container_health(Some("plex")).await;
    assert_eq!(health, ContainerHealth::Running);
    assert_eq!(runtime.calls(), vec!["plex".to_string()]);
}

/// No name, or a blank one, never reaches the runtime.
#[tokio::test]
async fn test_missing_name_skips_runtime() {
    let runtime = Arc::new(ScriptedRuntime::default());
    let svc = service(&runtime);
    assert_eq!(svc.get_container_health(None).await, ContainerHealth::Unknown);
    assert_eq!(svc.get_container_health(Some("   ")).await, ContainerHealth::Unknown);
    assert!(runtime.calls().is_empty());
}

#[tokio::test]
async fn test_runtime_errors_degrade_to_unknown() {
    let runtime = Arc::new(ScriptedRuntime::with(
        "sonarr",
        Err(HealthError::Unreachable("connection refused".to_string())),
    ));
    let svc = service(&runtime);
    assert_eq!(svc.get_container_health(Some("sonarr")).await, ContainerHealth::Unknown);
    assert_eq!(svc.get_container_health(Some("ghost")).await, ContainerHealth::Unknown);
    assert_eq!(runtime.calls().len(), 2);
}

#[tokio::test]
async fn test_unreachable_socket_is_unknown() {
    let tmp = TempDir::new().unwrap();
    let runtime = Arc::new(DockerSocketRuntime::new(tmp.path().join("docker.sock")));
    let svc = ContainerHealthService::new(runtime);
    assert_eq!(svc.get_container_health(Some("plex")).await, ContainerHealth::Unknown);
}

/// Serves one canned HTTP response per connection and returns the request line it saw.
async fn serve_once(listener: UnixListener, response: &'static str) -> String {
    let (mut stream, _) = listener.accept().await.unwrap();
    let mut buf = vec![0u8; 1024];
    let n = stream.read(&mut buf).await.unwrap();
    stream.write_all(response.as_bytes()).await.unwrap();
    stream.shutdown().await.unwrap();
    String::from_utf8_lossy(&buf[..n]).lines().next().unwrap_or_default().to_string()
}

#[tokio::test]
async fn test_socket_runtime_reads_inspect_status() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("docker.sock");
    let listener = UnixListener::bind(&path).unwrap();
    let server = tokio::spawn(serve_once(
        listener,
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 29\r\n\r\n{\"State\":{\"Status\":\"exited\"}}",
    ));

    let runtime = DockerSocketRuntime::new(&path);
    assert_eq!(runtime.inspect_status("media server").await.unwrap(), "exited");
    assert_eq!(server.await.unwrap(), "GET /containers/media%20server/json HTTP/1.1");
}

#[tokio::test]
async fn test_socket_runtime_reads_chunked_body() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("docker.sock");
    let listener = UnixListener::bind(&path).unwrap();
    let server = tokio::spawn(serve_once(
        listener,
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nTransfer-Encoding: chunked\r\n\r\n\
         b\r\n{\"State\":{\"\r\n\
         13\r\nStatus\":\"running\"}}\r\n\
         0\r\n\r\n",
    ));

    let runtime = DockerSocketRuntime::new(&path);
    assert_eq!(runtime.inspect_status("plex").await.unwrap(), "running");
    assert_eq!(server.await.unwrap(), "GET /containers/plex/json HTTP/1.1");
}

#[tokio::test]
async fn test_socket_runtime_not_found() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("docker.sock");
    let listener = UnixListener::bind(&path).unwrap();
    let server = tokio::spawn(serve_once(
        listener,
        "HTTP/1.1 404 Not Found\r\nContent-Type: application/json\r\nContent-Length: 31\r\n\r\n{\"message\":\"No such container\"}",
    ));

    let runtime = DockerSocketRuntime::new(&path);
    let err = runtime.inspect_status("ghost").await.unwrap_err();
    assert_eq!(err, HealthError::ContainerNotFound("ghost".to_string()));
    server.await.unwrap();
}

// ─── Polling ───

#[tokio::test]
async fn test_poller_publishes_health() {
    let runtime = Arc::new(ScriptedRuntime::with("plex", Ok("running")));
    let poller = HealthPoller::spawn(service(&runtime), Some("plex".to_string()), Duration::from_millis(20));
    assert!(poller.is_polling());

    let mut rx = poller.subscribe();
    tokio::time::timeout(Duration::from_secs(2), rx.changed()).await.unwrap().unwrap();
    assert_eq!(poller.current(), ContainerHealth::Running);

    tokio::time::sleep(Duration::from_millis(70)).await;
    assert!(runtime.calls().len() >= 2, "poller should re-query on its interval");
    poller.stop();
}

#[tokio::test]
async fn test_poller_without_container_does_not_poll() {
    let runtime = Arc::new(ScriptedRuntime::default());
    let poller = HealthPoller::spawn(service(&runtime), None, Duration::from_millis(10));
    assert!(!poller.is_polling());

    let blank = HealthPoller::spawn(service(&runtime), Some(" ".to_string()), Duration::from_millis(10));
    assert!(!blank.is_polling());

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(poller.current(), ContainerHealth::Unknown);
    assert!(runtime.calls().is_empty());
}

/// Once stopped, the runtime is not queried again.
#[tokio::test]
async fn test_poller_stops_on_drop() {
    let runtime = Arc::new(ScriptedRuntime::with("plex", Ok("running")));
    let poller = HealthPoller::spawn(service(&runtime), Some("plex".to_string()), Duration::from_millis(10));
    let mut rx = poller.subscribe();
    tokio::time::timeout(Duration::from_secs(2), rx.changed()).await.unwrap().unwrap();
    drop(poller);

    tokio::time::sleep(Duration::from_millis(20)).await;
    let after_stop = runtime.calls().len();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(runtime.calls().len(), after_stop);
}
