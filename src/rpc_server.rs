//! Dashboard RPC Server: JSON-RPC over stdin/stdout for the web front end.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.create", "params":{"name":"...","url":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Logs go to stderr; stdout carries only protocol lines.

use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use std::time::Instant;

use onedashboard::app::App;
use onedashboard::config::init_logging;
use onedashboard::rpc_handler::{handle_container_health, handle_method};
use onedashboard::types::settings::AppConfig;

use serde_json::{json, Value};

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        let elapsed = self.window_start.elapsed();
        if elapsed.as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn send(line: &Value) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", line)?;
    out.flush()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    init_logging(&config.log_filter);

    let runtime = tokio::runtime::Runtime::new()?;
    let mut app = App::new(config)?;
    let report = app.startup();
    tracing::info!(?report, db = %app.config.db_path, "dashboard ready");
    let app = Mutex::new(app);

    send(&json!({"event":"ready","version":env!("CARGO_PKG_VERSION")}))?;

    // Max 200 RPC requests per second.
    let mut rate_limiter = RateLimiter::new(200);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() { continue; }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                send(&json!({"id":null,"error":format!("parse error: {}",e)}))?;
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            send(&json!({"id": id, "error": "rate limit exceeded"}))?;
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let result = match method {
            "container.health" => runtime.block_on(handle_container_health(&app, &params)),
            _ => handle_method(&app, method, &params),
        };
        if let Err(err) = &result {
            tracing::debug!(method, error = %err, "rpc call failed");
        }

        let response = match result {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => json!({"id": id, "error": err}),
        };
        send(&response)?;
    }

    if let Ok(mut app) = app.into_inner() {
        app.shutdown();
    }
    Ok(())
}
