//! OneDashboard, a self-hosted personal dashboard: bookmark tiles, groups and live container health.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod config;
pub mod database;
pub mod managers;
pub mod services;
pub mod rpc_handler;
pub mod types;
