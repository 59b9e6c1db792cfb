// Dashboard shared type definitions
// Each submodule defines types used across the application.

pub mod bookmark;
pub mod dashboard;
pub mod errors;
pub mod group;
pub mod health;
pub mod layout;
pub mod seed;
pub mod settings;
pub mod widget;
