use serde::{Deserialize, Serialize};
use std::fmt;

/// Live state of a bookmark's backing container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerHealth {
    Running,
    Exited,
    Stopped,
    #[default]
    Unknown,
}

impl ContainerHealth {
    /// Maps a runtime status string; anything unrecognised is `Unknown`.
    pub fn from_status(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "running" => ContainerHealth::Running,
            "exited" => ContainerHealth::Exited,
            "stopped" => ContainerHealth::Stopped,
            _ => ContainerHealth::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerHealth::Running => "running",
            ContainerHealth::Exited => "exited",
            ContainerHealth::Stopped => "stopped",
            ContainerHealth::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ContainerHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
