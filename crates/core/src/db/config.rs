use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::http::DEFAULT_BASE_URL;

/// Database location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbConfig {
    /// Path to the workspace database file (typically relative to workspace root).
    pub path: String,
}

impl DbConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Where and how to reach the analysis backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL; endpoint paths (`/api/...`) and result URLs are joined onto it.
    pub base_url: String,
    /// Optional request timeout. Absent means requests may wait indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), timeout_secs: None }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Serializable configuration describing a PathMarker workspace.
///
/// This lives at `.pathmarker/config.json` in the workspace root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Human-friendly workspace name.
    pub name: String,
    /// Optional description / notes.
    pub description: Option<String>,
    /// Schema/config version. This is about the config format only.
    pub config_version: String,
    /// Database configuration (path is typically relative to workspace root).
    pub db: DbConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

impl WorkspaceConfig {
    /// Create a new workspace configuration using the given name and db path.
    pub fn new(name: impl Into<String>, db_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            config_version: "0.1.0".to_string(),
            db: DbConfig::new(db_path),
            backend: BackendConfig::default(),
        }
    }

    /// Builder-style helper to point the workspace at a specific backend.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.backend.base_url = base_url.into();
        self
    }
}
