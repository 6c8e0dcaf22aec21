use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::db::{WorkspaceConfig, WorkspaceDb, WorkspaceLayout};

/// Load the workspace config JSON from disk for a given layout.
pub fn load_workspace_config(layout: &WorkspaceLayout) -> Result<WorkspaceConfig> {
    let config_json = std::fs::read_to_string(&layout.config_path).with_context(|| {
        format!("Failed to read workspace config at {}", layout.config_path.display())
    })?;
    let config: WorkspaceConfig =
        serde_json::from_str(&config_json).context("Failed to parse workspace config JSON")?;
    Ok(config)
}

/// Resolve the DB path (respecting relative/absolute config) and open a WorkspaceDb.
pub fn open_workspace_db(layout: &WorkspaceLayout) -> Result<(WorkspaceConfig, PathBuf, WorkspaceDb)> {
    let config = load_workspace_config(layout)?;
    let config_db_path = std::path::Path::new(&config.db.path);
    let db_path = if config_db_path.is_absolute() {
        config_db_path.to_path_buf()
    } else {
        layout.root.join(config_db_path)
    };
    let db = WorkspaceDb::open(&db_path)
        .with_context(|| format!("Failed to open workspace database at {}", db_path.display()))?;
    Ok((config, db_path, db))
}
