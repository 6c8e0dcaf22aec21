use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::db::{open_workspace_db, WorkspaceConfig, WorkspaceDb, WorkspaceLayout};

/// Convenience wrapper bundling layout, config, db path, and an open WorkspaceDb.
#[derive(Debug)]
pub struct WorkspaceContext {
    pub layout: WorkspaceLayout,
    pub config: WorkspaceConfig,
    pub db_path: PathBuf,
    pub db: WorkspaceDb,
}

impl WorkspaceContext {
    /// Load workspace config and open the database for a given root.
    pub fn from_root(root: impl AsRef<Path>) -> Result<Self> {
        let layout = WorkspaceLayout::new(root);
        let (config, db_path, db) = open_workspace_db(&layout)?;
        Ok(Self { layout, config, db_path, db })
    }
}
