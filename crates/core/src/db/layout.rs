use std::path::{Path, PathBuf};

/// Logical layout of a workspace on disk.
///
/// This is derived from a chosen root path. It does *not* perform any IO itself.
/// The CLI or other frontends are responsible for actually creating directories
/// and files based on this layout.
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    /// Root directory of the workspace.
    pub root: PathBuf,
    /// Directory for internal metadata (.pathmarker).
    pub meta_dir: PathBuf,
    /// Path to the workspace config file (JSON).
    pub config_path: PathBuf,
    /// Path to the workspace database file.
    pub db_path: PathBuf,
    /// Directory where downloaded result packages are written.
    pub downloads_dir: PathBuf,
}

impl WorkspaceLayout {
    /// Compute the default layout for a workspace rooted at `root`.
    ///
    /// This does *not* touch the filesystem.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let meta_dir = root.join(".pathmarker");
        let config_path = meta_dir.join("config.json");
        let db_path = meta_dir.join("pathmarker.db");
        let downloads_dir = root.join("downloads");

        Self { root, meta_dir, config_path, db_path, downloads_dir }
    }

    /// Compute a database path string suitable for storing in `WorkspaceConfig`,
    /// typically as a path relative to `root`.
    pub fn db_path_relative_string(&self) -> String {
        match self.db_path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_string_lossy().to_string(),
            Err(_) => self.db_path.to_string_lossy().to_string(),
        }
    }

    /// Per-session download directory.
    pub fn session_downloads_dir(&self, session_id: &str) -> PathBuf {
        self.downloads_dir.join(session_id)
    }
}
