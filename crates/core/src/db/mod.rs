//! Workspace database integration and workspace layout definitions.
//!
//! This module wraps a SQLite database storing:
//! - Sessions (uploaded archives and their file trees)
//! - The last analysis result per session
//! - Packaged analysis results, per session
//!
//! It also defines:
//! - `WorkspaceConfig`: serializable workspace metadata.
//! - `WorkspaceLayout`: computed paths for workspace directories/files.
//! - `WorkspaceContext`: layout + config + open database, bundled.

mod config;
mod context;
mod layout;
mod models;
mod util;
mod workspace_db;

pub use config::{BackendConfig, DbConfig, WorkspaceConfig};
pub use context::WorkspaceContext;
pub use layout::WorkspaceLayout;
pub use models::{LastAnalysis, SessionRecord};
pub use util::{load_workspace_config, open_workspace_db};
pub use workspace_db::{DbError, DbResult, WorkspaceDb, CURRENT_SCHEMA_VERSION};
