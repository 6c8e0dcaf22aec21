use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use pathmarker_core::api::HttpBackend;
use pathmarker_core::db::{SessionRecord, WorkspaceConfig, WorkspaceContext};
use pathmarker_core::session::{AnalysisController, Outcome};

use crate::canonicalize_or_current;

/// Environment variable that overrides the configured backend URL.
pub const BACKEND_URL_ENV: &str = "PATHMARKER_BACKEND_URL";

/// Load the workspace at `root` (config + open DB).
pub fn open_context(root: &str) -> Result<WorkspaceContext> {
    let root_path = canonicalize_or_current(root)?;
    WorkspaceContext::from_root(&root_path)
}

/// Backend base URL: a non-empty override wins over the config.
pub fn resolve_base_url(config: &WorkspaceConfig, override_url: Option<String>) -> String {
    override_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| config.backend.base_url.clone())
}

/// Build the HTTP backend described by the workspace config.
pub fn backend_from_config(config: &WorkspaceConfig) -> Result<HttpBackend> {
    let base_url = resolve_base_url(config, std::env::var(BACKEND_URL_ENV).ok());
    tracing::debug!(%base_url, "using analysis backend");
    HttpBackend::new(&base_url, config.backend.timeout())
        .with_context(|| format!("Failed to create HTTP client for {base_url}"))
}

/// Load a session previously created by `upload`.
pub fn load_session(ctx: &WorkspaceContext, session_id: &str) -> Result<SessionRecord> {
    ctx.db
        .load_session(session_id)
        .with_context(|| format!("Failed to load session {session_id}"))?
        .ok_or_else(|| anyhow!("Unknown session '{session_id}'; upload an archive first"))
}

/// Analysis controller for a stored session.
pub fn controller_for(record: &SessionRecord) -> AnalysisController {
    AnalysisController::new(&record.session_id, record.file_tree.clone())
        .with_archive_name(record.archive_name.clone())
}

/// Turn a controller outcome into a CLI result. Notices become errors.
pub fn expect_done(outcome: Outcome, action: &str) -> Result<Outcome> {
    match outcome {
        Outcome::Done | Outcome::Navigate(_) => Ok(outcome),
        Outcome::Notice(notice) => Err(anyhow!("{}", notice.message())),
        Outcome::Ignored => bail!("Cannot {action} with the current selection"),
        Outcome::Busy => bail!("Cannot {action}: a request is already in progress"),
    }
}

/// Helper to print whether a directory exists.
pub fn print_dir_status(label: &str, path: &Path) {
    let exists = path.is_dir();
    println!("- {label}: {} ({})", if exists { "OK" } else { "MISSING" }, path.display());
}
