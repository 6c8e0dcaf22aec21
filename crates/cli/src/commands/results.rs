use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use pathmarker_core::api::AnalysisBackend;
use pathmarker_core::session::UploadController;

use crate::commands::{backend_from_config, open_context};
use crate::format_timestamp;

/// List packaged analysis results for a session.
pub fn results_command(root: &str, session_id: &str, json: bool) -> Result<()> {
    let ctx = open_context(root)?;
    let records = UploadController::new()
        .downloads(&ctx.db, session_id)
        .with_context(|| format!("Failed to list results for session {session_id}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No analysis results for session {session_id}");
        return Ok(());
    }
    println!("Analysis results for session {session_id}:");
    for record in &records {
        println!(
            "- {} [{}] {} :: {} ({} path(s), {})",
            record.zip_name,
            record.unique_id,
            record.file_path,
            record.method_name,
            record.selected_paths_count,
            format_timestamp(&record.timestamp)
        );
    }
    Ok(())
}

/// Remove every packaged result recorded for a session.
pub fn clear_results_command(root: &str, session_id: &str) -> Result<()> {
    let mut ctx = open_context(root)?;
    let removed = UploadController::new()
        .clear_downloads(&mut ctx.db, session_id)
        .with_context(|| format!("Failed to clear results for session {session_id}"))?;
    println!("Removed {removed} result(s) for session {session_id}");
    Ok(())
}

/// Download one packaged result to disk.
///
/// Without `--out` the zip lands in `downloads/<session>/<zip name>`.
pub fn download_command(
    root: &str,
    session_id: &str,
    unique_id: &str,
    out: Option<String>,
) -> Result<()> {
    let ctx = open_context(root)?;
    let records = UploadController::new()
        .downloads(&ctx.db, session_id)
        .with_context(|| format!("Failed to list results for session {session_id}"))?;
    let record = records
        .iter()
        .find(|r| r.unique_id == unique_id)
        .ok_or_else(|| anyhow!("No result '{unique_id}' in session {session_id}"))?;

    let target = match out {
        Some(path) => PathBuf::from(path),
        None => ctx.layout.session_downloads_dir(session_id).join(&record.zip_name),
    };
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let backend = backend_from_config(&ctx.config)?;
    let bytes = backend
        .download(&record.zip_url)
        .with_context(|| format!("Failed to download {}", record.zip_url))?;
    fs::write(&target, &bytes)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    println!("Downloaded {} ({} bytes) to {}", record.zip_name, bytes.len(), target.display());
    Ok(())
}
