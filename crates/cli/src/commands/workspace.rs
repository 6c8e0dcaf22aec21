use std::fs;

use anyhow::{Context, Result};
use pathmarker_core::db::{WorkspaceConfig, WorkspaceDb, WorkspaceLayout};
use pathmarker_core::results::ResultStore;
use serde::Serialize;

use crate::commands::{open_context, print_dir_status, resolve_base_url, BACKEND_URL_ENV};
use crate::{canonicalize_or_current, infer_workspace_name};

#[derive(Serialize)]
pub struct WorkspaceInfoSnapshot {
    pub name: String,
    pub root: String,
    pub config_file: String,
    pub config_version: String,
    pub db_path: String,
    pub backend_url: String,
    pub timeout_secs: Option<u64>,
    pub layout: WorkspaceInfoLayout,
    pub sessions: Vec<SessionSummary>,
}

#[derive(Serialize)]
pub struct WorkspaceInfoLayout {
    pub meta_dir: String,
    pub downloads_dir: String,
}

#[derive(Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub archive_name: Option<String>,
    pub created_at: String,
    pub results: usize,
    pub has_analysis: bool,
}

/// Initialize a new workspace at `root`.
pub fn init_workspace_command(
    root: &str,
    name: Option<String>,
    backend_url: Option<String>,
) -> Result<()> {
    let root_path = canonicalize_or_current(root)?;
    let layout = WorkspaceLayout::new(&root_path);

    let workspace_name = match name {
        Some(n) => n,
        None => infer_workspace_name(&root_path),
    };

    fs::create_dir_all(&layout.meta_dir)
        .with_context(|| format!("Failed to create meta dir: {}", layout.meta_dir.display()))?;
    fs::create_dir_all(&layout.downloads_dir).with_context(|| {
        format!("Failed to create downloads dir: {}", layout.downloads_dir.display())
    })?;

    let mut config = WorkspaceConfig::new(&workspace_name, layout.db_path_relative_string());
    if let Some(url) = backend_url {
        config = config.with_base_url(url);
    }

    let json = serde_json::to_string_pretty(&config)?;
    fs::write(&layout.config_path, json).with_context(|| {
        format!("Failed to write workspace config: {}", layout.config_path.display())
    })?;

    // Create the database up front so later commands can rely on it.
    WorkspaceDb::open(&layout.db_path).with_context(|| {
        format!("Failed to initialize workspace database at {}", layout.db_path.display())
    })?;

    println!("Initialized PathMarker workspace:");
    println!("  Name: {}", workspace_name);
    println!("  Root: {}", layout.root.display());
    println!("  Config: {}", layout.config_path.display());
    println!("  DB path (relative): {}", config.db.path);
    println!("  Backend: {}", config.backend.base_url);
    println!("  Downloads dir: {}", layout.downloads_dir.display());

    Ok(())
}

/// Show basic information about an existing workspace.
pub fn workspace_info_command(root: &str, json: bool) -> Result<()> {
    let ctx = open_context(root)?;
    let layout = &ctx.layout;
    let config = &ctx.config;

    let mut sessions = Vec::new();
    for record in ctx.db.list_sessions().context("Failed to list sessions")? {
        let results = ctx.db.get(&record.session_id).map(|r| r.len()).unwrap_or_default();
        let has_analysis =
            matches!(ctx.db.load_last_analysis(&record.session_id), Ok(Some(_)));
        sessions.push(SessionSummary {
            session_id: record.session_id,
            archive_name: record.archive_name,
            created_at: record.created_at,
            results,
            has_analysis,
        });
    }
    let backend_url = resolve_base_url(config, std::env::var(BACKEND_URL_ENV).ok());

    if json {
        let snapshot = WorkspaceInfoSnapshot {
            name: config.name.clone(),
            root: layout.root.display().to_string(),
            config_file: layout.config_path.display().to_string(),
            config_version: config.config_version.clone(),
            db_path: config.db.path.clone(),
            backend_url,
            timeout_secs: config.backend.timeout_secs,
            layout: WorkspaceInfoLayout {
                meta_dir: layout.meta_dir.display().to_string(),
                downloads_dir: layout.downloads_dir.display().to_string(),
            },
            sessions,
        };
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("PathMarker Workspace Info");
    println!("=========================");
    println!("Name: {}", config.name);
    println!("Root: {}", layout.root.display());
    println!("Config file: {}", layout.config_path.display());
    println!("Config version: {}", config.config_version);
    println!("DB path (config): {}", config.db.path);
    println!("Backend: {}", backend_url);
    if let Some(secs) = config.backend.timeout_secs {
        println!("Timeout: {secs}s");
    }
    println!();

    println!("Directories:");
    print_dir_status("Meta dir (.pathmarker)", &layout.meta_dir);
    print_dir_status("Downloads dir", &layout.downloads_dir);
    println!();

    println!("Sessions: {}", sessions.len());
    for session in &sessions {
        let archive = session.archive_name.as_deref().unwrap_or("(unknown archive)");
        println!(
            "- {} [{}] results: {}{}",
            session.session_id,
            archive,
            session.results,
            if session.has_analysis { ", analyzed" } else { "" }
        );
    }

    Ok(())
}
