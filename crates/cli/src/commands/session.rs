use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use pathmarker_core::api::{AnalysisBackend, AnalyzeResponse, ArchiveUpload, HttpBackend};
use pathmarker_core::db::SessionRecord;
use pathmarker_core::session::{AnalysisController, Navigation, Outcome, UploadController};
use pathmarker_core::tree::{adapt, files, render_lines};

use crate::commands::{backend_from_config, controller_for, expect_done, load_session, open_context};
use crate::sha256_file;

/// Upload an archive and record the session it creates.
pub fn upload_command(root: &str, archive: &str) -> Result<()> {
    let ctx = open_context(root)?;
    let backend = backend_from_config(&ctx.config)?;

    let archive_path = Path::new(archive);
    let file_name = archive_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("Archive path has no file name: {archive}"))?
        .to_string();
    let bytes = fs::read(archive_path)
        .with_context(|| format!("Failed to read archive {}", archive_path.display()))?;
    let hash = sha256_file(archive_path)?;

    let mut controller = UploadController::new();
    let outcome = controller.upload(&backend, &ArchiveUpload::new(&file_name, bytes));
    let Outcome::Navigate(Navigation::ToAnalysis { session_id, file_tree }) =
        expect_done(outcome, "upload")?
    else {
        bail!("Upload finished without a session");
    };

    let mut record = SessionRecord::new(&session_id, Some(file_tree));
    record.archive_name = Some(file_name);
    record.archive_hash = Some(hash);
    ctx.db.upsert_session(&record).context("Failed to record session")?;

    println!("Uploaded {}", archive_path.display());
    println!("Session: {}", session_id);
    if let Some(tree) = &record.file_tree {
        let java_files = files(&adapt(tree))
            .into_iter()
            .filter(|n| n.path.as_deref().is_some_and(pathmarker_core::tree::is_java))
            .count();
        println!("Java files: {java_files}");
    }
    Ok(())
}

/// Print a session's file tree.
pub fn tree_command(root: &str, session_id: &str, json: bool) -> Result<()> {
    let ctx = open_context(root)?;
    let record = load_session(&ctx, session_id)?;
    let Some(tree) = &record.file_tree else {
        bail!("Session '{session_id}' has no file tree");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&adapt(tree))?);
        return Ok(());
    }
    for line in render_lines(&adapt(tree)) {
        println!("{line}");
    }
    Ok(())
}

/// Select `file` in a fresh controller, failing on any notice.
fn select_file(
    controller: &mut AnalysisController,
    backend: &dyn AnalysisBackend,
    file: &str,
) -> Result<()> {
    if !pathmarker_core::tree::is_java(file) {
        bail!("'{file}' is not a Java source file");
    }
    expect_done(controller.select_file(backend, file), "list methods")?;
    Ok(())
}

/// Select `file` and `method`, then load the method's source.
fn load_source(
    controller: &mut AnalysisController,
    backend: &dyn AnalysisBackend,
    file: &str,
    method: &str,
) -> Result<()> {
    select_file(controller, backend, file)?;
    if !controller.methods().iter().any(|m| m == method) {
        tracing::warn!(file, method, "method not in the listed methods");
    }
    expect_done(controller.select_method(method), "select a method")?;
    expect_done(controller.show_source(backend), "show source")?;
    Ok(())
}

/// List the methods of a Java file in a session.
pub fn methods_command(root: &str, session_id: &str, file: &str) -> Result<()> {
    let ctx = open_context(root)?;
    let record = load_session(&ctx, session_id)?;
    let backend = backend_from_config(&ctx.config)?;

    let mut controller = controller_for(&record);
    select_file(&mut controller, &backend, file)?;

    if controller.methods().is_empty() {
        println!("No methods found in {file}");
    }
    for method in controller.methods() {
        println!("{method}");
    }
    Ok(())
}

/// Print the source of one method.
pub fn source_command(root: &str, session_id: &str, file: &str, method: &str) -> Result<()> {
    let ctx = open_context(root)?;
    let record = load_session(&ctx, session_id)?;
    let backend = backend_from_config(&ctx.config)?;

    let mut controller = controller_for(&record);
    load_source(&mut controller, &backend, file, method)?;
    match controller.source().source() {
        Some(source) => println!("{source}"),
        None => println!("(no source returned for {method})"),
    }
    Ok(())
}

/// Analyze paths for a method and remember the result for `package`.
///
/// Without `--file`/`--method` the previous analysis target is reused.
pub fn analyze_command(
    root: &str,
    session_id: &str,
    file: Option<String>,
    method: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = open_context(root)?;
    let record = load_session(&ctx, session_id)?;
    let backend = backend_from_config(&ctx.config)?;

    let previous =
        ctx.db.load_last_analysis(session_id).context("Failed to load the last analysis")?;
    let file = file.or_else(|| previous.as_ref().and_then(|p| p.file_path.clone()));
    let method = method.or_else(|| previous.as_ref().and_then(|p| p.method_name.clone()));
    let (Some(file), Some(method)) = (file, method) else {
        bail!("No previous analysis for session '{session_id}'; pass --file and --method");
    };

    let mut controller = controller_for(&record);
    load_source(&mut controller, &backend, &file, &method)?;
    expect_done(controller.analyze(&backend), "analyze")?;

    let last = controller.last_analysis().ok_or_else(|| anyhow!("Analysis returned no result"))?;
    ctx.db.save_last_analysis(session_id, &last).context("Failed to save analysis result")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&last.response)?);
        return Ok(());
    }
    print_analysis(&backend, &last.response);
    Ok(())
}

fn print_analysis(backend: &HttpBackend, response: &AnalyzeResponse) {
    if let Some(image) = &response.all_image {
        println!("Call graph: {}", backend.url(&AnalysisController::image_src(image)));
    }
    println!("Paths: {}", response.paths.len());
    for (idx, path) in response.paths.iter().enumerate() {
        let length = path.path_length.map(|l| format!(" (length {l})")).unwrap_or_default();
        println!("[{idx}] {}{length}", path.image_url);
    }
}

/// Package selected paths from the last analysis into a downloadable zip.
pub fn package_command(root: &str, session_id: &str, indices: &[usize]) -> Result<()> {
    if indices.is_empty() {
        bail!("Select at least one path with --path");
    }
    let mut ctx = open_context(root)?;
    let record = load_session(&ctx, session_id)?;
    let backend = backend_from_config(&ctx.config)?;

    let last = ctx
        .db
        .load_last_analysis(session_id)
        .context("Failed to load the last analysis")?
        .ok_or_else(|| anyhow!("No analysis for session '{session_id}'; run `analyze` first"))?;

    let mut controller = controller_for(&record);
    controller.restore_analysis(last);
    for &idx in indices {
        if controller.is_path_selected(idx) {
            continue;
        }
        controller
            .toggle_path(idx)
            .ok_or_else(|| anyhow!("Path index {idx} is out of range"))?;
    }

    let outcome = controller.confirm_save(&backend, &mut ctx.db);
    let Outcome::Navigate(Navigation::ToUpload(state)) = expect_done(outcome, "package paths")?
    else {
        bail!("Packaging finished without a result");
    };

    println!("Packaged {} path(s) from {}", controller.selected_paths().len(), state.file_name);
    println!("Zip: {}", state.zip_name);
    println!("URL: {}", state.zip_url);
    Ok(())
}
