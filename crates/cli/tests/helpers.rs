use std::fs;
use std::path::Path;

use pathmarker::commands::{expect_done, resolve_base_url, run_viewer_script};
use pathmarker::{canonicalize_or_current, format_timestamp, infer_workspace_name, sha256_file};
use pathmarker_core::db::WorkspaceConfig;
use pathmarker_core::session::{Notice, Outcome};
use pathmarker_core::viewer::ImageHint;
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_resolves_existing_relative_path() {
    let original = std::env::current_dir().expect("cwd");
    let tmp = tempdir().expect("tempdir");
    let subdir = tmp.path().join("nested");
    fs::create_dir_all(&subdir).expect("create nested");
    std::env::set_current_dir(tmp.path()).expect("chdir tmp");

    let result = canonicalize_or_current("nested").expect("canonicalize nested");
    assert_eq!(result, subdir.canonicalize().expect("canonicalize subdir"));

    std::env::set_current_dir(original).expect("restore cwd");
}

#[test]
fn canonicalize_or_current_joins_missing_paths_onto_cwd() {
    let result = canonicalize_or_current("does/not/exist/yet").expect("path");
    assert!(result.is_absolute());
    assert!(result.ends_with("does/not/exist/yet"));
}

#[test]
fn infer_workspace_name_uses_last_path_component() {
    assert_eq!(infer_workspace_name(Path::new("/tmp/java-audit")), "java-audit");
    assert_eq!(infer_workspace_name(Path::new("/")), "unnamed-workspace");
}

#[test]
fn sha256_file_hashes_contents() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("archive.zip");
    fs::write(&path, b"abc").expect("write");
    assert_eq!(
        sha256_file(&path).expect("hash"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert!(sha256_file(&tmp.path().join("missing.zip")).is_err());
}

#[test]
fn timestamps_are_shown_in_utc_minutes() {
    assert_eq!(format_timestamp("2024-05-01T10:05:59Z"), "2024-05-01 10:05");
    assert_eq!(format_timestamp("2024-05-01T10:05:00+02:00"), "2024-05-01 08:05");
    assert_eq!(format_timestamp("yesterday"), "yesterday");
}

#[test]
fn backend_url_override_wins_when_non_empty() {
    let config = WorkspaceConfig::new("demo", ".pathmarker/pathmarker.db");
    assert_eq!(resolve_base_url(&config, None), "http://localhost:8000");
    assert_eq!(resolve_base_url(&config, Some("  ".into())), "http://localhost:8000");
    assert_eq!(resolve_base_url(&config, Some("http://remote:1".into())), "http://remote:1");

    let custom = config.with_base_url("http://lab:8080");
    assert_eq!(resolve_base_url(&custom, None), "http://lab:8080");
}

#[test]
fn notices_become_errors() {
    assert!(expect_done(Outcome::Done, "analyze").is_ok());
    let err = expect_done(Outcome::Notice(Notice::Alert("Analysis failed".into())), "analyze")
        .unwrap_err();
    assert_eq!(err.to_string(), "Analysis failed");
    let err = expect_done(Outcome::Ignored, "analyze").unwrap_err();
    assert!(err.to_string().contains("Cannot analyze"));
    assert!(expect_done(Outcome::Busy, "analyze").is_err());
}

#[test]
fn viewer_script_reports_frame_and_released_listeners() {
    let report =
        run_viewer_script("graph.png", "wheel:-100 down:0,0 move:10,0", ImageHint::default())
            .expect("report");
    assert_eq!(report.events, 3);
    assert!(!report.closed);
    assert!(!report.listeners_left);
    assert_eq!(report.frame.zoom_label, "200%");
    assert_eq!(report.frame.cursor, "grabbing");
    assert_eq!(report.frame.transform, "scale(2) translate(5px, 0px)");

    assert!(run_viewer_script("", "", ImageHint::default()).is_err());
}
