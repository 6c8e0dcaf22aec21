use std::time::Duration;

use pathmarker_core::api::{
    AnalyzeRequest, AnalyzeResponse, ApiError, AspectRatio, HttpBackend, MethodsResponse,
    PackageRequest, PackageResponse, SelectedPath, SourceResponse, UploadResponse,
};
use pathmarker_core::tree::FileTree;

#[test]
fn upload_response_accepts_rooted_and_listed_trees() {
    let rooted: UploadResponse = serde_json::from_str(
        r#"{"sessionId": "s1", "fileTree": {"name": "root", "isDir": true, "children": []}}"#,
    )
    .unwrap();
    assert_eq!(rooted.session_id.as_deref(), Some("s1"));
    assert!(matches!(rooted.file_tree, Some(FileTree::Node(_))));

    let listed: UploadResponse =
        serde_json::from_str(r#"{"sessionId": "s1", "fileTree": [{"name": "A.java"}]}"#).unwrap();
    assert!(matches!(listed.file_tree, Some(FileTree::Nodes(_))));

    let empty: UploadResponse = serde_json::from_str("{}").unwrap();
    assert_eq!(empty.session_id, None);
    assert_eq!(empty.file_tree, None);
}

#[test]
fn aspect_ratio_accepts_numbers_and_strings() {
    let response: AnalyzeResponse = serde_json::from_str(
        r#"{
            "all_image": "results/s1/output.png",
            "all_image_aspect_ratio": "2.75",
            "paths": [
                {"image_url": "a.png", "aspect_ratio": 1.25, "path_length": 3},
                {"image_url": "b.png", "aspect_ratio": "not a number"},
                {"image_url": "c.png"}
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(response.all_image_aspect_ratio.as_ref().and_then(AspectRatio::value), Some(2.75));
    assert_eq!(response.paths[0].aspect_ratio.as_ref().and_then(AspectRatio::value), Some(1.25));
    assert_eq!(response.paths[0].path_length, Some(3));
    assert_eq!(response.paths[1].aspect_ratio.as_ref().and_then(AspectRatio::value), None);
    assert_eq!(response.paths[2].aspect_ratio, None);
    assert_eq!(AspectRatio::Number(0.0).value(), None);
}

#[test]
fn error_fields_become_application_errors() {
    let methods: MethodsResponse = serde_json::from_str(r#"{"error": "parse failed"}"#).unwrap();
    match methods.into_result() {
        Err(ApiError::Application(msg)) => assert_eq!(msg, "parse failed"),
        other => panic!("unexpected {other:?}"),
    }

    let source: SourceResponse = serde_json::from_str(r#"{"source": "int x;"}"#).unwrap();
    assert_eq!(source.into_result().unwrap(), "int x;");

    let analysis: AnalyzeResponse = serde_json::from_str(r#"{"error": "no paths"}"#).unwrap();
    assert!(analysis.into_result().is_err());
}

#[test]
fn package_response_requires_a_url() {
    let ok: PackageResponse = serde_json::from_str(r#"{"zip_url": "/results/s1/out.zip"}"#).unwrap();
    assert_eq!(ok.into_result().unwrap(), "/results/s1/out.zip");

    let failed: PackageResponse = serde_json::from_str(r#"{"error": "disk full"}"#).unwrap();
    assert_eq!(failed.into_result().unwrap_err().user_detail(), Some("disk full"));

    let empty: PackageResponse = serde_json::from_str("{}").unwrap();
    assert!(matches!(empty.into_result(), Err(ApiError::Application(_))));
}

#[test]
fn request_payloads_use_backend_field_names() {
    let analyze = AnalyzeRequest {
        session_id: "s1".into(),
        file_path: Some("Foo.java".into()),
        method_name: None,
    };
    let json = serde_json::to_value(&analyze).unwrap();
    assert_eq!(json, serde_json::json!({"sessionId": "s1", "filePath": "Foo.java"}));

    let package = PackageRequest {
        session_id: "s1".into(),
        selected_paths: vec![SelectedPath { png: Some("paths_img/1.png".into()), json: None, dot: None }],
    };
    let json = serde_json::to_value(&package).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"sessionId": "s1", "selected_paths": [{"png": "paths_img/1.png"}]})
    );
}

#[test]
fn only_application_errors_carry_user_detail() {
    assert_eq!(ApiError::Status { code: 500 }.user_detail(), None);
    assert_eq!(ApiError::Application("boom".into()).user_detail(), Some("boom"));
    assert_eq!(ApiError::Status { code: 404 }.to_string(), "Backend returned HTTP 404");
}

#[test]
fn http_backend_resolves_urls_against_base() {
    let backend = HttpBackend::new("http://localhost:8000/", Some(Duration::from_secs(5))).unwrap();
    assert_eq!(backend.base_url(), "http://localhost:8000");
    assert_eq!(backend.url("/api/upload"), "http://localhost:8000/api/upload");
    assert_eq!(backend.url("results/s1/out.zip"), "http://localhost:8000/results/s1/out.zip");
    assert_eq!(backend.url("https://cdn.example/out.zip"), "https://cdn.example/out.zip");
}
