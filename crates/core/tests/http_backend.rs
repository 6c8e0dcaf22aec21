mod common;

use std::time::Duration;

use common::{closed_base_url, Reply, StubServer};
use pathmarker_core::api::{
    AnalysisBackend, AnalyzeRequest, ApiError, ArchiveUpload, HttpBackend, PackageRequest,
    SelectedPath,
};
use pathmarker_core::results::{MemoryResultStore, ResultStore};
use pathmarker_core::session::{
    AnalysisController, Navigation, Notice, Outcome, SourcePanel, UploadController,
};
use pathmarker_core::tree::FileTree;
use serde_json::json;

fn backend(server: &StubServer) -> HttpBackend {
    HttpBackend::new(server.base_url(), Some(Duration::from_secs(10))).expect("client")
}

fn upload_tree() -> serde_json::Value {
    json!({
        "name": "demo.zip",
        "path": "uploads/s1",
        "isDir": true,
        "children": [{
            "name": "src",
            "path": "uploads/s1/src",
            "isDir": true,
            "children": [{"name": "Foo.java", "path": "uploads/s1/src/Foo.java"}]
        }]
    })
}

#[test]
fn upload_sends_multipart_file_and_navigates() {
    let server = StubServer::start(vec![Reply::json(json!({
        "sessionId": "s1",
        "fileTree": upload_tree()
    }))]);
    let backend = backend(&server);

    let mut controller = UploadController::new();
    let outcome = controller.upload(&backend, &ArchiveUpload::new("demo.zip", b"PK\x03\x04".to_vec()));
    match outcome {
        Outcome::Navigate(Navigation::ToAnalysis { session_id, file_tree }) => {
            assert_eq!(session_id, "s1");
            assert!(matches!(file_tree, FileTree::Node(_)));
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    let requests = server.finish();
    assert_eq!(requests.len(), 1);
    let upload = &requests[0];
    assert_eq!(upload.method, "POST");
    assert_eq!(upload.path, "/api/upload");
    assert!(upload.content_type().starts_with("multipart/form-data; boundary="));
    let body = upload.body_text();
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"demo.zip\""));
    assert!(body.contains("PK"));
}

#[test]
fn selecting_through_packaging_round_trips_over_http() {
    let server = StubServer::start(vec![
        Reply::json(json!({"methods": ["bar", "baz"]})),
        Reply::json(json!({"source": "void bar() {}"})),
        Reply::json(json!({
            "all_image": "x/output.png",
            "paths": [{
                "image_url": "results/s1/paths_img/p1.png",
                "path_json": "results/s1/paths_json/p1.json",
                "aspect_ratio": "1.5"
            }]
        })),
        Reply::json(json!({"zip_url": "/results/s1/out.zip"})),
    ]);
    let backend = backend(&server);
    let tree: FileTree = serde_json::from_value(upload_tree()).expect("tree");

    let mut controller = AnalysisController::new("s1", Some(tree));
    assert_eq!(controller.select_file(&backend, "uploads/s1/src/Foo.java"), Outcome::Done);
    assert_eq!(controller.methods(), ["bar".to_string(), "baz".to_string()]);
    assert_eq!(controller.select_method("bar"), Outcome::Done);
    assert_eq!(controller.show_source(&backend), Outcome::Done);
    assert_eq!(controller.source().source(), Some("void bar() {}"));
    assert_eq!(controller.analyze(&backend), Outcome::Done);
    assert_eq!(controller.toggle_path(0), Some(true));

    let mut store = MemoryResultStore::new();
    let outcome = controller.confirm_save(&backend, &mut store);
    assert!(matches!(outcome, Outcome::Navigate(Navigation::ToUpload(_))));
    let records = store.get("s1").expect("records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].selected_paths_count, 1);
    assert_eq!(records[0].zip_name, "out.zip");

    let requests = server.finish();
    let paths: Vec<&str> = requests.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(
        paths,
        ["/api/list-methods", "/api/get-method-source", "/api/analyze-paths", "/api/package-and-download"]
    );

    let methods = &requests[0];
    assert!(methods.content_type().starts_with("multipart/form-data"));
    assert_eq!(methods.multipart_field("sessionId").as_deref(), Some("s1"));
    assert_eq!(methods.multipart_field("filePath").as_deref(), Some("src/Foo.java"));

    let source = &requests[1];
    assert!(source.content_type().starts_with("multipart/form-data"));
    assert_eq!(source.multipart_field("filePath").as_deref(), Some("src/Foo.java"));
    assert_eq!(source.multipart_field("methodName").as_deref(), Some("bar"));

    let analyze = &requests[2];
    assert_eq!(analyze.content_type(), "application/x-www-form-urlencoded");
    assert_eq!(analyze.body_text(), "sessionId=s1&filePath=src%2FFoo.java&methodName=bar");

    let package = &requests[3];
    assert!(package.content_type().starts_with("application/json"));
    assert_eq!(
        package.body_json(),
        json!({
            "sessionId": "s1",
            "selected_paths": [{"png": "paths_img/p1.png", "json": "paths_json/p1.json"}]
        })
    );
}

#[test]
fn list_methods_error_field_is_shown_inline() {
    let server = StubServer::start(vec![Reply::json(json!({"error": "parse failed"}))]);
    let backend = backend(&server);

    let mut controller = AnalysisController::new("s1", None);
    let outcome = controller.select_file(&backend, "src/Foo.java");
    assert_eq!(
        outcome,
        Outcome::Notice(Notice::Inline("Failed to list methods: parse failed".into()))
    );
    assert!(controller.methods().is_empty());
    assert_eq!(
        controller.source(),
        &SourcePanel::Error("Failed to list methods: parse failed".into())
    );
    assert_eq!(server.finish().len(), 1);
}

#[test]
fn non_success_status_is_a_status_error() {
    let server = StubServer::start(vec![Reply::text(500, "boom")]);
    let err = backend(&server).list_methods("s1", "Foo.java").unwrap_err();
    assert!(matches!(err, ApiError::Status { code: 500 }));
    assert_eq!(err.user_detail(), None);
    server.finish();
}

#[test]
fn malformed_body_is_a_decode_error() {
    let server = StubServer::start(vec![Reply::text(200, "<html>not json</html>")]);
    let request = AnalyzeRequest { session_id: "s1".into(), file_path: None, method_name: None };
    let err = backend(&server).analyze_paths(&request).unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));

    let requests = server.finish();
    assert_eq!(requests[0].body_text(), "sessionId=s1");
}

#[test]
fn error_field_on_success_is_an_application_error() {
    let server = StubServer::start(vec![
        Reply::json(json!({"error": "no such method"})),
        Reply::json(json!({"error": "disk full"})),
        Reply::json(json!({"error": "bad archive"})),
    ]);
    let backend = backend(&server);

    let err = backend.method_source("s1", "Foo.java", "bar").unwrap_err();
    assert_eq!(err.user_detail(), Some("no such method"));

    let request = PackageRequest {
        session_id: "s1".into(),
        selected_paths: vec![SelectedPath { png: Some("paths_img/p1.png".into()), json: None, dot: None }],
    };
    let err = backend.package(&request).unwrap_err();
    assert_eq!(err.user_detail(), Some("disk full"));

    let err = backend.upload(&ArchiveUpload::new("a.zip", vec![1, 2, 3])).unwrap_err();
    assert_eq!(err.user_detail(), Some("bad archive"));
    assert_eq!(server.finish().len(), 3);
}

#[test]
fn unreachable_backend_is_a_transport_error() {
    let backend = HttpBackend::new(closed_base_url(), Some(Duration::from_secs(5))).expect("client");
    let err = backend.list_methods("s1", "Foo.java").unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[test]
fn download_fetches_bytes_relative_to_base() {
    let server = StubServer::start(vec![Reply::bytes(b"PK zip bytes"), Reply::text(404, "gone")]);
    let backend = backend(&server);

    assert_eq!(backend.download("/results/s1/out.zip").expect("bytes"), b"PK zip bytes");
    let err = backend.download("results/s1/missing.zip").unwrap_err();
    assert!(matches!(err, ApiError::Status { code: 404 }));

    let requests = server.finish();
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/results/s1/out.zip");
    assert_eq!(requests[1].path, "/results/s1/missing.zip");
}
