//! Backend API: request/response shapes and the backend trait.
//!
//! The analysis backend exposes five calls (upload, list methods, method
//! source, analyze paths, package) plus static download of packaged results.
//! Everything the backend computes is opaque to this crate; only the shapes
//! consumed here are modeled.

pub mod http;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tree::FileTree;

pub use http::HttpBackend;

/// Error type for backend calls.
///
/// The three failure kinds a caller can observe are kept distinct here even
/// though the page controllers collapse them into one user-visible message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network/transport failure (connection refused, timeout, TLS, ...).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("Backend returned HTTP {code}")]
    Status { code: u16 },

    /// The backend answered 2xx but the body was not the expected JSON.
    #[error("Failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The backend reported an application-level `error` field.
    #[error("{0}")]
    Application(String),
}

impl ApiError {
    /// Detail worth showing next to a generic failure message.
    ///
    /// Only application errors carry a message meant for users.
    pub fn user_detail(&self) -> Option<&str> {
        match self {
            ApiError::Application(msg) => Some(msg.as_str()),
            _ => None,
        }
    }
}

/// Convenience result type for backend calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// An archive chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ArchiveUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), bytes }
    }
}

/// Response to `POST /api/upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub file_tree: Option<FileTree>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response to `POST /api/list-methods`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodsResponse {
    #[serde(default)]
    pub methods: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl MethodsResponse {
    pub fn into_result(self) -> ApiResult<Vec<String>> {
        match self.error {
            Some(err) => Err(ApiError::Application(err)),
            None => Ok(self.methods.unwrap_or_default()),
        }
    }
}

/// Response to `POST /api/get-method-source`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceResponse {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SourceResponse {
    pub fn into_result(self) -> ApiResult<String> {
        match self.error {
            Some(err) => Err(ApiError::Application(err)),
            None => Ok(self.source.unwrap_or_default()),
        }
    }
}

/// Aspect ratio as sent by the backend: sometimes a number, sometimes a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AspectRatio {
    Number(f64),
    Text(String),
}

impl AspectRatio {
    /// Numeric value, when the backend value parses as a positive finite float.
    pub fn value(&self) -> Option<f64> {
        let v = match self {
            AspectRatio::Number(n) => *n,
            AspectRatio::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        (v.is_finite() && v > 0.0).then_some(v)
    }
}

/// One enumerated execution path in an analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathEntry {
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dot_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<AspectRatio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_length: Option<u32>,
}

impl PathEntry {
    /// Identity used for selection: the triple of artifact locations.
    pub fn selection(&self) -> SelectedPath {
        SelectedPath {
            png: Some(self.image_url.clone()),
            json: self.path_json.clone(),
            dot: self.dot_file.clone(),
        }
    }
}

/// Form payload for `POST /api/analyze-paths`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "filePath", default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(rename = "methodName", default, skip_serializing_if = "Option::is_none")]
    pub method_name: Option<String>,
}

/// Response to `POST /api/analyze-paths`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub all_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_image_aspect_ratio: Option<AspectRatio>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_image_height: Option<f64>,
    #[serde(default)]
    pub paths: Vec<PathEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalyzeResponse {
    pub fn into_result(self) -> ApiResult<AnalyzeResponse> {
        match self.error {
            Some(err) => Err(ApiError::Application(err)),
            None => Ok(self),
        }
    }
}

/// Artifacts of one selected path, as sent to the packaging endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectedPath {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub png: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dot: Option<String>,
}

/// JSON payload for `POST /api/package-and-download`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRequest {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub selected_paths: Vec<SelectedPath>,
}

/// Response to `POST /api/package-and-download`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageResponse {
    #[serde(default)]
    pub zip_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PackageResponse {
    pub fn into_result(self) -> ApiResult<String> {
        match (self.zip_url, self.error) {
            (Some(url), _) if !url.is_empty() => Ok(url),
            (_, Some(err)) => Err(ApiError::Application(err)),
            _ => Err(ApiError::Application("no package URL returned".to_string())),
        }
    }
}

/// Trait implemented by analysis backends.
///
/// `HttpBackend` talks to the real service; tests script their own.
pub trait AnalysisBackend {
    fn upload(&self, archive: &ArchiveUpload) -> ApiResult<UploadResponse>;
    fn list_methods(&self, session_id: &str, file_path: &str) -> ApiResult<Vec<String>>;
    fn method_source(
        &self,
        session_id: &str,
        file_path: &str,
        method_name: &str,
    ) -> ApiResult<String>;
    fn analyze_paths(&self, request: &AnalyzeRequest) -> ApiResult<AnalyzeResponse>;
    /// Package the selected paths; returns the URL of the produced zip.
    fn package(&self, request: &PackageRequest) -> ApiResult<String>;
    /// Fetch a packaged result by the URL returned from [`AnalysisBackend::package`].
    fn download(&self, url: &str) -> ApiResult<Vec<u8>>;
    fn name(&self) -> &str;
}
