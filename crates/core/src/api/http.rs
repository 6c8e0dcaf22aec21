use std::time::Duration;

use reqwest::blocking::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::{
    AnalysisBackend, AnalyzeRequest, AnalyzeResponse, ApiError, ApiResult, ArchiveUpload,
    MethodsResponse, PackageRequest, PackageResponse, SourceResponse, UploadResponse,
};

/// Backend base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const USER_AGENT: &str = concat!("pathmarker/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP adapter for the analysis backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a backend client. `timeout: None` leaves requests unbounded.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> ApiResult<Self> {
        let client = Client::builder().user_agent(USER_AGENT).timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve an endpoint or result URL against the base URL.
    ///
    /// Absolute `http(s)://` URLs are used as-is.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn send_json<T: DeserializeOwned>(&self, endpoint: &str, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            warn!(endpoint, status = status.as_u16(), "backend returned non-success status");
            return Err(ApiError::Status { code: status.as_u16() });
        }
        let body = response.text()?;
        debug!(endpoint, bytes = body.len(), "backend response received");
        Ok(serde_json::from_str(&body)?)
    }
}

impl AnalysisBackend for HttpBackend {
    fn upload(&self, archive: &ArchiveUpload) -> ApiResult<UploadResponse> {
        let part = multipart::Part::bytes(archive.bytes.clone()).file_name(archive.file_name.clone());
        let form = multipart::Form::new().part("file", part);
        debug!(file = %archive.file_name, bytes = archive.bytes.len(), "uploading archive");
        let request = self.client.post(self.url("/api/upload")).multipart(form);
        let response: UploadResponse = self.send_json("upload", request)?;
        match response.error {
            Some(err) => Err(ApiError::Application(err)),
            None => Ok(response),
        }
    }

    fn list_methods(&self, session_id: &str, file_path: &str) -> ApiResult<Vec<String>> {
        let form = multipart::Form::new()
            .text("sessionId", session_id.to_string())
            .text("filePath", file_path.to_string());
        debug!(session_id, file_path, "listing methods");
        let request = self.client.post(self.url("/api/list-methods")).multipart(form);
        let response: MethodsResponse = self.send_json("list-methods", request)?;
        response.into_result()
    }

    fn method_source(
        &self,
        session_id: &str,
        file_path: &str,
        method_name: &str,
    ) -> ApiResult<String> {
        let form = multipart::Form::new()
            .text("sessionId", session_id.to_string())
            .text("filePath", file_path.to_string())
            .text("methodName", method_name.to_string());
        debug!(session_id, file_path, method_name, "fetching method source");
        let request = self.client.post(self.url("/api/get-method-source")).multipart(form);
        let response: SourceResponse = self.send_json("get-method-source", request)?;
        response.into_result()
    }

    fn analyze_paths(&self, request: &AnalyzeRequest) -> ApiResult<AnalyzeResponse> {
        debug!(?request, "requesting path analysis");
        let builder = self.client.post(self.url("/api/analyze-paths")).form(request);
        let response: AnalyzeResponse = self.send_json("analyze-paths", builder)?;
        response.into_result()
    }

    fn package(&self, request: &PackageRequest) -> ApiResult<String> {
        debug!(selected = request.selected_paths.len(), "requesting package");
        let builder = self.client.post(self.url("/api/package-and-download")).json(request);
        let response: PackageResponse = self.send_json("package-and-download", builder)?;
        response.into_result()
    }

    fn download(&self, url: &str) -> ApiResult<Vec<u8>> {
        let response = self.client.get(self.url(url)).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { code: status.as_u16() });
        }
        Ok(response.bytes()?.to_vec())
    }

    fn name(&self) -> &str {
        "http"
    }
}
