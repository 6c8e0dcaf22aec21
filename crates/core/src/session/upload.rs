use tracing::{info, warn};

use crate::api::{AnalysisBackend, ApiError, ArchiveUpload};
use crate::db::DbResult;
use crate::results::{AnalysisResultRecord, ResultStore};
use crate::session::{Navigation, Notice, Outcome, ReturnState};

/// Archive types the backend can extract.
pub const ACCEPTED_ARCHIVE_EXTENSIONS: [&str; 5] = [".zip", ".rar", ".7z", ".tar", ".gz"];

/// Case-insensitive check against [`ACCEPTED_ARCHIVE_EXTENSIONS`].
pub fn is_accepted_archive(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    ACCEPTED_ARCHIVE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Controller for the upload view.
///
/// Fresh, it offers the upload action. After returning from the analysis
/// view it also lists downloadable results and offers re-analysis.
#[derive(Debug, Default)]
pub struct UploadController {
    uploading: bool,
    file_name: Option<String>,
    returned: Option<ReturnState>,
}

impl UploadController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the view with state passed back from the analysis view.
    pub fn returned_from_analysis(state: ReturnState) -> Self {
        Self { uploading: false, file_name: Some(state.file_name.clone()), returned: Some(state) }
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn returned(&self) -> Option<&ReturnState> {
        self.returned.as_ref()
    }

    /// Upload an archive. On success with both a session id and a file
    /// tree, navigates to the analysis view.
    pub fn upload(&mut self, backend: &dyn AnalysisBackend, archive: &ArchiveUpload) -> Outcome {
        if self.uploading {
            return Outcome::Busy;
        }
        if !is_accepted_archive(&archive.file_name) {
            return Outcome::Notice(Notice::Alert(format!(
                "Unsupported archive type: {} (expected one of {})",
                archive.file_name,
                ACCEPTED_ARCHIVE_EXTENSIONS.join(", ")
            )));
        }

        self.file_name = Some(archive.file_name.clone());
        self.uploading = true;
        let result = backend.upload(archive);
        self.uploading = false;

        match result {
            Ok(response) => match (response.session_id, response.file_tree) {
                (Some(session_id), Some(file_tree)) if !session_id.is_empty() => {
                    info!(%session_id, file = %archive.file_name, "archive uploaded");
                    Outcome::Navigate(Navigation::ToAnalysis { session_id, file_tree })
                }
                _ => Outcome::Notice(Notice::Alert(
                    "Upload succeeded, but no file tree was returned".to_string(),
                )),
            },
            Err(err @ (ApiError::Status { .. } | ApiError::Decode(_))) => {
                warn!(error = %err, "upload rejected");
                Outcome::Notice(Notice::Alert(
                    "Upload failed; check the backend service or the archive format".to_string(),
                ))
            }
            Err(err) => {
                warn!(error = %err, "upload failed");
                Outcome::Notice(Notice::Alert(format!("Upload error: {err}")))
            }
        }
    }

    /// Go back to the analysis view for the session we returned from.
    pub fn reanalyze(&self) -> Outcome {
        match &self.returned {
            Some(ReturnState { session_id, file_tree: Some(file_tree), .. }) => {
                Outcome::Navigate(Navigation::ToAnalysis {
                    session_id: session_id.clone(),
                    file_tree: file_tree.clone(),
                })
            }
            _ => Outcome::Ignored,
        }
    }

    /// Forget the previous archive and return to the plain upload view.
    pub fn reupload(&mut self) {
        self.file_name = None;
        self.returned = None;
    }

    /// Downloadable results for a session.
    pub fn downloads(
        &self,
        store: &dyn ResultStore,
        session_id: &str,
    ) -> DbResult<Vec<AnalysisResultRecord>> {
        store.get(session_id)
    }

    /// Drop every stored result for a session.
    pub fn clear_downloads(
        &mut self,
        store: &mut dyn ResultStore,
        session_id: &str,
    ) -> DbResult<usize> {
        let removed = store.clear(session_id)?;
        info!(session_id, removed, "cleared stored analysis results");
        Ok(removed)
    }
}
