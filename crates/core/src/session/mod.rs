//! Page controllers.
//!
//! The upload and analysis views own their state here and talk to the
//! backend and the result store through explicitly passed collaborators.
//! Controllers never panic on backend failures: every failure becomes a
//! [`Notice`] and the user can retry.

mod analysis;
mod upload;

use serde::Serialize;

use crate::tree::FileTree;

pub use analysis::{AnalysisController, SourcePanel};
pub use upload::{is_accepted_archive, UploadController, ACCEPTED_ARCHIVE_EXTENSIONS};

/// Display name used when no archive name can be recovered.
pub const DEFAULT_ARCHIVE_NAME: &str = "uploaded archive";

/// A user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Notice {
    /// Shown inside a panel (method list, source view).
    Inline(String),
    /// Shown as a modal alert.
    Alert(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Notice::Inline(msg) | Notice::Alert(msg) => msg,
        }
    }
}

/// State handed back to the upload view after packaging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnState {
    pub zip_url: String,
    pub zip_name: String,
    pub file_name: String,
    pub session_id: String,
    pub file_tree: Option<FileTree>,
}

/// Where the frontend should go next.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Navigation {
    ToAnalysis { session_id: String, file_tree: FileTree },
    ToUpload(ReturnState),
}

/// Result of a controller action.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The action completed and state was updated.
    Done,
    /// Preconditions were not met (wrong file type, nothing selected, ...).
    Ignored,
    /// A request of the same kind is still in flight.
    Busy,
    Notice(Notice),
    Navigate(Navigation),
}

impl Outcome {
    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Outcome::Notice(notice) => Some(notice),
            _ => None,
        }
    }

    pub fn navigation(&self) -> Option<&Navigation> {
        match self {
            Outcome::Navigate(nav) => Some(nav),
            _ => None,
        }
    }
}

/// "`prefix`: detail" when the backend supplied a detail, else just `prefix`.
fn failure_message(prefix: &str, err: &crate::api::ApiError) -> String {
    match err.user_detail() {
        Some(detail) => format!("{prefix}: {detail}"),
        None => prefix.to_string(),
    }
}
