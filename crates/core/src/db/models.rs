use serde::{Deserialize, Serialize};

use crate::api::AnalyzeResponse;
use crate::tree::FileTree;

/// An uploaded archive and the server-side session it created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    /// File name of the uploaded archive, when known.
    pub archive_name: Option<String>,
    /// SHA-256 of the uploaded archive, when known.
    pub archive_hash: Option<String>,
    pub file_tree: Option<FileTree>,
    pub created_at: String,
}

impl SessionRecord {
    pub fn new(session_id: impl Into<String>, file_tree: Option<FileTree>) -> Self {
        Self {
            session_id: session_id.into(),
            archive_name: None,
            archive_hash: None,
            file_tree,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// The most recent analysis for a session, with what it was run against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastAnalysis {
    /// Selected file as shown in the tree (not stripped of the session prefix).
    pub file_path: Option<String>,
    pub method_name: Option<String>,
    pub response: AnalyzeResponse,
}
