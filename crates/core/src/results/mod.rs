//! Analysis result cache.
//!
//! Each packaging request produces a downloadable zip. The list of those
//! packages is kept per session so it survives navigation between the
//! analysis and upload views (and, with the SQLite store, process restarts).
//!
//! Records are keyed by `unique_id`, not by URL: two packages from different
//! methods never collide even if the backend reuses a zip URL.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::SelectedPath;
use crate::db::DbResult;

/// One downloadable package produced by the analysis view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResultRecord {
    pub zip_url: String,
    pub zip_name: String,
    /// Display name of the uploaded archive.
    pub file_name: String,
    pub method_name: String,
    /// Analyzed file, relative to the session's upload root.
    pub file_path: String,
    pub timestamp: String,
    /// Deduplication key. Empty means "derive from method name + timestamp".
    #[serde(default)]
    pub unique_id: String,
    pub selected_paths_count: usize,
    #[serde(default)]
    pub paths_info: Vec<SelectedPath>,
}

impl AnalysisResultRecord {
    /// The effective deduplication key.
    pub fn key(&self) -> String {
        if self.unique_id.is_empty() {
            derive_unique_id(&self.method_name, &self.timestamp)
        } else {
            self.unique_id.clone()
        }
    }

    /// Fill in a missing `unique_id`.
    pub fn normalized(mut self) -> Self {
        if self.unique_id.is_empty() {
            self.unique_id = self.key();
        }
        self
    }
}

/// Key derived for records that arrive without one.
pub fn derive_unique_id(method_name: &str, timestamp: &str) -> String {
    format!("{method_name}-{timestamp}")
}

/// Key under which a session's result list is persisted.
pub fn storage_key(session_id: &str) -> String {
    format!("analysis-results:{session_id}")
}

/// Insert `record` into `list`, replacing an entry with the same key in place.
pub fn upsert(list: &mut Vec<AnalysisResultRecord>, record: AnalysisResultRecord) {
    let record = record.normalized();
    match list.iter_mut().find(|existing| existing.key() == record.unique_id) {
        Some(existing) => *existing = record,
        None => list.push(record),
    }
}

/// Repository of analysis results, per session.
///
/// Mutations are persisted before they return.
pub trait ResultStore {
    fn get(&self, session_id: &str) -> DbResult<Vec<AnalysisResultRecord>>;
    fn put(&mut self, session_id: &str, record: AnalysisResultRecord) -> DbResult<()>;
    /// Remove every record for the session; returns how many were removed.
    fn clear(&mut self, session_id: &str) -> DbResult<usize>;
}

/// In-memory store, for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryResultStore {
    entries: HashMap<String, Vec<AnalysisResultRecord>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryResultStore {
    fn get(&self, session_id: &str) -> DbResult<Vec<AnalysisResultRecord>> {
        Ok(self.entries.get(&storage_key(session_id)).cloned().unwrap_or_default())
    }

    fn put(&mut self, session_id: &str, record: AnalysisResultRecord) -> DbResult<()> {
        upsert(self.entries.entry(storage_key(session_id)).or_default(), record);
        Ok(())
    }

    fn clear(&mut self, session_id: &str) -> DbResult<usize> {
        Ok(self.entries.remove(&storage_key(session_id)).map(|list| list.len()).unwrap_or(0))
    }
}
