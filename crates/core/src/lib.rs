//! pathmarker-core
//!
//! Core library for the PathMarker client of a Java path-analysis backend.
//!
//! This crate defines the backend API types and HTTP adapter, the file-tree
//! adapter, the interactive image viewer state machine, the analysis-result
//! repository, the workspace database, and the page controllers that tie
//! them together.
//!
//! All substantive logic lives here so it is fully testable and reusable
//! from multiple frontends (CLI, GUI, etc.).

pub mod api;
pub mod db;
pub mod panels;
pub mod paths;
pub mod results;
pub mod session;
pub mod tree;
pub mod viewer;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
