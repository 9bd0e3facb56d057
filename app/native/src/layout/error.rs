//! Errors surfaced by the layout engine.
//!
//! Bad layouts, unknown displays and repeated opens are recovered from inside
//! the engine and never show up here.

use thiserror::Error;

/// Failures that reach the caller of a layout operation.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The project's record could not be read or written.
    #[error("layout storage failed for {project}: {source}")]
    Storage {
        /// Project whose record was being accessed.
        project: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The record could not be encoded.
    #[error("failed to encode layout: {0}")]
    Encode(#[from] serde_json::Error),
    /// A request could not be understood.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl LayoutError {
    pub(crate) fn storage(project: &str, source: std::io::Error) -> Self {
        Self::Storage { project: project.to_string(), source }
    }
}

/// Result alias for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;
