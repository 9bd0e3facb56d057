//! Error types for Draftboard.
//!
//! This module provides the error type returned to IPC clients and CLI users.
//! It serializes as `{"kind": "...", "message": "..."}`.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::layout::LayoutError;

/// Errors that can occur during application execution.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum DraftboardError {
    /// The request could not be understood.
    #[error("{0}")]
    InvalidRequest(String),
    /// Layout storage failed.
    #[error("Storage error: {0}")]
    StorageError(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// Serialization failed.
    #[error("Encoding error: {0}")]
    EncodeError(String),
}

impl From<LayoutError> for DraftboardError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::Storage { .. } => Self::StorageError(err.to_string()),
            LayoutError::Encode(inner) => Self::EncodeError(inner.to_string()),
            LayoutError::InvalidRequest(msg) => Self::InvalidRequest(msg),
        }
    }
}

impl From<ConfigError> for DraftboardError {
    fn from(err: ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<std::io::Error> for DraftboardError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for DraftboardError {
    fn from(err: serde_json::Error) -> Self { Self::EncodeError(err.to_string()) }
}
