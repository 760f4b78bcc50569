//! Service-layer error types
//!
//! This module defines error types for the service layer, wrapping the core
//! artifact errors and adding the failures of the download and preference
//! collaborators.

use ocr_artifacts_core::{ArtifactError, ArtifactRole};
use thiserror::Error;

/// Result type alias for service operations
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Service-layer error types
#[derive(Error, Debug)]
pub enum ServiceError {
    /// An artifact could not be loaded from any permitted backend
    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    /// Reading a text artifact failed after it was opened
    #[error("Failed to read {role} artifact: {message}")]
    ArtifactRead { role: ArtifactRole, message: String },

    /// A remote source locator is not a valid URL
    #[error("Invalid source URL {url}: {message}")]
    InvalidSource { url: String, message: String },

    /// Fetching a remote artifact failed
    #[error("Download of {url} failed: {message}")]
    Download { url: String, message: String },

    /// Preference storage failed
    #[error("Preference store error: {0}")]
    Preferences(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ServiceError {
    /// Whether the error is a terminal artifact load failure
    pub fn is_load_failure(&self) -> bool {
        matches!(self, ServiceError::Artifact(ArtifactError::LoadFailed { .. }))
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Download {
            url: err
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "<unknown>".to_string()),
            message: err.to_string(),
        }
    }
}
