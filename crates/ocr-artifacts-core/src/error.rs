//! Error types for artifact resolution and loading

use thiserror::Error;

use crate::types::{ArtifactRole, LoadStrategy};

/// Result type alias for artifact operations
pub type Result<T> = std::result::Result<T, ArtifactError>;

/// Main error type for artifact operations
///
/// Backend probe failures never surface here; they degrade to "absent" so that
/// the strategy's fallback can proceed. `LoadFailed` is raised only once every
/// backend the strategy allows has come up empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    /// No backend permitted by the strategy yielded the artifact
    #[error("Failed to load {role} artifact from {path} with strategy {strategy}")]
    LoadFailed {
        role: ArtifactRole,
        path: String,
        strategy: LoadStrategy,
    },

    /// Unrecognized load strategy name
    #[error("Invalid load strategy: {0}")]
    InvalidStrategy(String),

    /// Unrecognized artifact role name
    #[error("Invalid artifact role: {0}")]
    InvalidRole(String),
}

impl ArtifactError {
    /// Build a load failure for the given role, path and strategy
    pub fn load_failed(role: ArtifactRole, path: impl Into<String>, strategy: LoadStrategy) -> Self {
        ArtifactError::LoadFailed {
            role,
            path: path.into(),
            strategy,
        }
    }

    /// The role that failed to load, if this is a load failure
    pub fn role(&self) -> Option<ArtifactRole> {
        match self {
            ArtifactError::LoadFailed { role, .. } => Some(*role),
            _ => None,
        }
    }
}
