//! Core type definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ArtifactError;
use crate::storage::StoreKind;

/// One of the four artifacts an inference engine needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArtifactRole {
    /// Text detection model
    #[serde(rename = "det")]
    Detector,
    /// Text direction classifier model
    #[serde(rename = "cls")]
    Classifier,
    /// Text recognition model
    #[serde(rename = "rec")]
    Recognizer,
    /// Character dictionary used by the recognizer
    #[serde(rename = "dict")]
    Dictionary,
}

impl ArtifactRole {
    /// All roles in resolution and reporting order
    pub const ALL: [ArtifactRole; 4] = [
        ArtifactRole::Detector,
        ArtifactRole::Classifier,
        ArtifactRole::Recognizer,
        ArtifactRole::Dictionary,
    ];

    /// Short name used in logs and messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactRole::Detector => "det",
            ArtifactRole::Classifier => "cls",
            ArtifactRole::Recognizer => "rec",
            ArtifactRole::Dictionary => "dict",
        }
    }

    /// Whether the artifact is a binary model (as opposed to the text dictionary)
    pub fn is_model(&self) -> bool {
        !matches!(self, ArtifactRole::Dictionary)
    }
}

impl fmt::Display for ArtifactRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ArtifactRole {
    type Err = ArtifactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "det" | "detector" => Ok(ArtifactRole::Detector),
            "cls" | "classifier" => Ok(ArtifactRole::Classifier),
            "rec" | "recognizer" => Ok(ArtifactRole::Recognizer),
            "dict" | "keys" | "dictionary" => Ok(ArtifactRole::Dictionary),
            _ => Err(ArtifactError::InvalidRole(s.to_string())),
        }
    }
}

/// Backend attempt order and fallback policy for loading an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStrategy {
    /// Local store first, bundled store as fallback
    #[serde(alias = "FILE_FIRST")]
    FileFirst,
    /// Bundled store first, local store as fallback
    #[serde(alias = "ASSETS_FIRST")]
    AssetsFirst,
    /// Local store only
    #[serde(alias = "FILE_ONLY")]
    FileOnly,
    /// Bundled store only
    #[serde(alias = "ASSETS_ONLY")]
    AssetsOnly,
}

impl LoadStrategy {
    /// Backends to try, in order
    pub fn attempt_order(&self) -> &'static [StoreKind] {
        match self {
            LoadStrategy::FileFirst => &[StoreKind::Local, StoreKind::Bundled],
            LoadStrategy::AssetsFirst => &[StoreKind::Bundled, StoreKind::Local],
            LoadStrategy::FileOnly => &[StoreKind::Local],
            LoadStrategy::AssetsOnly => &[StoreKind::Bundled],
        }
    }

    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStrategy::FileFirst => "FILE_FIRST",
            LoadStrategy::AssetsFirst => "ASSETS_FIRST",
            LoadStrategy::FileOnly => "FILE_ONLY",
            LoadStrategy::AssetsOnly => "ASSETS_ONLY",
        }
    }
}

impl Default for LoadStrategy {
    fn default() -> Self {
        Self::FileFirst
    }
}

impl fmt::Display for LoadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LoadStrategy {
    type Err = ArtifactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "file_first" => Ok(Self::FileFirst),
            "assets_first" => Ok(Self::AssetsFirst),
            "file_only" => Ok(Self::FileOnly),
            "assets_only" => Ok(Self::AssetsOnly),
            _ => Err(ArtifactError::InvalidStrategy(s.to_string())),
        }
    }
}

/// Which configuration tier produced a resolved path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathProvenance {
    /// Override supplied with the call
    Custom,
    /// Override taken from the process-wide default configuration
    GlobalDefault,
    /// File name defined by the model version
    VersionDefault,
}

impl fmt::Display for PathProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom => write!(f, "custom"),
            Self::GlobalDefault => write!(f, "global_default"),
            Self::VersionDefault => write!(f, "version_default"),
        }
    }
}
