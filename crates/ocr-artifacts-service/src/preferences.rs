//! Persisted user preferences
//!
//! The only preference is the selected model version identifier. Reads never
//! fail: a missing or unreadable store yields [`DEFAULT_VERSION_ID`].

use ocr_artifacts_core::{ModelVersion, VersionCatalog, DEFAULT_VERSION_ID};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{ServiceError, ServiceResult};

/// Storage for the selected model version
pub trait PreferenceStore: Send + Sync {
    /// The stored version identifier, or the default when none is stored
    fn selected_version_id(&self) -> String;

    /// Persist a version identifier
    fn set_selected_version_id(&self, id: &str) -> ServiceResult<()>;

    /// The catalog entry for the stored identifier
    fn selected_version(&self) -> &'static ModelVersion {
        VersionCatalog::lookup(&self.selected_version_id())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PreferenceFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    model_version: Option<String>,
}

/// Preferences kept in a small JSON document
#[derive(Debug, Clone)]
pub struct JsonPreferenceStore {
    path: PathBuf,
}

impl JsonPreferenceStore {
    /// Create a store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> ServiceResult<PreferenceFile> {
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn selected_version_id(&self) -> String {
        if !self.path.exists() {
            return DEFAULT_VERSION_ID.to_string();
        }
        match self.read() {
            Ok(file) => file
                .model_version
                .unwrap_or_else(|| DEFAULT_VERSION_ID.to_string()),
            Err(e) => {
                warn!("Ignoring unreadable preferences at {}: {}", self.path.display(), e);
                DEFAULT_VERSION_ID.to_string()
            }
        }
    }

    fn set_selected_version_id(&self, id: &str) -> ServiceResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = PreferenceFile {
            model_version: Some(id.to_string()),
        };
        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(&self.path, json).map_err(|e| {
            ServiceError::Preferences(format!("failed to write {}: {}", self.path.display(), e))
        })?;
        debug!("Selected model version {}", id);
        Ok(())
    }
}

/// Preferences held in memory only
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    selected: RwLock<Option<String>>,
}

impl InMemoryPreferenceStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn selected_version_id(&self) -> String {
        self.selected
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .unwrap_or_else(|| DEFAULT_VERSION_ID.to_string())
    }

    fn set_selected_version_id(&self, id: &str) -> ServiceResult<()> {
        let mut guard = self
            .selected
            .write()
            .map_err(|e| ServiceError::Preferences(e.to_string()))?;
        *guard = Some(id.to_string());
        Ok(())
    }
}
