//! Service layer for OCR model artifacts
//!
//! This crate sits between the core resolution logic and the command-line
//! front end. It assembles engine artifacts and hosts the collaborators the
//! core leaves out.
//!
//! # Architecture
//!
//! - **ArtifactService**: resolve, validate and load a version's four artifacts
//! - **ModelDownloadService**: fetch remotely hosted models into the local store
//! - **PreferenceStore**: persist the selected model version
//!
//! # Example
//!
//! ```rust,no_run
//! use ocr_artifacts_core::StorageBackends;
//! use ocr_artifacts_service::{ArtifactService, JsonPreferenceStore, PreferenceStore};
//!
//! # fn example() -> ocr_artifacts_service::ServiceResult<()> {
//! let service = ArtifactService::new(StorageBackends::from_dirs("data/models", "assets"));
//! let preferences = JsonPreferenceStore::new("data/preferences.json");
//!
//! let plan = service.resolve(&preferences.selected_version_id(), None);
//! if service.validate(&plan).is_success() {
//!     let artifacts = service.load(&plan)?;
//!     println!("{} dictionary entries", artifacts.dictionary.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod downloader;
pub mod error;
pub mod preferences;

pub use artifacts::{read_dictionary, ArtifactService, EngineArtifacts, ResolutionPlan};
pub use downloader::{
    DownloadOutcome, Downloader, HttpDownloader, ModelDownloadService, PendingFile,
    ProgressFn, ProgressTracker,
};
pub use error::{ServiceError, ServiceResult};
pub use preferences::{InMemoryPreferenceStore, JsonPreferenceStore, PreferenceStore};

use ocr_artifacts_core::{ConfigRegistry, StorageBackends};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Service registry that holds all service instances
///
/// Front ends build one of these at startup and hand out references.
#[derive(Clone)]
pub struct ServiceRegistry {
    /// Artifact resolution and loading
    pub artifacts: ArtifactService,
    /// Remote model downloads
    pub downloads: ModelDownloadService,
    /// Selected-version persistence
    pub preferences: Arc<dyn PreferenceStore>,
}

impl ServiceRegistry {
    /// Create a registry over filesystem stores with the default collaborators
    ///
    /// Downloads land in `local_root`, which is also the local store's root.
    pub fn new(
        local_root: impl Into<PathBuf>,
        bundled_root: impl Into<PathBuf>,
        preferences_path: impl Into<PathBuf>,
        download_timeout: Duration,
        registry: Arc<ConfigRegistry>,
    ) -> Self {
        let local_root = local_root.into();
        let backends = StorageBackends::from_dirs(local_root.clone(), bundled_root);
        let downloader = HttpDownloader::with_timeout(download_timeout);

        Self {
            artifacts: ArtifactService::with_registry(backends, registry),
            downloads: ModelDownloadService::new(Arc::new(downloader), local_root),
            preferences: Arc::new(JsonPreferenceStore::new(preferences_path)),
        }
    }

    /// Create a registry with custom implementations
    pub fn with_services(
        artifacts: ArtifactService,
        downloads: ModelDownloadService,
        preferences: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self {
            artifacts,
            downloads,
            preferences,
        }
    }

    /// Get the artifact service
    pub fn artifacts(&self) -> &ArtifactService {
        &self.artifacts
    }

    /// Get the download service
    pub fn downloads(&self) -> &ModelDownloadService {
        &self.downloads
    }

    /// Get the preference store
    pub fn preferences(&self) -> &Arc<dyn PreferenceStore> {
        &self.preferences
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_service_registry_wiring() {
        let dir = TempDir::new().unwrap();
        let services = ServiceRegistry::new(
            dir.path().join("models"),
            dir.path().join("assets"),
            dir.path().join("prefs.json"),
            Duration::from_secs(30),
            Arc::new(ConfigRegistry::new()),
        );

        assert_eq!(services.downloads().models_dir(), dir.path().join("models"));
        assert_eq!(services.preferences().selected_version_id(), "V3");
        assert!(!services.artifacts().registry().has());
    }
}
