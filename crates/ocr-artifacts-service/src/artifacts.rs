//! Engine artifact assembly
//!
//! This module is the caller of the core resolution and loading operations:
//! it picks the model version, reads the process-wide default configuration
//! once, resolves the four paths and loads them into an [`EngineArtifacts`]
//! value an inference engine can be constructed from.

use ocr_artifacts_core::{
    ArtifactLoader, ArtifactRole, ConfigRegistry, EngineConfig, LoadStrategy, ModelVersion,
    PathResolver, ResolvedPathSet, StorageBackends, TextStream, ValidationResult, VersionCatalog,
};
use serde::Serialize;
use std::io::BufRead;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::error::{ServiceError, ServiceResult};

/// Everything needed to load one version's artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionPlan {
    /// The model version being loaded
    pub version: &'static ModelVersion,
    /// Resolved paths for the four roles
    pub paths: ResolvedPathSet,
    /// Effective load strategy
    pub strategy: LoadStrategy,
}

/// Loaded artifacts, ready for engine construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineArtifacts {
    /// Identifier of the version the artifacts belong to
    pub version_id: &'static str,
    /// Detector model bytes
    pub detector: Vec<u8>,
    /// Classifier model bytes
    pub classifier: Vec<u8>,
    /// Recognizer model bytes
    pub recognizer: Vec<u8>,
    /// Dictionary entries, one per line
    pub dictionary: Vec<String>,
}

impl EngineArtifacts {
    /// Total size of the three models in bytes
    pub fn model_bytes(&self) -> usize {
        self.detector.len() + self.classifier.len() + self.recognizer.len()
    }
}

/// Resolves, validates and loads engine artifacts
#[derive(Debug, Clone)]
pub struct ArtifactService {
    resolver: PathResolver,
    loader: ArtifactLoader,
    registry: Arc<ConfigRegistry>,
}

impl ArtifactService {
    /// Create a service over the given stores, using the process-wide registry
    pub fn new(backends: StorageBackends) -> Self {
        Self::with_registry(backends, ConfigRegistry::global())
    }

    /// Create a service with an explicit default-configuration registry
    pub fn with_registry(backends: StorageBackends, registry: Arc<ConfigRegistry>) -> Self {
        Self {
            resolver: PathResolver::new(backends.clone()),
            loader: ArtifactLoader::new(backends),
            registry,
        }
    }

    /// The registry consulted for the default configuration
    pub fn registry(&self) -> &Arc<ConfigRegistry> {
        &self.registry
    }

    /// Resolve paths and strategy for a version
    ///
    /// Unknown version identifiers resolve to the default version. The
    /// registry is read exactly once.
    #[instrument(skip(self, instance))]
    pub fn resolve(&self, version_id: &str, instance: Option<&EngineConfig>) -> ResolutionPlan {
        let version = VersionCatalog::lookup(version_id);
        if version.id != version_id {
            debug!("Unknown version {:?}, using {}", version_id, version.id);
        }

        let global = self.registry.snapshot();
        let resolution = PathResolver::resolve_layered(instance, global.as_deref(), version);

        ResolutionPlan {
            version,
            paths: resolution.paths,
            strategy: resolution.strategy,
        }
    }

    /// Check that every artifact of the plan can be loaded
    pub fn validate(&self, plan: &ResolutionPlan) -> ValidationResult {
        self.resolver.validate(&plan.paths, plan.strategy)
    }

    /// Load all four artifacts of the plan, in role order
    ///
    /// # Errors
    /// Fails with the first role that no permitted backend can supply
    #[instrument(skip(self, plan), fields(version = plan.version.id, strategy = %plan.strategy))]
    pub fn load(&self, plan: &ResolutionPlan) -> ServiceResult<EngineArtifacts> {
        let load_model = |role: ArtifactRole| {
            self.loader
                .load_bytes(role, plan.paths.get(role), plan.strategy)
        };

        let detector = load_model(ArtifactRole::Detector)?;
        let classifier = load_model(ArtifactRole::Classifier)?;
        let recognizer = load_model(ArtifactRole::Recognizer)?;
        let stream = self.loader.load_text(
            ArtifactRole::Dictionary,
            plan.paths.get(ArtifactRole::Dictionary),
            plan.strategy,
        )?;
        let dictionary = read_dictionary(stream)?;

        let artifacts = EngineArtifacts {
            version_id: plan.version.id,
            detector,
            classifier,
            recognizer,
            dictionary,
        };
        info!(
            model_bytes = artifacts.model_bytes(),
            dictionary_entries = artifacts.dictionary.len(),
            "Loaded artifacts for {}",
            plan.version.display_name
        );
        Ok(artifacts)
    }

    /// Resolve and load in one step
    pub fn load_version(
        &self,
        version_id: &str,
        instance: Option<&EngineConfig>,
    ) -> ServiceResult<EngineArtifacts> {
        let plan = self.resolve(version_id, instance);
        self.load(&plan)
    }
}

/// Read dictionary entries, one per line
///
/// Windows line endings are tolerated; a trailing empty line is not an entry.
pub fn read_dictionary(stream: TextStream) -> ServiceResult<Vec<String>> {
    let mut entries = Vec::new();
    for line in stream.lines() {
        let mut line = line.map_err(|e| ServiceError::ArtifactRead {
            role: ArtifactRole::Dictionary,
            message: e.to_string(),
        })?;
        if line.ends_with('\r') {
            line.pop();
        }
        entries.push(line);
    }
    if entries.last().is_some_and(|l| l.is_empty()) {
        entries.pop();
    }
    Ok(entries)
}
