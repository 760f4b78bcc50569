//! Model path resolution and validation
//!
//! Precedence for each role, highest first:
//!
//! 1. the configuration supplied with the call ([`PathProvenance::Custom`]);
//! 2. the process-wide default configuration ([`PathProvenance::GlobalDefault`]);
//! 3. the file name defined by the model version ([`PathProvenance::VersionDefault`]).
//!
//! Roles are resolved independently, so a call may override the detector while
//! the registry supplies the dictionary and the version supplies the rest.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::ModelVersion;
use crate::config::{EngineConfig, PathOverrides};
use crate::storage::StorageBackends;
use crate::types::{ArtifactRole, LoadStrategy, PathProvenance};

/// Leading character of an absolute path
pub const ROOT_SEPARATOR: char = '/';

/// A single resolved artifact path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedPath {
    /// Absolute path or path relative to the store roots
    pub path: String,
    /// True iff `path` starts with the root separator
    pub is_absolute: bool,
    /// Configuration tier the path came from
    pub provenance: PathProvenance,
}

impl ResolvedPath {
    /// Create a resolved path, deriving `is_absolute` from the path
    pub fn new(path: impl Into<String>, provenance: PathProvenance) -> Self {
        let path = path.into();
        let is_absolute = path.starts_with(ROOT_SEPARATOR);
        Self {
            path,
            is_absolute,
            provenance,
        }
    }
}

/// Resolved paths for all four roles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPathSet {
    /// Detector model
    pub det: ResolvedPath,
    /// Classifier model
    pub cls: ResolvedPath,
    /// Recognizer model
    pub rec: ResolvedPath,
    /// Dictionary
    pub dict: ResolvedPath,
}

impl ResolvedPathSet {
    /// The resolved path for a role
    pub fn get(&self, role: ArtifactRole) -> &ResolvedPath {
        match role {
            ArtifactRole::Detector => &self.det,
            ArtifactRole::Classifier => &self.cls,
            ArtifactRole::Recognizer => &self.rec,
            ArtifactRole::Dictionary => &self.dict,
        }
    }

    /// All entries in role order (det, cls, rec, dict)
    pub fn iter(&self) -> impl Iterator<Item = (ArtifactRole, &ResolvedPath)> {
        ArtifactRole::ALL.into_iter().map(move |role| (role, self.get(role)))
    }
}

/// Accessibility failure for one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleFailure {
    /// The role that cannot be loaded
    pub role: ArtifactRole,
    /// Human-readable reason
    pub message: String,
}

/// Outcome of validating a resolved path set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "errors", rename_all = "snake_case")]
pub enum ValidationResult {
    /// Every role is loadable under the strategy
    Success,
    /// Failing roles, in role order
    Error(Vec<RoleFailure>),
}

impl ValidationResult {
    /// Whether validation passed
    pub fn is_success(&self) -> bool {
        matches!(self, ValidationResult::Success)
    }

    /// The failures; empty on success
    pub fn failures(&self) -> &[RoleFailure] {
        match self {
            ValidationResult::Success => &[],
            ValidationResult::Error(failures) => failures,
        }
    }
}

/// Resolution that also settled which load strategy applies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayeredResolution {
    /// The resolved paths
    pub paths: ResolvedPathSet,
    /// The effective strategy
    pub strategy: LoadStrategy,
}

/// Resolves and validates model paths
#[derive(Debug, Clone)]
pub struct PathResolver {
    backends: StorageBackends,
}

impl PathResolver {
    /// Create a resolver validating against the given stores
    pub fn new(backends: StorageBackends) -> Self {
        Self { backends }
    }

    /// Merge per-call overrides with the version's default names
    ///
    /// Non-blank overrides win and are tagged [`PathProvenance::Custom`]; every
    /// other role falls back to the version default. Pure, performs no I/O.
    pub fn resolve(overrides: Option<&PathOverrides>, version: &ModelVersion) -> ResolvedPathSet {
        info!("Resolving model paths for version {}", version.display_name);
        Self::resolve_tiers(version, |role| {
            overrides
                .and_then(|o| o.get(role))
                .map(|path| (path, PathProvenance::Custom))
        })
    }

    /// Merge a per-call config, the global default config and the version defaults
    ///
    /// The effective strategy is the per-call config's when one is given, else
    /// the global config's, else [`LoadStrategy::FileFirst`].
    pub fn resolve_layered(
        instance: Option<&EngineConfig>,
        global: Option<&EngineConfig>,
        version: &ModelVersion,
    ) -> LayeredResolution {
        info!(
            has_instance = instance.is_some(),
            has_global = global.is_some(),
            "Resolving model paths for version {}",
            version.display_name
        );

        let paths = Self::resolve_tiers(version, |role| {
            instance
                .and_then(|c| c.path_override(role))
                .map(|path| (path, PathProvenance::Custom))
                .or_else(|| {
                    global
                        .and_then(|c| c.path_override(role))
                        .map(|path| (path, PathProvenance::GlobalDefault))
                })
        });

        let strategy = instance
            .or(global)
            .map(|c| c.load_strategy)
            .unwrap_or_default();

        LayeredResolution { paths, strategy }
    }

    fn resolve_tiers<'a>(
        version: &ModelVersion,
        pick: impl Fn(ArtifactRole) -> Option<(&'a str, PathProvenance)>,
    ) -> ResolvedPathSet {
        let resolve_one = |role: ArtifactRole| {
            let resolved = match pick(role) {
                Some((path, provenance)) => ResolvedPath::new(path, provenance),
                None => ResolvedPath {
                    path: version.file_name(role).to_string(),
                    is_absolute: false,
                    provenance: PathProvenance::VersionDefault,
                },
            };
            debug!(
                role = %role,
                path = %resolved.path,
                absolute = resolved.is_absolute,
                source = %resolved.provenance,
                "Resolved path"
            );
            resolved
        };

        ResolvedPathSet {
            det: resolve_one(ArtifactRole::Detector),
            cls: resolve_one(ArtifactRole::Classifier),
            rec: resolve_one(ArtifactRole::Recognizer),
            dict: resolve_one(ArtifactRole::Dictionary),
        }
    }

    /// Check that every role is loadable under the strategy
    ///
    /// Only existence is checked; no content is read. All roles are checked and
    /// every failing one is reported.
    pub fn validate(&self, paths: &ResolvedPathSet, strategy: LoadStrategy) -> ValidationResult {
        info!("Validating model paths with strategy {}", strategy);

        let failures: Vec<RoleFailure> = paths
            .iter()
            .filter_map(|(role, resolved)| {
                if self.can_load(resolved, strategy) {
                    debug!("Validated {} path: {}", role, resolved.path);
                    None
                } else {
                    let message = format!(
                        "Cannot load {} from {} with strategy {}",
                        role, resolved.path, strategy
                    );
                    warn!("{}", message);
                    Some(RoleFailure { role, message })
                }
            })
            .collect();

        if failures.is_empty() {
            ValidationResult::Success
        } else {
            ValidationResult::Error(failures)
        }
    }

    /// Whether any backend the strategy permits holds the artifact
    pub fn can_load(&self, path: &ResolvedPath, strategy: LoadStrategy) -> bool {
        strategy
            .attempt_order()
            .iter()
            .any(|kind| self.backends.is_accessible(*kind, path))
    }
}
