//! Engine configuration values
//!
//! Plain immutable values: construct them with struct literals or the
//! `with_*` methods and hand them to the resolver or the [`ConfigRegistry`].
//!
//! Paths may be absolute (starting with `/`, used verbatim against the local
//! store and never looked up among bundled assets) or relative to the model
//! directory of the local store and to the root of the bundled assets.
//!
//! [`ConfigRegistry`]: crate::registry::ConfigRegistry

use serde::{Deserialize, Serialize};

use crate::catalog::ModelVersion;
use crate::types::{ArtifactRole, LoadStrategy};

/// Optional per-role path overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathOverrides {
    /// Detector model path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub det: Option<String>,
    /// Classifier model path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cls: Option<String>,
    /// Recognizer model path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rec: Option<String>,
    /// Dictionary path
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "keys")]
    pub dict: Option<String>,
}

impl PathOverrides {
    /// Create an empty override set
    pub fn new() -> Self {
        Self::default()
    }

    /// Override every role with `base_dir/<name>`
    ///
    /// Trailing `/` characters on `base_dir` are stripped before joining.
    pub fn all_paths(
        base_dir: &str,
        det_name: &str,
        cls_name: &str,
        rec_name: &str,
        dict_name: &str,
    ) -> Self {
        let base = base_dir.trim_end_matches('/');
        Self {
            det: Some(format!("{}/{}", base, det_name)),
            cls: Some(format!("{}/{}", base, cls_name)),
            rec: Some(format!("{}/{}", base, rec_name)),
            dict: Some(format!("{}/{}", base, dict_name)),
        }
    }

    /// Override every role with the version's file names placed under `base_dir`
    pub fn from_version(base_dir: &str, version: &ModelVersion) -> Self {
        Self::all_paths(
            base_dir,
            version.det_name,
            version.cls_name,
            version.rec_name,
            version.dict_name,
        )
    }

    /// Set the override for a role
    pub fn with(mut self, role: ArtifactRole, path: impl Into<String>) -> Self {
        *self.slot_mut(role) = Some(path.into());
        self
    }

    /// Set the detector override
    pub fn with_det(self, path: impl Into<String>) -> Self {
        self.with(ArtifactRole::Detector, path)
    }

    /// Set the classifier override
    pub fn with_cls(self, path: impl Into<String>) -> Self {
        self.with(ArtifactRole::Classifier, path)
    }

    /// Set the recognizer override
    pub fn with_rec(self, path: impl Into<String>) -> Self {
        self.with(ArtifactRole::Recognizer, path)
    }

    /// Set the dictionary override
    pub fn with_dict(self, path: impl Into<String>) -> Self {
        self.with(ArtifactRole::Dictionary, path)
    }

    /// The raw override for a role, exactly as supplied
    pub fn raw(&self, role: ArtifactRole) -> Option<&str> {
        match role {
            ArtifactRole::Detector => self.det.as_deref(),
            ArtifactRole::Classifier => self.cls.as_deref(),
            ArtifactRole::Recognizer => self.rec.as_deref(),
            ArtifactRole::Dictionary => self.dict.as_deref(),
        }
    }

    /// The effective override for a role
    ///
    /// Empty and whitespace-only values count as absent.
    pub fn get(&self, role: ArtifactRole) -> Option<&str> {
        self.raw(role).filter(|path| !path.trim().is_empty())
    }

    /// True when no role carries an effective override
    pub fn is_empty(&self) -> bool {
        ArtifactRole::ALL.iter().all(|role| self.get(*role).is_none())
    }

    fn slot_mut(&mut self, role: ArtifactRole) -> &mut Option<String> {
        match role {
            ArtifactRole::Detector => &mut self.det,
            ArtifactRole::Classifier => &mut self.cls,
            ArtifactRole::Recognizer => &mut self.rec,
            ArtifactRole::Dictionary => &mut self.dict,
        }
    }
}

/// Configuration for constructing an inference engine's artifact set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Path overrides; `None` uses the version's default names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_overrides: Option<PathOverrides>,

    /// Backend attempt order
    #[serde(default)]
    pub load_strategy: LoadStrategy,
}

impl EngineConfig {
    /// Create a configuration with default paths and `FileFirst` loading
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path overrides
    pub fn with_path_overrides(mut self, overrides: PathOverrides) -> Self {
        self.path_overrides = Some(overrides);
        self
    }

    /// Set the load strategy
    pub fn with_load_strategy(mut self, strategy: LoadStrategy) -> Self {
        self.load_strategy = strategy;
        self
    }

    /// The effective override for a role, if any
    pub fn path_override(&self, role: ArtifactRole) -> Option<&str> {
        self.path_overrides
            .as_ref()
            .and_then(|overrides| overrides.get(role))
    }
}
