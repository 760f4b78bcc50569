//! Common test utilities and helpers
//!
//! This module provides a throwaway pair of artifact stores on disk and helpers
//! for filling them.

#![allow(dead_code)]

use ocr_artifacts_core::{ConfigRegistry, ModelVersion, PathResolver, StorageBackends};
use ocr_artifacts_core::{ArtifactLoader, ArtifactRole};
use ocr_artifacts_service::ArtifactService;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub mod fixtures;

/// A local store and a bundled asset directory under one temporary root
pub struct TestEnv {
    _dir: TempDir,
    pub local_root: PathBuf,
    pub bundled_root: PathBuf,
}

impl TestEnv {
    /// Create empty stores
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let local_root = dir.path().join("models");
        let bundled_root = dir.path().join("assets");
        std::fs::create_dir_all(&local_root).expect("Failed to create local root");
        std::fs::create_dir_all(&bundled_root).expect("Failed to create bundled root");

        Self {
            _dir: dir,
            local_root,
            bundled_root,
        }
    }

    /// Create stores with every artifact of `version` bundled
    pub fn with_bundled_version(version: &ModelVersion) -> Self {
        let env = Self::new();
        for role in ArtifactRole::ALL {
            env.write_bundled(
                version.file_name(role),
                fixtures::artifact_content(role, fixtures::BUNDLED),
            );
        }
        env
    }

    /// Write a file into the local store; returns its absolute path
    pub fn write_local(&self, key: &str, content: impl AsRef<[u8]>) -> PathBuf {
        write_file(&self.local_root.join(key), content)
    }

    /// Write a file into the bundled assets
    pub fn write_bundled(&self, key: &str, content: impl AsRef<[u8]>) -> PathBuf {
        write_file(&self.bundled_root.join(key), content)
    }

    /// Filesystem-backed stores over the two roots
    pub fn backends(&self) -> StorageBackends {
        StorageBackends::from_dirs(self.local_root.clone(), self.bundled_root.clone())
    }

    pub fn loader(&self) -> ArtifactLoader {
        ArtifactLoader::new(self.backends())
    }

    pub fn resolver(&self) -> PathResolver {
        PathResolver::new(self.backends())
    }

    /// Artifact service with a private registry
    pub fn service(&self) -> ArtifactService {
        self.service_with_registry(Arc::new(ConfigRegistry::new()))
    }

    pub fn service_with_registry(&self, registry: Arc<ConfigRegistry>) -> ArtifactService {
        ArtifactService::with_registry(self.backends(), registry)
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(path: &Path, content: impl AsRef<[u8]>) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    std::fs::write(path, content).expect("Failed to write file");
    path.to_path_buf()
}
