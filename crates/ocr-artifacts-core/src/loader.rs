//! Artifact loading with backend fallback
//!
//! Each load walks the backends in the order given by the [`LoadStrategy`].
//! A single backend attempt is a *probe*: it either yields content or comes
//! back empty. Missing files and I/O errors alike are logged and swallowed so
//! the next backend can be tried. Only when every permitted backend is empty
//! does the load fail with [`ArtifactError::LoadFailed`].

use std::io;
use tracing::{debug, info, instrument, warn};

use crate::error::{ArtifactError, Result};
use crate::resolver::ResolvedPath;
use crate::storage::{bundled_key, StorageBackends, StoreKind, TextStream};
use crate::types::{ArtifactRole, LoadStrategy};

/// Loads artifact content from the local and bundled stores
#[derive(Debug, Clone)]
pub struct ArtifactLoader {
    backends: StorageBackends,
}

impl ArtifactLoader {
    /// Create a loader over the given stores
    pub fn new(backends: StorageBackends) -> Self {
        Self { backends }
    }

    /// Load a model file as raw bytes
    ///
    /// # Errors
    /// Returns [`ArtifactError::LoadFailed`] when no permitted backend holds the file
    #[instrument(skip(self, path), fields(path = %path.path))]
    pub fn load_bytes(
        &self,
        role: ArtifactRole,
        path: &ResolvedPath,
        strategy: LoadStrategy,
    ) -> Result<Vec<u8>> {
        self.load_with(
            role,
            path,
            strategy,
            |key| self.backends.local().read_bytes(key),
            |key| self.backends.bundled().read_bytes(key),
        )
    }

    /// Open a text artifact (the dictionary) as a buffered stream
    ///
    /// # Errors
    /// Returns [`ArtifactError::LoadFailed`] when no permitted backend holds the file
    #[instrument(skip(self, path), fields(path = %path.path))]
    pub fn load_text(
        &self,
        role: ArtifactRole,
        path: &ResolvedPath,
        strategy: LoadStrategy,
    ) -> Result<TextStream> {
        self.load_with(
            role,
            path,
            strategy,
            |key| self.backends.local().open_text(key),
            |key| self.backends.bundled().open_text(key),
        )
    }

    fn load_with<T>(
        &self,
        role: ArtifactRole,
        path: &ResolvedPath,
        strategy: LoadStrategy,
        read_local: impl Fn(&str) -> io::Result<T>,
        read_bundled: impl Fn(&str) -> io::Result<T>,
    ) -> Result<T> {
        info!("Loading {} from {} with strategy {}", role, path.path, strategy);

        for kind in strategy.attempt_order() {
            let content = match kind {
                StoreKind::Local => self.probe_local(role, path, &read_local),
                StoreKind::Bundled => self.probe_bundled(role, path, &read_bundled),
            };
            if let Some(content) = content {
                info!("Loaded {} from {}: {}", role, kind, path.path);
                return Ok(content);
            }
        }

        warn!("No source yielded {} at {} with strategy {}", role, path.path, strategy);
        Err(ArtifactError::load_failed(role, path.path.clone(), strategy))
    }

    /// Attempt the local store; absent if the file is missing or unreadable
    fn probe_local<T>(
        &self,
        role: ArtifactRole,
        path: &ResolvedPath,
        read: &impl Fn(&str) -> io::Result<T>,
    ) -> Option<T> {
        if !self.backends.local().exists(&path.path) {
            debug!("{} not found in local store: {}", role, path.path);
            return None;
        }
        swallow(role, StoreKind::Local, &path.path, read(&path.path))
    }

    /// Attempt the bundled store; absent for absolute paths without any access
    fn probe_bundled<T>(
        &self,
        role: ArtifactRole,
        path: &ResolvedPath,
        read: &impl Fn(&str) -> io::Result<T>,
    ) -> Option<T> {
        let Some(key) = bundled_key(path) else {
            debug!("Cannot load absolute path from bundled assets: {}", path.path);
            return None;
        };
        swallow(role, StoreKind::Bundled, key, read(key))
    }
}

fn swallow<T>(role: ArtifactRole, kind: StoreKind, key: &str, result: io::Result<T>) -> Option<T> {
    match result {
        Ok(content) => Some(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("{} not found in {} store: {}", role, kind, key);
            None
        }
        Err(e) => {
            warn!("Failed to load {} from {} store ({}): {}", role, kind, key, e);
            None
        }
    }
}
