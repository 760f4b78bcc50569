//! Storage backend abstractions
//!
//! Artifacts live in one of two stores:
//!
//! - a mutable **local store** rooted at the application's model directory, which
//!   also accepts absolute paths verbatim and is where the downloader writes;
//! - a read-only **bundled store** shipped with the application, addressable by
//!   relative keys only.
//!
//! Store methods report plain `io::Result`s. Turning those into "absent" is the
//! caller's job (see [`crate::loader`]).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Cursor};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::resolver::ResolvedPath;

/// Buffered text stream returned for dictionary files
pub type TextStream = Box<dyn BufRead + Send>;

/// The two physical storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// Mutable application storage
    Local,
    /// Read-only assets bundled with the application
    Bundled,
}

impl StoreKind {
    /// Get a human-readable name for the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Local => "file",
            StoreKind::Bundled => "assets",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mutable local store, keyed by absolute path or by path relative to its root
#[cfg_attr(test, mockall::automock)]
pub trait LocalStore: Send + Sync {
    /// Whether the key names an existing, readable artifact
    fn exists(&self, key: &str) -> bool;

    /// Read the whole artifact
    fn read_bytes(&self, key: &str) -> io::Result<Vec<u8>>;

    /// Open the artifact as a buffered text stream
    fn open_text(&self, key: &str) -> io::Result<TextStream>;
}

/// Read-only bundled store, keyed by relative path only
#[cfg_attr(test, mockall::automock)]
pub trait BundledStore: Send + Sync {
    /// Whether the key names an existing artifact
    fn exists(&self, key: &str) -> bool;

    /// Read the whole artifact
    fn read_bytes(&self, key: &str) -> io::Result<Vec<u8>>;

    /// Open the artifact as a buffered text stream
    fn open_text(&self, key: &str) -> io::Result<TextStream>;
}

/// Local store backed by a directory on the filesystem
#[derive(Debug, Clone)]
pub struct FileSystemLocalStore {
    root: PathBuf,
}

impl FileSystemLocalStore {
    /// Create a store rooted at `root` (typically `<app data>/models`)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory relative keys are joined under
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a key to a filesystem address
    ///
    /// Absolute keys are used verbatim; relative keys are joined under the root.
    pub fn address(&self, key: &str) -> PathBuf {
        let path = Path::new(key);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl LocalStore for FileSystemLocalStore {
    fn exists(&self, key: &str) -> bool {
        let address = self.address(key);
        address.is_file() && File::open(&address).is_ok()
    }

    fn read_bytes(&self, key: &str) -> io::Result<Vec<u8>> {
        fs::read(self.address(key))
    }

    fn open_text(&self, key: &str) -> io::Result<TextStream> {
        let file = File::open(self.address(key))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Bundled store backed by a read-only directory of assets
#[derive(Debug, Clone)]
pub struct DirectoryBundledStore {
    root: PathBuf,
}

impl DirectoryBundledStore {
    /// Create a store serving the files under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Map a relative key to a path under the root
    ///
    /// # Errors
    /// Returns `InvalidInput` for absolute keys and for keys escaping the root
    pub fn address(&self, key: &str) -> io::Result<PathBuf> {
        let path = Path::new(key);
        if key.starts_with('/') || path.is_absolute() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("bundled assets cannot be addressed by absolute path: {}", key),
            ));
        }
        if path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("bundled asset key escapes the asset root: {}", key),
            ));
        }
        Ok(self.root.join(path))
    }
}

impl BundledStore for DirectoryBundledStore {
    fn exists(&self, key: &str) -> bool {
        self.address(key)
            .map(|address| address.is_file() && File::open(&address).is_ok())
            .unwrap_or(false)
    }

    fn read_bytes(&self, key: &str) -> io::Result<Vec<u8>> {
        fs::read(self.address(key)?)
    }

    fn open_text(&self, key: &str) -> io::Result<TextStream> {
        let file = File::open(self.address(key)?)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Bundled store holding its assets in memory
///
/// Useful for assets compiled into the binary with `include_bytes!`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBundledStore {
    entries: HashMap<String, Arc<[u8]>>,
}

impl InMemoryBundledStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an asset and return the store
    pub fn with_entry(mut self, key: impl Into<String>, bytes: impl AsRef<[u8]>) -> Self {
        self.insert(key, bytes);
        self
    }

    /// Add or replace an asset
    pub fn insert(&mut self, key: impl Into<String>, bytes: impl AsRef<[u8]>) {
        self.entries.insert(key.into(), Arc::from(bytes.as_ref()));
    }

    fn entry(&self, key: &str) -> io::Result<&Arc<[u8]>> {
        self.entries.get(key).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no bundled asset named {}", key))
        })
    }
}

impl BundledStore for InMemoryBundledStore {
    fn exists(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn read_bytes(&self, key: &str) -> io::Result<Vec<u8>> {
        Ok(self.entry(key)?.to_vec())
    }

    fn open_text(&self, key: &str) -> io::Result<TextStream> {
        let bytes = Arc::clone(self.entry(key)?);
        Ok(Box::new(Cursor::new(bytes)))
    }
}

/// The pair of stores artifacts are read from
#[derive(Clone)]
pub struct StorageBackends {
    local: Arc<dyn LocalStore>,
    bundled: Arc<dyn BundledStore>,
}

impl StorageBackends {
    /// Create from a local and a bundled store
    pub fn new(local: Arc<dyn LocalStore>, bundled: Arc<dyn BundledStore>) -> Self {
        Self { local, bundled }
    }

    /// Filesystem-backed stores rooted at the given directories
    pub fn from_dirs(local_root: impl Into<PathBuf>, bundled_root: impl Into<PathBuf>) -> Self {
        Self::new(
            Arc::new(FileSystemLocalStore::new(local_root)),
            Arc::new(DirectoryBundledStore::new(bundled_root)),
        )
    }

    /// The local store
    pub fn local(&self) -> &dyn LocalStore {
        self.local.as_ref()
    }

    /// The bundled store
    pub fn bundled(&self) -> &dyn BundledStore {
        self.bundled.as_ref()
    }

    /// Existence check against one backend, without reading content
    ///
    /// Absolute paths are never looked up in the bundled store.
    pub fn is_accessible(&self, kind: StoreKind, path: &ResolvedPath) -> bool {
        match kind {
            StoreKind::Local => self.local.exists(&path.path),
            StoreKind::Bundled => bundled_key(path)
                .map(|key| self.bundled.exists(key))
                .unwrap_or(false),
        }
    }
}

impl fmt::Debug for StorageBackends {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageBackends").finish_non_exhaustive()
    }
}

/// The key to use against the bundled store, or `None` for absolute paths
pub(crate) fn bundled_key(path: &ResolvedPath) -> Option<&str> {
    if path.is_absolute {
        None
    } else {
        Some(path.path.as_str())
    }
}
