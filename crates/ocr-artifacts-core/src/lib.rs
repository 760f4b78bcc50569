//! Core types and logic for resolving and loading OCR model artifacts
//!
//! An inference engine needs four artifacts per model version: a detector, a
//! classifier and a recognizer model, plus a character dictionary. This crate
//! decides where each one comes from and reads it:
//!
//! - [`VersionCatalog`] maps version identifiers to default file names;
//! - [`PathResolver`] merges per-call overrides, the process-wide default
//!   configuration held by [`ConfigRegistry`] and the version defaults into a
//!   [`ResolvedPathSet`], and validates it against the stores;
//! - [`ArtifactLoader`] reads each artifact from the local or bundled store in
//!   the order a [`LoadStrategy`] prescribes.

pub mod catalog;
pub mod config;
pub mod error;
pub mod loader;
pub mod registry;
pub mod resolver;
pub mod storage;
pub mod types;

// Re-exports for convenience
pub use catalog::{ModelVersion, VersionCatalog, DEFAULT_VERSION_ID};
pub use config::{EngineConfig, PathOverrides};
pub use error::{ArtifactError, Result};
pub use loader::ArtifactLoader;
pub use registry::ConfigRegistry;
pub use resolver::{
    LayeredResolution, PathResolver, ResolvedPath, ResolvedPathSet, RoleFailure, ValidationResult,
};
pub use storage::{
    BundledStore, DirectoryBundledStore, FileSystemLocalStore, InMemoryBundledStore, LocalStore,
    StorageBackends, StoreKind, TextStream,
};
pub use types::{ArtifactRole, LoadStrategy, PathProvenance};
