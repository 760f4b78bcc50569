//! Fetching remotely hosted model artifacts
//!
//! Versions that are not bundled with the application declare source URLs
//! for their detector, recognizer and (optionally) dictionary. The
//! [`ModelDownloadService`] fetches whichever of those are missing from the
//! local models directory so that the local store can serve them afterwards.

use async_trait::async_trait;
use ocr_artifacts_core::{ArtifactRole, ModelVersion};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::{ServiceError, ServiceResult};

/// Progress callback receiving a fraction in `[0, 1]`
pub type ProgressFn<'a> = &'a (dyn Fn(f32) + Send + Sync);

const DEFAULT_TIMEOUT_SECS: u64 = 300;
const PARTIAL_SUFFIX: &str = "part";

/// Roles that may be fetched remotely, in download order
const DOWNLOADABLE_ROLES: [ArtifactRole; 3] = [
    ArtifactRole::Detector,
    ArtifactRole::Recognizer,
    ArtifactRole::Dictionary,
];

/// Transfers a remote file to a local destination
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Fetch `url` into `destination`, returning the number of bytes written
    async fn fetch(
        &self,
        url: &Url,
        destination: &Path,
        on_progress: &(dyn Fn(f32) + Send + Sync),
    ) -> ServiceResult<u64>;
}

/// HTTP downloader backed by `reqwest`
///
/// The body is streamed into `<destination>.part` and renamed into place once
/// complete, so an interrupted transfer never leaves a truncated model behind.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    /// Create a downloader with the default timeout
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a downloader with a whole-request timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    async fn stream_to(
        &self,
        url: &Url,
        partial: &Path,
        progress: &ProgressTracker<'_>,
    ) -> ServiceResult<u64> {
        let mut response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Download {
                url: url.to_string(),
                message: format!("Server returned {}", status),
            });
        }

        let total = response.content_length().filter(|len| *len > 0);
        let mut file = tokio::fs::File::create(partial).await?;
        let mut received: u64 = 0;

        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            received += chunk.len() as u64;
            if let Some(total) = total {
                progress.report(received as f32 / total as f32);
            }
        }
        file.flush().await?;

        Ok(received)
    }
}

impl Default for HttpDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    #[instrument(skip(self, on_progress), fields(url = %url))]
    async fn fetch(
        &self,
        url: &Url,
        destination: &Path,
        on_progress: &(dyn Fn(f32) + Send + Sync),
    ) -> ServiceResult<u64> {
        let partial = partial_path(destination);
        let progress = ProgressTracker::new(on_progress);

        let result = match self.stream_to(url, &partial, &progress).await {
            Ok(received) => tokio::fs::rename(&partial, destination)
                .await
                .map(|()| received)
                .map_err(ServiceError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(received) => {
                progress.report(1.0);
                debug!(bytes = received, "Saved {}", destination.display());
                Ok(received)
            }
            Err(e) => {
                remove_partial(&partial).await;
                Err(e)
            }
        }
    }
}

async fn remove_partial(partial: &Path) {
    if let Err(cleanup) = tokio::fs::remove_file(partial).await {
        debug!("No partial file to remove: {}", cleanup);
    }
}

/// Forwards progress values, clamped to `[0, 1]` and never decreasing
pub struct ProgressTracker<'a> {
    callback: ProgressFn<'a>,
    last: Mutex<f32>,
}

impl<'a> ProgressTracker<'a> {
    /// Wrap a callback
    pub fn new(callback: ProgressFn<'a>) -> Self {
        Self {
            callback,
            last: Mutex::new(0.0),
        }
    }

    /// Report a progress value; regressions and NaN are dropped
    pub fn report(&self, value: f32) {
        if value.is_nan() {
            return;
        }
        let value = value.clamp(0.0, 1.0);
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if value >= *last {
            *last = value;
            (self.callback)(value);
        }
    }
}

/// A file that still has to be fetched for a version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    /// Artifact role the file serves
    pub role: ArtifactRole,
    /// Validated source locator
    pub url: Url,
    /// Target path inside the models directory
    pub destination: PathBuf,
}

/// Result of a version download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Every declared file was already present
    AlreadyPresent,
    /// This many files were fetched
    Downloaded(usize),
}

/// Fetches the missing artifacts of a version into the models directory
#[derive(Clone)]
pub struct ModelDownloadService {
    downloader: Arc<dyn Downloader>,
    models_dir: PathBuf,
}

impl ModelDownloadService {
    /// Create a service writing into `models_dir`
    pub fn new(downloader: Arc<dyn Downloader>, models_dir: impl Into<PathBuf>) -> Self {
        Self {
            downloader,
            models_dir: models_dir.into(),
        }
    }

    /// The directory downloaded files land in
    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Files with a declared source that are missing locally, in download order
    ///
    /// # Errors
    /// Returns [`ServiceError::InvalidSource`] for a malformed source URL
    pub fn pending_files(&self, version: &ModelVersion) -> ServiceResult<Vec<PendingFile>> {
        let mut pending = Vec::new();
        for role in DOWNLOADABLE_ROLES {
            let Some(source) = version.source_url(role) else {
                continue;
            };
            let destination = self.models_dir.join(version.file_name(role));
            if destination.exists() {
                continue;
            }
            let url = Url::parse(source).map_err(|e| ServiceError::InvalidSource {
                url: source.to_string(),
                message: e.to_string(),
            })?;
            pending.push(PendingFile {
                role,
                url,
                destination,
            });
        }
        Ok(pending)
    }

    /// Download every missing file of a version
    ///
    /// Each file owns an equal slice of the overall progress range.
    #[instrument(skip(self, version, on_progress), fields(version = version.id))]
    pub async fn download_version(
        &self,
        version: &ModelVersion,
        on_progress: ProgressFn<'_>,
    ) -> ServiceResult<DownloadOutcome> {
        tokio::fs::create_dir_all(&self.models_dir).await?;

        let pending = self.pending_files(version)?;
        if pending.is_empty() {
            info!("All models for {} already exist", version.display_name);
            return Ok(DownloadOutcome::AlreadyPresent);
        }

        info!(
            "Downloading {} files for {}",
            pending.len(),
            version.display_name
        );

        let overall = ProgressTracker::new(on_progress);
        let count = pending.len() as f32;
        for (index, file) in pending.iter().enumerate() {
            let base = index as f32 / count;
            let range = 1.0 / count;
            let slice = |fraction: f32| overall.report(base + fraction.clamp(0.0, 1.0) * range);

            info!(role = %file.role, "Downloading {} from {}", file.destination.display(), file.url);
            if let Err(e) = self.downloader.fetch(&file.url, &file.destination, &slice).await {
                warn!(role = %file.role, "Failed to download models: {}", e);
                return Err(e);
            }
        }
        overall.report(1.0);

        info!("All models downloaded successfully");
        Ok(DownloadOutcome::Downloaded(pending.len()))
    }

    /// Whether a version can be served without downloading
    ///
    /// Bundled versions always can. Otherwise the detector and recognizer must
    /// exist locally, and the dictionary too when the version declares a
    /// source for it.
    pub fn is_version_downloaded(&self, version: &ModelVersion) -> bool {
        if version.is_bundled() {
            return true;
        }
        let present = |role: ArtifactRole| self.models_dir.join(version.file_name(role)).exists();

        present(ArtifactRole::Detector)
            && present(ArtifactRole::Recognizer)
            && (version.dict_source_url.is_none() || present(ArtifactRole::Dictionary))
    }
}

impl std::fmt::Debug for ModelDownloadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelDownloadService")
            .field("models_dir", &self.models_dir)
            .finish_non_exhaustive()
    }
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    destination.with_file_name(name)
}
