//! Download, verify, extract and normalize a component archive.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::archive::ArchiveExtractor;
use crate::component::Component;
use crate::error::{ComponentError, ComponentResult, LoadingError};
use crate::fs::FileSystem;
use crate::hash_utils::{checksum_matches, sha256_base64};
use crate::paths::ComponentPaths;
use crate::registry::FeatureRegistry;
use crate::validation::validate_identifier;

/// Result of an install attempt that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Archive fetched, verified and unpacked
    Installed,
    /// Installed version is current; nothing was fetched
    UpToDate,
    /// Attempt ended with one of the loading errors
    Failed(LoadingError),
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, DownloadOutcome::Failed(_))
    }

    pub fn error(&self) -> Option<LoadingError> {
        match self {
            DownloadOutcome::Failed(e) => Some(*e),
            _ => None,
        }
    }
}

/// Download URL for a component: the registry wins over the item's own.
pub fn resolve_download_url(registry: &FeatureRegistry, component: &Component) -> Option<String> {
    registry
        .find(&component.identifier)
        .map(|d| d.download_url.clone())
        .or_else(|| component.package_info.download_url.clone())
        .filter(|url| !url.is_empty())
}

/// Latest known version: the registry wins over the item's own.
pub fn resolve_latest_version(registry: &FeatureRegistry, component: &Component) -> Option<String> {
    registry
        .find(&component.identifier)
        .map(|d| d.version.clone())
        .or_else(|| component.package_info.version.clone())
}

pub struct DownloadPipeline {
    fs: Arc<dyn FileSystem>,
    extractor: Arc<dyn ArchiveExtractor>,
    registry: Arc<FeatureRegistry>,
    paths: Arc<ComponentPaths>,
    download_dir: PathBuf,
    in_flight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl DownloadPipeline {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        extractor: Arc<dyn ArchiveExtractor>,
        registry: Arc<FeatureRegistry>,
        paths: Arc<ComponentPaths>,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fs,
            extractor,
            registry,
            paths,
            download_dir: download_dir.into(),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Fixed per-identifier location of the downloaded archive.
    pub fn temp_archive_path(&self, identifier: &str) -> PathBuf {
        self.download_dir.join(format!("{identifier}.zip"))
    }

    /// Fetch, verify and install `component`.
    ///
    /// A missing download URL or an unusable identifier is returned as `Err`.
    /// Every other failure becomes [`DownloadOutcome::Failed`]. Downloads of
    /// the same identifier are serialized.
    pub async fn download_component_offline(
        &self,
        component: &Component,
    ) -> ComponentResult<DownloadOutcome> {
        let identifier = component.identifier.as_str();
        validate_identifier(identifier)?;
        let url = resolve_download_url(&self.registry, component).ok_or_else(|| {
            ComponentError::MissingDownloadUrl {
                identifier: identifier.to_string(),
            }
        })?;

        let lock = self.lock_for(identifier);
        let _guard = lock.lock().await;

        info!(identifier = %identifier, url = %url, "Downloading component");
        match self.run(identifier, &url).await {
            Ok(outcome) => {
                match outcome {
                    DownloadOutcome::Failed(error) => {
                        warn!(identifier = %identifier, error = %error, "Component download failed")
                    }
                    _ => info!(identifier = %identifier, "Component installed"),
                }
                Ok(outcome)
            }
            Err(e) => {
                warn!(identifier = %identifier, error = %e, "Unexpected error while installing component");
                self.discard_partial(identifier).await;
                Ok(DownloadOutcome::Failed(LoadingError::Unknown))
            }
        }
    }

    async fn run(&self, identifier: &str, url: &str) -> ComponentResult<DownloadOutcome> {
        let temp_path = self.temp_archive_path(identifier);
        if self.fs.exists(&temp_path).await {
            debug!(path = %temp_path.display(), "Removing stale archive");
            self.fs.unlink(&temp_path).await?;
        }

        let result = self.fs.download_file(url, &temp_path).await?;
        if !result.is_success() {
            self.fs.unlink(&temp_path).await?;
            return Ok(DownloadOutcome::Failed(LoadingError::FailedDownload));
        }

        if self.registry.contains(identifier) {
            let contents = self.fs.read_file_base64(&temp_path).await?;
            let actual = sha256_base64(&contents);
            let expected = self.registry.expected_checksum(identifier);
            if !checksum_matches(expected, &actual) {
                warn!(
                    identifier = %identifier,
                    expected = ?expected,
                    actual = %actual,
                    "Checksum mismatch; archive discarded"
                );
                self.fs.unlink(&temp_path).await?;
                return Ok(DownloadOutcome::Failed(LoadingError::ChecksumMismatch));
            }
            debug!(identifier = %identifier, "Checksum verified");
        }

        // Extract beside the install directory and swap it in only once the
        // whole archive unpacked, so a failure never leaves a partial install.
        let install_dir = self.paths.path_for_component(identifier);
        let extract_dir = extraction_path(&install_dir);
        self.fs.unlink(&extract_dir).await?;
        self.extractor.unzip(&temp_path, &extract_dir).await?;
        self.normalize_layout(&extract_dir).await?;
        self.fs.unlink(&temp_path).await?;

        if !self.fs.exists(&extract_dir).await {
            return Ok(DownloadOutcome::Failed(LoadingError::DoesntExist));
        }

        self.fs.unlink(&install_dir).await?;
        self.fs.move_file(&extract_dir, &install_dir).await?;
        self.paths.forget(identifier);

        if !self.fs.exists(&install_dir).await {
            return Ok(DownloadOutcome::Failed(LoadingError::DoesntExist));
        }

        Ok(DownloadOutcome::Installed)
    }

    /// Remove everything a failed attempt may have left behind. The install
    /// directory itself is only touched by the final swap, which leaves it
    /// either replaced or absent.
    async fn discard_partial(&self, identifier: &str) {
        let install_dir = self.paths.path_for_component(identifier);
        let extract_dir = extraction_path(&install_dir);
        let leftovers = [
            self.temp_archive_path(identifier),
            staging_path(&extract_dir),
            extract_dir,
        ];
        for path in &leftovers {
            if let Err(e) = self.fs.unlink(path).await {
                warn!(path = %path.display(), error = %e, "Failed to remove leftover from failed install");
            }
        }
    }

    /// Hoist a lone wrapper directory so the install directory holds the
    /// component's own files. Returns whether anything moved.
    pub async fn normalize_layout(&self, install_dir: &Path) -> ComponentResult<bool> {
        if !self.fs.exists(install_dir).await {
            return Ok(false);
        }

        let entries = self.fs.read_dir(install_dir).await?;
        let [only] = entries.as_slice() else {
            return Ok(false);
        };
        if !only.is_directory {
            return Ok(false);
        }

        let staging = staging_path(install_dir);
        self.fs.unlink(&staging).await?;
        self.fs.move_file(&only.path, &staging).await?;
        self.fs.unlink(install_dir).await?;
        self.fs.move_file(&staging, install_dir).await?;

        debug!(
            wrapper = %only.path.display(),
            install_dir = %install_dir.display(),
            "Hoisted wrapper directory"
        );
        Ok(true)
    }

    fn lock_for(&self, identifier: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        in_flight
            .entry(identifier.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

fn extraction_path(install_dir: &Path) -> PathBuf {
    hidden_sibling(install_dir, "extracting")
}

fn staging_path(install_dir: &Path) -> PathBuf {
    hidden_sibling(install_dir, "normalizing")
}

fn hidden_sibling(install_dir: &Path, suffix: &str) -> PathBuf {
    let name = install_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    install_dir.with_file_name(format!(".{name}.{suffix}"))
}
