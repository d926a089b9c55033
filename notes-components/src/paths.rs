//! Install locations and entry points for components.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::error::{ComponentError, ComponentResult};
use crate::fs::FileSystem;
use crate::manifest::read_manifest;
use crate::registry::FeatureRegistry;
use crate::validation::{validate_identifier, validate_index_path};

/// Resolves install directories and entry-point paths.
///
/// First-party entry points come straight from the registry. Third-party
/// entry points live in each component's manifest and must be loaded with
/// [`ComponentPaths::preload_third_party_index_path`] before they can be
/// resolved synchronously.
pub struct ComponentPaths {
    components_dir: PathBuf,
    registry: Arc<FeatureRegistry>,
    third_party_index: Mutex<HashMap<String, String>>,
}

impl ComponentPaths {
    pub fn new(components_dir: impl Into<PathBuf>, registry: Arc<FeatureRegistry>) -> Self {
        Self {
            components_dir: components_dir.into(),
            registry,
            third_party_index: Mutex::new(HashMap::new()),
        }
    }

    pub fn components_dir(&self) -> &Path {
        &self.components_dir
    }

    pub fn is_third_party(&self, identifier: &str) -> bool {
        !self.registry.contains(identifier)
    }

    /// `<components_dir>/<identifier>`. No I/O.
    pub fn path_for_component(&self, identifier: &str) -> PathBuf {
        self.components_dir.join(identifier)
    }

    /// Install directory relative to the served root, with `/` separators.
    pub fn relative_install_path(&self, identifier: &str) -> String {
        let absolute = self.path_for_component(identifier);
        let relative = pathdiff::diff_paths(&absolute, &self.components_dir)
            .unwrap_or_else(|| PathBuf::from(identifier));
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Entry point relative to the install directory.
    pub fn index_file_relative_path(&self, identifier: &str) -> ComponentResult<String> {
        if let Some(descriptor) = self.registry.find(identifier) {
            return Ok(descriptor.index_path.clone());
        }

        self.lock_index()
            .get(identifier)
            .cloned()
            .ok_or_else(|| ComponentError::IndexPathNotPreloaded {
                identifier: identifier.to_string(),
            })
    }

    /// Read a third-party manifest and cache its entry point.
    pub async fn preload_third_party_index_path(
        &self,
        fs: &dyn FileSystem,
        identifier: &str,
    ) -> ComponentResult<String> {
        validate_identifier(identifier)?;
        let manifest = read_manifest(fs, &self.path_for_component(identifier)).await?;
        let index_path = manifest.index_path().to_string();
        validate_index_path(identifier, &index_path)?;

        debug!(identifier = %identifier, index_path = %index_path, "Cached third-party entry point");
        self.lock_index()
            .insert(identifier.to_string(), index_path.clone());
        Ok(index_path)
    }

    pub fn is_index_path_cached(&self, identifier: &str) -> bool {
        self.lock_index().contains_key(identifier)
    }

    /// Drop a cached third-party entry point (after uninstall or re-download).
    pub fn forget(&self, identifier: &str) {
        self.lock_index().remove(identifier);
    }

    fn lock_index(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.third_party_index
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
