//! `package.json` manifests inside installed component directories.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ComponentResult;
use crate::fs::FileSystem;

pub const MANIFEST_FILE: &str = "package.json";
pub const DEFAULT_INDEX_FILE: &str = "index.html";

/// Component-specific settings nested under `sn` in the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestExtras {
    /// Custom entry point relative to the install directory
    #[serde(default)]
    pub main: Option<String>,
}

/// The subset of `package.json` the manager reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub sn: Option<ManifestExtras>,
}

impl PackageManifest {
    /// Entry point declared by the manifest, or `index.html`.
    pub fn index_path(&self) -> &str {
        self.sn
            .as_ref()
            .and_then(|sn| sn.main.as_deref())
            .filter(|main| !main.is_empty())
            .unwrap_or(DEFAULT_INDEX_FILE)
    }
}

pub fn manifest_path(install_dir: &Path) -> PathBuf {
    install_dir.join(MANIFEST_FILE)
}

/// Read and parse the manifest in `install_dir`.
pub async fn read_manifest(
    fs: &dyn FileSystem,
    install_dir: &Path,
) -> ComponentResult<PackageManifest> {
    let path = manifest_path(install_dir);
    let text = fs.read_file_text(&path).await?;
    let manifest: PackageManifest = serde_json::from_str(&text)?;
    debug!(path = %path.display(), version = ?manifest.version, "Read component manifest");
    Ok(manifest)
}

/// Installed version, or `None` when the manifest is missing or unreadable.
pub async fn installed_version(fs: &dyn FileSystem, install_dir: &Path) -> Option<String> {
    if !fs.exists(&manifest_path(install_dir)).await {
        return None;
    }
    match read_manifest(fs, install_dir).await {
        Ok(manifest) => manifest.version,
        Err(e) => {
            debug!(dir = %install_dir.display(), error = %e, "Treating unreadable manifest as not installed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_path_prefers_nested_main() {
        let manifest: PackageManifest =
            serde_json::from_str(r#"{"version": "1.0.0", "sn": {"main": "dist/index.html"}}"#)
                .unwrap();
        assert_eq!(manifest.index_path(), "dist/index.html");
    }

    #[test]
    fn test_index_path_defaults() {
        let plain: PackageManifest = serde_json::from_str(r#"{"version": "1.0.0"}"#).unwrap();
        assert_eq!(plain.index_path(), DEFAULT_INDEX_FILE);

        let empty_main: PackageManifest =
            serde_json::from_str(r#"{"sn": {"main": ""}}"#).unwrap();
        assert_eq!(empty_main.index_path(), DEFAULT_INDEX_FILE);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let manifest: PackageManifest = serde_json::from_str(
            r#"{"name": "editor", "version": "2.0.0", "dependencies": {"x": "1"}}"#,
        )
        .unwrap();
        assert_eq!(manifest.version.as_deref(), Some("2.0.0"));
    }
}
