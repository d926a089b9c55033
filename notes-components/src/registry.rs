//! First-party feature registry and its checksums.
//!
//! Both tables ship inside the binary (`data/features.json` and
//! `data/checksums.json`) and are parsed once per process. Identifiers present
//! here are first-party: their archives must match the recorded checksum and
//! their entry point comes from the descriptor rather than a manifest on disk.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::component::ComponentArea;
use crate::error::ComponentResult;

const BUNDLED_FEATURES: &str = include_str!("../data/features.json");
const BUNDLED_CHECKSUMS: &str = include_str!("../data/checksums.json");

/// Registry entry for a first-party component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    pub identifier: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub area: ComponentArea,
    pub download_url: String,
    pub version: String,
    /// Entry point relative to the install directory
    pub index_path: String,
    /// Expected base64 checksum, merged in from the checksum table
    #[serde(default)]
    pub checksum: Option<String>,
}

/// Immutable lookup of first-party descriptors by identifier.
#[derive(Debug, Clone, Default)]
pub struct FeatureRegistry {
    features: IndexMap<String, FeatureDescriptor>,
}

impl FeatureRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a descriptor list and an `identifier -> checksum` map.
    pub fn from_json(features_json: &str, checksums_json: &str) -> ComponentResult<Self> {
        let descriptors: Vec<FeatureDescriptor> = serde_json::from_str(features_json)?;
        let checksums: HashMap<String, String> = serde_json::from_str(checksums_json)?;
        Ok(Self::from_parts(descriptors, checksums))
    }

    pub fn from_parts(
        descriptors: Vec<FeatureDescriptor>,
        checksums: HashMap<String, String>,
    ) -> Self {
        let features = descriptors
            .into_iter()
            .map(|mut descriptor| {
                if let Some(checksum) = checksums.get(&descriptor.identifier) {
                    descriptor.checksum = Some(checksum.clone());
                }
                (descriptor.identifier.clone(), descriptor)
            })
            .collect::<IndexMap<_, _>>();

        debug!(count = features.len(), "Loaded feature registry");
        Self { features }
    }

    /// The registry bundled with this build.
    pub fn bundled() -> Arc<FeatureRegistry> {
        static BUNDLED: OnceLock<Arc<FeatureRegistry>> = OnceLock::new();
        BUNDLED
            .get_or_init(|| {
                let registry = FeatureRegistry::from_json(BUNDLED_FEATURES, BUNDLED_CHECKSUMS)
                    .unwrap_or_else(|e| {
                        panic!("Bundled feature registry failed to parse: {e}. The embedded data files are part of the build and must be valid JSON.")
                    });
                Arc::new(registry)
            })
            .clone()
    }

    pub fn find(&self, identifier: &str) -> Option<&FeatureDescriptor> {
        self.features.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.features.contains_key(identifier)
    }

    pub fn expected_checksum(&self, identifier: &str) -> Option<&str> {
        self.find(identifier).and_then(|d| d.checksum.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureDescriptor> {
        self.features.values()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEATURES: &str = r#"[
        {
            "identifier": "com.example.editor",
            "name": "Example Editor",
            "download_url": "https://example.com/editor.zip",
            "version": "1.3.0",
            "index_path": "dist/index.html"
        },
        {
            "identifier": "com.example.theme",
            "area": "themes",
            "download_url": "https://example.com/theme.zip",
            "version": "1.0.0",
            "index_path": "index.css"
        }
    ]"#;

    #[test]
    fn test_from_json_merges_checksums() {
        let registry =
            FeatureRegistry::from_json(FEATURES, r#"{"com.example.editor": "AAA="}"#).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.expected_checksum("com.example.editor"), Some("AAA="));
        assert_eq!(registry.expected_checksum("com.example.theme"), None);
        assert_eq!(
            registry.find("com.example.theme").map(|d| d.area),
            Some(ComponentArea::Themes)
        );
        assert!(!registry.contains("org.thirdparty.plugin"));
    }

    #[test]
    fn test_iteration_keeps_declaration_order() {
        let registry = FeatureRegistry::from_json(FEATURES, "{}").unwrap();
        let ids: Vec<_> = registry.iter().map(|d| d.identifier.as_str()).collect();
        assert_eq!(ids, ["com.example.editor", "com.example.theme"]);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(FeatureRegistry::from_json("not json", "{}").is_err());
        assert!(FeatureRegistry::from_json("[]", "[]").is_err());
    }

    #[test]
    fn test_bundled_registry_parses_and_is_checksummed() {
        let registry = FeatureRegistry::bundled();
        assert!(!registry.is_empty());
        for descriptor in registry.iter() {
            assert!(
                descriptor.checksum.is_some(),
                "{} has no checksum",
                descriptor.identifier
            );
            crate::validation::validate_identifier(&descriptor.identifier).unwrap();
            crate::validation::validate_index_path(&descriptor.identifier, &descriptor.index_path)
                .unwrap();
        }
    }
}
