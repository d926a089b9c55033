//! Component items as the app hands them to the manager.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::registry::FeatureDescriptor;

/// Where a component plugs into the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentArea {
    #[default]
    Editor,
    Themes,
    EditorStack,
    Modal,
}

/// Self-declared package details carried by the component item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    /// Hosted URL used when the component is not downloadable
    #[serde(default)]
    pub url: Option<String>,
}

/// Stylesheet variables for a theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeContent {
    /// Built-in themes render inline instead of through the asset server
    #[serde(default)]
    pub is_system_theme: bool,
    /// CSS custom properties in declaration order
    #[serde(default)]
    pub variables: IndexMap<String, String>,
}

/// Permission names a component can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionName {
    StreamContextItem,
    StreamItems,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentPermission {
    pub name: PermissionName,
    #[serde(default)]
    pub content_types: Vec<String>,
}

/// An editor, theme or other plugin item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub area: ComponentArea,
    #[serde(default)]
    pub package_info: PackageInfo,
    #[serde(default)]
    pub theme: Option<ThemeContent>,
    #[serde(default)]
    pub permissions: Vec<ComponentPermission>,
}

impl Component {
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            area: ComponentArea::default(),
            package_info: PackageInfo::default(),
            theme: None,
            permissions: Vec::new(),
        }
    }

    /// First-party component built from a registry entry.
    pub fn from_descriptor(descriptor: &FeatureDescriptor) -> Self {
        Self {
            identifier: descriptor.identifier.clone(),
            name: descriptor
                .name
                .clone()
                .unwrap_or_else(|| descriptor.identifier.clone()),
            area: descriptor.area,
            package_info: PackageInfo {
                download_url: Some(descriptor.download_url.clone()),
                version: Some(descriptor.version.clone()),
                url: None,
            },
            theme: None,
            permissions: Vec::new(),
        }
    }

    pub fn with_area(mut self, area: ComponentArea) -> Self {
        self.area = area;
        self
    }

    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.package_info.download_url = Some(url.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.package_info.version = Some(version.into());
        self
    }

    pub fn with_hosted_url(mut self, url: impl Into<String>) -> Self {
        self.package_info.url = Some(url.into());
        self
    }

    pub fn with_theme(mut self, theme: ThemeContent) -> Self {
        self.area = ComponentArea::Themes;
        self.theme = Some(theme);
        self
    }

    pub fn with_permission(mut self, permission: ComponentPermission) -> Self {
        self.permissions.push(permission);
        self
    }

    pub fn is_theme(&self) -> bool {
        self.area == ComponentArea::Themes
    }

    pub fn is_system_theme(&self) -> bool {
        self.theme.as_ref().is_some_and(|t| t.is_system_theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_component_json() {
        let json = r#"{
            "identifier": "com.example.editor",
            "name": "Example Editor",
            "area": "editor-stack",
            "package_info": {"download_url": "https://example.com/e.zip", "version": "1.0.0"},
            "permissions": [{"name": "stream-items", "content_types": ["Note", "Tag"]}]
        }"#;
        let component: Component = serde_json::from_str(json).unwrap();
        assert_eq!(component.area, ComponentArea::EditorStack);
        assert_eq!(
            component.package_info.download_url.as_deref(),
            Some("https://example.com/e.zip")
        );
        assert_eq!(component.permissions[0].name, PermissionName::StreamItems);
        assert!(component.theme.is_none());
    }

    #[test]
    fn test_system_theme_flag() {
        let mut variables = IndexMap::new();
        variables.insert("--background-color".to_string(), "#000".to_string());
        let theme = Component::new("org.notes.theme.dark", "Dark").with_theme(ThemeContent {
            is_system_theme: true,
            variables,
        });
        assert!(theme.is_theme());
        assert!(theme.is_system_theme());
        assert!(!Component::new("x", "X").is_system_theme());
    }
}
