//! # Configuration
//!
//! Settings for the component manager, loaded from YAML with defaults for
//! everything:
//!
//! ```yaml
//! components_dir: /data/notes/components
//! download_dir: /tmp/notes-components
//! download_timeout_secs: 60
//! server:
//!   host: 127.0.0.1
//!   port: 8080
//! ```

use std::path::{Path, PathBuf};

use notes_asset_server::{AssetServerConfig, DEFAULT_PORT};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ComponentError, ComponentResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout() -> u64 {
    60
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentsConfig {
    /// Root of installed components; also the asset server root
    #[serde(default = "default_components_dir")]
    pub components_dir: PathBuf,
    /// Where archives are downloaded before extraction
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default = "default_timeout")]
    pub download_timeout_secs: u64,
}

fn default_components_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notes")
        .join("components")
}

fn default_download_dir() -> PathBuf {
    std::env::temp_dir().join("notes-components")
}

impl Default for ComponentsConfig {
    fn default() -> Self {
        Self {
            components_dir: default_components_dir(),
            download_dir: default_download_dir(),
            server: ServerSettings::default(),
            download_timeout_secs: default_timeout(),
        }
    }
}

impl ComponentsConfig {
    /// Config rooted at `base`: components in `base/components`, downloads in
    /// `base/downloads`.
    pub fn rooted_at(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            components_dir: base.join("components"),
            download_dir: base.join("downloads"),
            ..Default::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }

    /// Load from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> ComponentResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ComponentError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: ComponentsConfig = serde_yaml_ng::from_str(&text)?;
        config.validate()?;
        info!(path = %path.display(), "Loaded components config");
        Ok(config)
    }

    /// Load from `path` if given and present, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> ComponentResult<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            Some(path) => {
                debug!(path = %path.display(), "Config file not found; using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> ComponentResult<()> {
        if self.download_timeout_secs == 0 {
            return Err(ComponentError::Config(
                "download_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.download_dir.starts_with(&self.components_dir) {
            return Err(ComponentError::Config(
                "download_dir must not live inside components_dir, which is served over HTTP"
                    .to_string(),
            ));
        }
        notes_asset_server::validate_local_host(&self.server.host)?;
        Ok(())
    }

    pub fn asset_server_config(&self) -> AssetServerConfig {
        AssetServerConfig::new(&self.components_dir)
            .with_host(self.server.host.clone())
            .with_port(self.server.port)
    }
}
