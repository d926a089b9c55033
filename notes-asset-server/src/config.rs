//! Bind configuration for the asset server.

use crate::error::{ServerError, ServerResult};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Port the web view expects components on.
pub const DEFAULT_PORT: u16 = 8080;

/// Asset server settings.
///
/// `port = 0` asks the OS for an ephemeral port; the real port is reported
/// through the base URL returned by [`crate::AssetServer::start`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetServerConfig {
    /// Directory served at `/`
    pub root_dir: PathBuf,
    /// Loopback host name or address
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

impl Default for AssetServerConfig {
    fn default() -> Self {
        Self {
            root_dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("notes")
                .join("components"),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl AssetServerConfig {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Socket address to bind, refusing anything reachable off-device.
    pub fn socket_addr(&self) -> ServerResult<SocketAddr> {
        let ip = validate_local_host(&self.host)?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Resolve `host` to a loopback address.
///
/// `localhost` maps to `127.0.0.1`. Wildcard and routable addresses are
/// rejected with [`ServerError::NotLocal`].
pub fn validate_local_host(host: &str) -> ServerResult<IpAddr> {
    let host = host.trim();
    if host.eq_ignore_ascii_case("localhost") {
        return Ok(IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    let ip: IpAddr = host.parse().map_err(|_| ServerError::InvalidHost {
        host: host.to_string(),
    })?;

    if ip.is_loopback() {
        Ok(ip)
    } else {
        Err(ServerError::NotLocal {
            host: host.to_string(),
        })
    }
}
