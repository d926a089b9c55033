//! Start-up errors for the asset server.
//!
//! None of these are fatal to the host application: the component manager
//! reports them to the user once and carries on without a server, which only
//! disables downloadable components.

use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("'{host}' is not a loopback address; the asset server only binds locally")]
    NotLocal { host: String },

    #[error("invalid host '{host}'")]
    InvalidHost { host: String },

    #[error("failed to prepare served directory {}: {source}", path.display())]
    RootDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;
