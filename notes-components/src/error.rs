//! # Error Handling
//!
//! Two kinds of failure come out of this crate:
//!
//! - [`ComponentError`]: returned as `Err`. Either a caller broke a
//!   precondition (no download URL, third-party index path never preloaded,
//!   bad identifier) or a low-level I/O, HTTP or archive error surfaced inside
//!   a step that is not wrapped by the download pipeline.
//! - [`LoadingError`]: the closed set of outcomes of a download attempt. These
//!   are plain values inside [`crate::DownloadOutcome`] so orchestration code
//!   can branch on them without error plumbing.

use std::fmt;

use notes_asset_server::ServerError;
use serde::Serialize;

use crate::messages::MESSAGES;

/// Errors raised by component operations.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
    #[error("component '{identifier}' has no download URL")]
    MissingDownloadUrl { identifier: String },

    #[error("index path for third-party component '{identifier}' has not been preloaded")]
    IndexPathNotPreloaded { identifier: String },

    #[error("invalid component identifier '{identifier}': {reason}")]
    InvalidIdentifier {
        identifier: String,
        reason: &'static str,
    },

    #[error("invalid index path '{path}' for component '{identifier}'")]
    InvalidIndexPath { identifier: String, path: String },

    #[error("local asset server is not running")]
    ServerNotRunning,

    #[error("asset server base URL '{0}' cannot carry a path")]
    InvalidBaseUrl(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

impl ComponentError {
    /// True for precondition failures the caller is expected to prevent.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            ComponentError::MissingDownloadUrl { .. }
                | ComponentError::IndexPathNotPreloaded { .. }
                | ComponentError::InvalidIdentifier { .. }
                | ComponentError::InvalidIndexPath { .. }
        )
    }
}

pub type ComponentResult<T> = Result<T, ComponentError>;

/// Outcome tags for a failed component download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingError {
    /// Transport answered with a non-2xx status
    FailedDownload,
    /// Registry checksum absent or different from the archive digest
    ChecksumMismatch,
    /// Asset server failed to start; reported through an alert, never
    /// returned from a download
    LocalServerFailure,
    /// Install directory missing after extraction
    DoesntExist,
    Unknown,
}

impl LoadingError {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadingError::FailedDownload => "failed_download",
            LoadingError::ChecksumMismatch => "checksum_mismatch",
            LoadingError::LocalServerFailure => "local_server_failure",
            LoadingError::DoesntExist => "doesnt_exist",
            LoadingError::Unknown => "unknown",
        }
    }

    /// User-facing explanation.
    pub fn message(&self) -> &'static str {
        let m = &MESSAGES.loading;
        match self {
            LoadingError::FailedDownload => m.failed_download,
            LoadingError::ChecksumMismatch => m.checksum_mismatch,
            LoadingError::LocalServerFailure => m.local_server_failure,
            LoadingError::DoesntExist => m.doesnt_exist,
            LoadingError::Unknown => m.unknown,
        }
    }
}

impl fmt::Display for LoadingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
