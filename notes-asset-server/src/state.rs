//! Shared request state.

use serde::Serialize;
use std::path::PathBuf;

/// State handed to every handler; wrapped in an `Arc` by the router.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Directory whose contents are served at `/`
    pub root_dir: PathBuf,
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}
