//! # Local Asset Server
//!
//! Serves the installed components directory over plain HTTP so the editor
//! web view can load a component's HTML entry point and its assets. The
//! server only ever binds a loopback address; anything else is rejected
//! before a socket is opened.
//!
//! ## Key Modules
//!
//! - [`config`]: bind address and served root
//! - [`error`]: [`ServerError`] for start-up failures
//! - [`server`]: router construction and the [`AssetServer`] lifecycle
//! - [`state`]: shared request state

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::{validate_local_host, AssetServerConfig, DEFAULT_PORT};
pub use error::{ServerError, ServerResult};
pub use server::{base_url_for, build_router, AssetServer};
pub use state::AppState;
