//! Editor and theme components for the notes app.
//!
//! Components are small web apps downloaded as zip archives, verified against
//! a bundled checksum table, unpacked under a local directory and served to
//! web views by a loopback-only HTTP server. [`ComponentManager`] ties the
//! pieces together:
//!
//! - [`pipeline`] downloads, verifies, extracts and normalizes archives
//! - [`paths`] maps identifiers to install directories and entry points
//! - [`theme`] turns built-in themes into inline stylesheets
//! - [`permissions`] asks the user before a component touches notes

pub mod alerts;
pub mod archive;
pub mod cli;
pub mod component;
pub mod config;
pub mod error;
pub mod fs;
pub mod hash_utils;
pub mod manager;
pub mod manifest;
pub mod messages;
pub mod paths;
pub mod permissions;
pub mod pipeline;
pub mod registry;
pub mod theme;
pub mod validation;
pub mod version;

pub use alerts::{AlertService, ConfirmRequest, LogAlertService};
pub use archive::{ArchiveExtractor, ZipExtractor};
pub use component::{
    Component, ComponentArea, ComponentPermission, PackageInfo, PermissionName, ThemeContent,
};
pub use config::ComponentsConfig;
pub use error::{ComponentError, ComponentResult, LoadingError};
pub use fs::{DirEntryInfo, DownloadResult, FileSystem, LocalFileSystem};
pub use manager::{ComponentManager, ComponentManagerBuilder, FallbackUrlResolver, HostedUrlResolver};
pub use messages::MESSAGES;
pub use permissions::PermissionDialog;
pub use pipeline::{DownloadOutcome, DownloadPipeline};
pub use registry::{FeatureDescriptor, FeatureRegistry};
pub use theme::ThemeObserver;
