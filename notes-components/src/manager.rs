//! Component manager: the app-facing orchestrator.
//!
//! Owns the asset server lifecycle, decides when components need to be
//! (re)downloaded, installs and uninstalls them, resolves the URL a web view
//! should load, and keeps every rendered component in sync with the active
//! theme.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use notes_asset_server::AssetServer;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::alerts::{AlertService, LogAlertService};
use crate::archive::{ArchiveExtractor, ZipExtractor};
use crate::component::Component;
use crate::config::ComponentsConfig;
use crate::error::{ComponentError, ComponentResult, LoadingError};
use crate::fs::{FileSystem, LocalFileSystem};
use crate::manifest::installed_version;
use crate::messages::MESSAGES;
use crate::msg;
use crate::paths::ComponentPaths;
use crate::permissions::{present_permissions_dialog, PermissionDialog};
use crate::pipeline::{resolve_download_url, resolve_latest_version, DownloadOutcome, DownloadPipeline};
use crate::registry::FeatureRegistry;
use crate::theme::{theme_data_url, ThemeObserver};
use crate::version::is_newer;

/// Join the server base URL with the install path and entry point, each
/// segment percent-encoded so `#`, `?` and spaces stay part of the path.
fn served_url(base_url: &str, relative_install: &str, index_path: &str) -> ComponentResult<String> {
    let invalid = || ComponentError::InvalidBaseUrl(base_url.to_string());
    let mut url = Url::parse(base_url).map_err(|_| invalid())?;
    {
        let mut segments = url.path_segments_mut().map_err(|_| invalid())?;
        segments.pop_if_empty();
        segments.extend(
            relative_install
                .split('/')
                .chain(index_path.split('/'))
                .filter(|segment| !segment.is_empty() && *segment != "."),
        );
    }
    Ok(url.to_string())
}

/// Resolves URLs for components that are not downloaded locally.
pub trait FallbackUrlResolver: Send + Sync {
    fn default_url(&self, component: &Component) -> Option<String>;
}

/// Falls back to the component's hosted URL.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostedUrlResolver;

impl FallbackUrlResolver for HostedUrlResolver {
    fn default_url(&self, component: &Component) -> Option<String> {
        component.package_info.url.clone()
    }
}

/// Builder for [`ComponentManager`]; unset collaborators get the production
/// implementations.
pub struct ComponentManagerBuilder {
    config: ComponentsConfig,
    registry: Option<Arc<FeatureRegistry>>,
    fs: Option<Arc<dyn FileSystem>>,
    extractor: Option<Arc<dyn ArchiveExtractor>>,
    alerts: Option<Arc<dyn AlertService>>,
    fallback: Option<Arc<dyn FallbackUrlResolver>>,
}

impl ComponentManagerBuilder {
    pub fn registry(mut self, registry: Arc<FeatureRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn ArchiveExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn alerts(mut self, alerts: Arc<dyn AlertService>) -> Self {
        self.alerts = Some(alerts);
        self
    }

    pub fn fallback_resolver(mut self, fallback: Arc<dyn FallbackUrlResolver>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn build(self) -> ComponentResult<ComponentManager> {
        self.config.validate()?;

        let registry = self.registry.unwrap_or_else(FeatureRegistry::bundled);
        let fs = match self.fs {
            Some(fs) => fs,
            None => Arc::new(LocalFileSystem::new(Duration::from_secs(
                self.config.download_timeout_secs,
            ))?),
        };
        let extractor = self.extractor.unwrap_or_else(|| Arc::new(ZipExtractor));
        let paths = Arc::new(ComponentPaths::new(
            &self.config.components_dir,
            registry.clone(),
        ));
        let pipeline = DownloadPipeline::new(
            fs.clone(),
            extractor,
            registry.clone(),
            paths.clone(),
            &self.config.download_dir,
        );
        let server = AssetServer::new(self.config.asset_server_config());

        Ok(ComponentManager {
            registry,
            fs,
            paths,
            pipeline,
            server,
            alerts: self.alerts.unwrap_or_else(|| Arc::new(LogAlertService)),
            fallback: self.fallback.unwrap_or_else(|| Arc::new(HostedUrlResolver)),
            active_theme: Mutex::new(None),
            observers: Mutex::new(Vec::new()),
            server_failure_reported: AtomicBool::new(false),
        })
    }
}

pub struct ComponentManager {
    registry: Arc<FeatureRegistry>,
    fs: Arc<dyn FileSystem>,
    paths: Arc<ComponentPaths>,
    pipeline: DownloadPipeline,
    server: AssetServer,
    alerts: Arc<dyn AlertService>,
    fallback: Arc<dyn FallbackUrlResolver>,
    active_theme: Mutex<Option<Component>>,
    observers: Mutex<Vec<Arc<dyn ThemeObserver>>>,
    server_failure_reported: AtomicBool,
}

impl ComponentManager {
    pub fn builder(config: ComponentsConfig) -> ComponentManagerBuilder {
        ComponentManagerBuilder {
            config,
            registry: None,
            fs: None,
            extractor: None,
            alerts: None,
            fallback: None,
        }
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Start the asset server.
    ///
    /// A start failure is shown to the user once and logged; the manager keeps
    /// working for components that do not need the server.
    pub async fn initialize(&self) -> Result<String, LoadingError> {
        match self.server.start().await {
            Ok(base_url) => {
                info!(base_url = %base_url, "Component manager ready");
                Ok(base_url)
            }
            Err(e) => {
                error!(error = %e, "Failed to start component asset server");
                if !self.server_failure_reported.swap(true, Ordering::SeqCst) {
                    let text = msg!(
                        MESSAGES.alerts.server_failure_text,
                        message = LoadingError::LocalServerFailure.message(),
                        error = e
                    );
                    self.alerts
                        .alert(MESSAGES.alerts.server_failure_title, &text)
                        .await;
                }
                Err(LoadingError::LocalServerFailure)
            }
        }
    }

    /// Stop the asset server. Safe to call more than once.
    pub async fn deinit(&self) {
        self.server.stop().await;
        self.lock_observers().clear();
    }

    pub fn base_url(&self) -> Option<String> {
        self.server.base_url()
    }

    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    // ---------------------------------------------------------------------
    // Paths
    // ---------------------------------------------------------------------

    pub fn is_third_party(&self, identifier: &str) -> bool {
        self.paths.is_third_party(identifier)
    }

    pub fn is_component_downloadable(&self, component: &Component) -> bool {
        resolve_download_url(&self.registry, component).is_some()
    }

    pub fn path_for_component(&self, identifier: &str) -> PathBuf {
        self.paths.path_for_component(identifier)
    }

    pub fn index_file_relative_path(&self, identifier: &str) -> ComponentResult<String> {
        self.paths.index_file_relative_path(identifier)
    }

    pub async fn preload_third_party_index_path(&self, identifier: &str) -> ComponentResult<String> {
        self.paths
            .preload_third_party_index_path(self.fs.as_ref(), identifier)
            .await
    }

    /// Absolute path of a downloadable component's entry file, or `None` for
    /// components that are not downloaded.
    pub fn index_file(&self, component: &Component) -> ComponentResult<Option<PathBuf>> {
        if !self.is_component_downloadable(component) {
            return Ok(None);
        }
        let relative = self.index_file_relative_path(&component.identifier)?;
        Ok(Some(
            self.path_for_component(&component.identifier).join(relative),
        ))
    }

    // ---------------------------------------------------------------------
    // Install / uninstall
    // ---------------------------------------------------------------------

    pub async fn download_component_offline(
        &self,
        component: &Component,
    ) -> ComponentResult<DownloadOutcome> {
        self.pipeline.download_component_offline(component).await
    }

    /// Installed version from the component's manifest, if readable.
    pub async fn installed_version(&self, identifier: &str) -> Option<String> {
        installed_version(self.fs.as_ref(), &self.path_for_component(identifier)).await
    }

    /// True when nothing usable is installed or a newer version is known.
    pub async fn does_component_need_download(&self, component: &Component) -> ComponentResult<bool> {
        let identifier = &component.identifier;
        if resolve_download_url(&self.registry, component).is_none() {
            return Err(ComponentError::MissingDownloadUrl {
                identifier: identifier.clone(),
            });
        }

        let Some(installed) = self.installed_version(identifier).await else {
            debug!(identifier = %identifier, "No installed manifest");
            return Ok(true);
        };

        let needs = match resolve_latest_version(&self.registry, component) {
            Some(latest) => is_newer(&latest, &installed),
            None => false,
        };
        debug!(identifier = %identifier, installed = %installed, needs_download = needs, "Version check");
        Ok(needs)
    }

    /// Download only when [`Self::does_component_need_download`] says so.
    pub async fn install_component_if_needed(
        &self,
        component: &Component,
    ) -> ComponentResult<DownloadOutcome> {
        if self.does_component_need_download(component).await? {
            self.download_component_offline(component).await
        } else {
            Ok(DownloadOutcome::UpToDate)
        }
    }

    pub async fn uninstall_component(&self, component: &Component) -> ComponentResult<()> {
        crate::validation::validate_identifier(&component.identifier)?;
        let dir = self.path_for_component(&component.identifier);
        self.fs.unlink(&dir).await?;
        self.paths.forget(&component.identifier);
        info!(identifier = %component.identifier, "Component uninstalled");
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Rendering
    // ---------------------------------------------------------------------

    /// URL the web view should load for `component`.
    ///
    /// Built-in themes become inline `data:` URLs. Components without a
    /// download URL use the fallback resolver. Everything else is served by
    /// the asset server and needs its entry point resolvable (third-party
    /// components must be preloaded first).
    pub fn url_for_component(&self, component: &Component) -> ComponentResult<Option<String>> {
        if let Some(theme) = component.theme.as_ref().filter(|t| t.is_system_theme) {
            return Ok(Some(theme_data_url(theme)));
        }

        if !self.is_component_downloadable(component) {
            return Ok(self.fallback.default_url(component));
        }

        let index_path = self.index_file_relative_path(&component.identifier)?;
        let base_url = self.server.base_url().ok_or(ComponentError::ServerNotRunning)?;
        let relative = self.paths.relative_install_path(&component.identifier);

        Ok(Some(served_url(&base_url, &relative, &index_path)?))
    }

    pub async fn present_permissions_dialog<F>(&self, dialog: &PermissionDialog, callback: F)
    where
        F: FnOnce(bool) + Send,
    {
        present_permissions_dialog(self.alerts.as_ref(), dialog, callback).await
    }

    // ---------------------------------------------------------------------
    // Themes
    // ---------------------------------------------------------------------

    pub fn register_observer(&self, observer: Arc<dyn ThemeObserver>) {
        let urls = self.current_theme_urls();
        observer.post_active_themes(&urls);
        self.lock_observers().push(observer);
    }

    pub fn deregister_observer(&self, component_id: &str) {
        self.lock_observers()
            .retain(|observer| observer.component_id() != component_id);
    }

    pub fn active_theme(&self) -> Option<Component> {
        self.lock_theme().clone()
    }

    /// Replace the active theme and push it to every registered observer.
    /// `None` restores the default theme.
    pub async fn set_active_theme(&self, theme: Option<Component>) {
        if let Some(theme) = theme.as_ref() {
            if self.is_component_downloadable(theme)
                && self.is_third_party(&theme.identifier)
                && self
                    .paths
                    .index_file_relative_path(&theme.identifier)
                    .is_err()
            {
                if let Err(e) = self.preload_third_party_index_path(&theme.identifier).await {
                    warn!(identifier = %theme.identifier, error = %e, "Could not preload theme entry point");
                }
            }
        }

        info!(theme = ?theme.as_ref().map(|t| t.identifier.as_str()), "Active theme changed");
        *self.lock_theme() = theme;

        let urls = self.current_theme_urls();
        let observers: Vec<Arc<dyn ThemeObserver>> = self.lock_observers().clone();
        for observer in observers {
            debug!(component = %observer.component_id(), "Posting active themes");
            observer.post_active_themes(&urls);
        }
    }

    /// Stylesheet URLs for the active theme; empty for the default theme.
    pub fn active_theme_urls(&self) -> Vec<String> {
        self.current_theme_urls()
    }

    fn current_theme_urls(&self) -> Vec<String> {
        let Some(theme) = self.active_theme() else {
            return Vec::new();
        };
        match self.url_for_component(&theme) {
            Ok(Some(url)) => vec![url],
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(identifier = %theme.identifier, error = %e, "Active theme has no URL");
                Vec::new()
            }
        }
    }

    fn lock_theme(&self) -> MutexGuard<'_, Option<Component>> {
        self.active_theme
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_observers(&self) -> MutexGuard<'_, Vec<Arc<dyn ThemeObserver>>> {
        self.observers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
