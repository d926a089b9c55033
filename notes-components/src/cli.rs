// CLI argument parsing and command dispatch for `components-host`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use crate::component::Component;
use crate::config::ComponentsConfig;
use crate::manager::ComponentManager;
use crate::messages::MESSAGES;
use crate::msg;
use crate::pipeline::DownloadOutcome;

#[derive(Debug, Clone, Parser)]
#[command(name = "components-host")]
#[command(about = "Install and serve editor and theme components")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a components configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the asset server port
    #[arg(short, long, global = true)]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Serve installed components until Ctrl+C
    Serve,
    /// Download and install a component
    Install {
        /// Component identifier
        identifier: String,
        /// Download URL for components missing from the bundled registry
        #[arg(long)]
        url: Option<String>,
        /// Reinstall even if the installed version is current
        #[arg(long)]
        force: bool,
    },
    /// Report whether a component needs to be downloaded
    NeedsDownload {
        /// Component identifier
        identifier: String,
        /// Download URL for components missing from the bundled registry
        #[arg(long)]
        url: Option<String>,
        /// Latest version for components missing from the bundled registry
        #[arg(long)]
        version: Option<String>,
    },
    /// Print the URL a web view would load for a component
    Url {
        /// Component identifier
        identifier: String,
        /// Download URL for components missing from the bundled registry
        #[arg(long)]
        url: Option<String>,
    },
    /// Remove an installed component
    Uninstall {
        /// Component identifier
        identifier: String,
    },
    /// List bundled components and their installed versions
    List,
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Serve => "serve",
            Command::Install { .. } => "install",
            Command::NeedsDownload { .. } => "needs-download",
            Command::Url { .. } => "url",
            Command::Uninstall { .. } => "uninstall",
            Command::List => "list",
        }
    }
}

fn load_config(args: &Args) -> Result<ComponentsConfig> {
    let mut config = ComponentsConfig::load_or_default(args.config.as_deref())
        .context("failed to load components configuration")?;
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    debug!(?config, "Resolved configuration");
    Ok(config)
}

/// Build the component for `identifier`: registry entries first, then an
/// ad-hoc third-party component when a download URL is given.
fn resolve_component(
    manager: &ComponentManager,
    identifier: &str,
    url: Option<String>,
    version: Option<String>,
) -> Result<Component> {
    if let Some(descriptor) = manager.registry().find(identifier) {
        return Ok(Component::from_descriptor(descriptor));
    }

    let mut component = Component::new(identifier, identifier);
    if let Some(url) = url {
        component = component.with_download_url(url);
    }
    if let Some(version) = version {
        component = component.with_version(version);
    }
    Ok(component)
}

pub async fn execute_command(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    std::fs::create_dir_all(&config.components_dir).with_context(|| {
        format!(
            "failed to create components directory {}",
            config.components_dir.display()
        )
    })?;
    let manager = ComponentManager::builder(config.clone()).build()?;

    info!(command = args.command.name(), "Running command");
    match args.command {
        Command::Serve => handle_serve(&manager, &config).await,
        Command::Install {
            identifier,
            url,
            force,
        } => handle_install(&manager, &identifier, url, force).await,
        Command::NeedsDownload {
            identifier,
            url,
            version,
        } => handle_needs_download(&manager, &identifier, url, version).await,
        Command::Url { identifier, url } => handle_url(&manager, &identifier, url).await,
        Command::Uninstall { identifier } => handle_uninstall(&manager, &identifier).await,
        Command::List => handle_list(&manager).await,
    }
}

async fn handle_serve(manager: &ComponentManager, config: &ComponentsConfig) -> Result<()> {
    let base_url = match manager.initialize().await {
        Ok(url) => url,
        Err(e) => bail!(e.message()),
    };

    println!(
        "{}",
        msg!(
            MESSAGES.cli.serving,
            root = config.components_dir.display(),
            url = base_url
        )
    );
    for descriptor in manager.registry().iter() {
        if manager.installed_version(&descriptor.identifier).await.is_none() {
            continue;
        }
        let component = Component::from_descriptor(descriptor);
        if let Some(url) = manager.url_for_component(&component)? {
            println!(
                "{}",
                msg!(MESSAGES.cli.serving_component, name = component.name, url = url)
            );
        }
    }
    println!("{}", msg!(MESSAGES.cli.press_ctrl_c_to_stop));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    manager.deinit().await;
    Ok(())
}

async fn handle_install(
    manager: &ComponentManager,
    identifier: &str,
    url: Option<String>,
    force: bool,
) -> Result<()> {
    let component = resolve_component(manager, identifier, url, None)?;
    if !manager.is_component_downloadable(&component) {
        bail!(msg!(MESSAGES.cli.unknown_component, identifier = identifier));
    }

    let outcome = if force {
        manager.download_component_offline(&component).await?
    } else {
        manager.install_component_if_needed(&component).await?
    };

    match outcome {
        DownloadOutcome::Installed => {
            println!("{}", msg!(MESSAGES.cli.install_success, name = component.name));
            Ok(())
        }
        DownloadOutcome::UpToDate => {
            println!(
                "{}",
                msg!(MESSAGES.cli.install_up_to_date, name = component.name)
            );
            Ok(())
        }
        DownloadOutcome::Failed(error) => bail!(msg!(
            MESSAGES.cli.install_failed,
            name = component.name,
            reason = error.message()
        )),
    }
}

async fn handle_needs_download(
    manager: &ComponentManager,
    identifier: &str,
    url: Option<String>,
    version: Option<String>,
) -> Result<()> {
    let component = resolve_component(manager, identifier, url, version)?;
    if !manager.is_component_downloadable(&component) {
        bail!(msg!(MESSAGES.cli.unknown_component, identifier = identifier));
    }

    let installed = manager
        .installed_version(identifier)
        .await
        .unwrap_or_else(|| "none".to_string());
    if manager.does_component_need_download(&component).await? {
        let latest = component
            .package_info
            .version
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        println!(
            "{}",
            msg!(
                MESSAGES.cli.needs_download,
                name = component.name,
                installed = installed,
                latest = latest
            )
        );
    } else {
        println!(
            "{}",
            msg!(MESSAGES.cli.up_to_date, name = component.name, installed = installed)
        );
    }
    Ok(())
}

async fn handle_url(manager: &ComponentManager, identifier: &str, url: Option<String>) -> Result<()> {
    let component = resolve_component(manager, identifier, url, None)?;
    if manager.is_component_downloadable(&component) && manager.is_third_party(identifier) {
        manager.preload_third_party_index_path(identifier).await?;
    }

    let needs_server = manager.is_component_downloadable(&component);
    if needs_server {
        if let Err(e) = manager.initialize().await {
            bail!(e.message());
        }
    }

    let resolved = manager.url_for_component(&component);
    if needs_server {
        manager.deinit().await;
    }

    match resolved? {
        Some(url) => println!("{url}"),
        None => bail!(msg!(MESSAGES.cli.unknown_component, identifier = identifier)),
    }
    Ok(())
}

async fn handle_uninstall(manager: &ComponentManager, identifier: &str) -> Result<()> {
    let component = resolve_component(manager, identifier, None, None)?;
    manager.uninstall_component(&component).await?;
    println!(
        "{}",
        msg!(MESSAGES.cli.uninstall_success, name = component.name)
    );
    Ok(())
}

async fn handle_list(manager: &ComponentManager) -> Result<()> {
    for descriptor in manager.registry().iter() {
        let installed = manager.installed_version(&descriptor.identifier).await;
        let name = descriptor
            .name
            .as_deref()
            .unwrap_or(descriptor.identifier.as_str());
        match installed {
            Some(installed) => println!(
                "  {:<36} {:<24} {} (installed {})",
                descriptor.identifier, name, descriptor.version, installed
            ),
            None => println!(
                "  {:<36} {:<24} {}",
                descriptor.identifier, name, descriptor.version
            ),
        }
    }
    Ok(())
}
