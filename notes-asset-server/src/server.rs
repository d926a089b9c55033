//! Router construction and start/stop lifecycle for the asset server.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{extract::State, routing::get, Json, Router};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::config::AssetServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::state::{AppState, HealthResponse};

/// Build the router: `/health` plus every file under the served root.
pub fn build_router(state: Arc<AppState>) -> Router {
    let files = ServeDir::new(&state.root_dir).append_index_html_on_directories(true);

    Router::new()
        .route("/health", get(health_handler))
        .fallback_service(files)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    debug!(root = %state.root_dir.display(), "Health check");
    Json(HealthResponse {
        status: "healthy",
        service: "notes-asset-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Base URL for a bound loopback address. IPv4 keeps the `localhost` name;
/// IPv6 uses the bracketed literal since `localhost` may resolve to IPv4 only.
pub fn base_url_for(bound: SocketAddr) -> String {
    match bound {
        SocketAddr::V4(addr) => format!("http://localhost:{}", addr.port()),
        SocketAddr::V6(addr) => format!("http://[{}]:{}", addr.ip(), addr.port()),
    }
}

struct RunningServer {
    base_url: String,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Process-wide static server for installed components.
///
/// Started once when the component manager initializes and stopped on
/// teardown. Restarting after [`AssetServer::stop`] works but is not relied on.
pub struct AssetServer {
    config: AssetServerConfig,
    running: Mutex<Option<RunningServer>>,
}

impl AssetServer {
    pub fn new(config: AssetServerConfig) -> Self {
        Self {
            config,
            running: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &AssetServerConfig {
        &self.config
    }

    /// Bind the loopback socket and start serving; returns the base URL.
    ///
    /// Calling `start` on a running server returns the existing base URL.
    pub async fn start(&self) -> ServerResult<String> {
        if let Some(url) = self.base_url() {
            debug!(base_url = %url, "Asset server already running");
            return Ok(url);
        }

        let addr = self.config.socket_addr()?;
        let root_dir = self.config.root_dir.clone();

        tokio::fs::create_dir_all(&root_dir)
            .await
            .map_err(|source| ServerError::RootDir {
                path: root_dir.clone(),
                source,
            })?;

        let listener = TcpListener::bind(addr).await.map_err(|source| {
            error!(addr = %addr, error = %source, "Failed to bind asset server");
            ServerError::Bind { addr, source }
        })?;
        let bound = listener.local_addr()?;
        let base_url = base_url_for(bound);

        let app = build_router(Arc::new(AppState {
            root_dir: root_dir.clone(),
        }));
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let shutdown = async {
                let _ = rx.await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!(error = %e, "Asset server terminated");
            }
        });

        info!(
            addr = %bound,
            root = %root_dir.display(),
            base_url = %base_url,
            "Asset server listening"
        );

        let lost_race = {
            let mut running = self.lock_running();
            match running.as_ref() {
                Some(existing) => Some((existing.base_url.clone(), tx, handle)),
                None => {
                    *running = Some(RunningServer {
                        base_url: base_url.clone(),
                        shutdown: tx,
                        handle,
                    });
                    None
                }
            }
        };

        // Lost a start race; keep the first server.
        if let Some((url, tx, handle)) = lost_race {
            let _ = tx.send(());
            let _ = handle.await;
            return Ok(url);
        }

        Ok(base_url)
    }

    /// Shut the server down. No-op when it is not running.
    pub async fn stop(&self) {
        let running = self.lock_running().take();
        let Some(running) = running else {
            debug!("Asset server stop requested while not running");
            return;
        };

        let _ = running.shutdown.send(());
        if let Err(e) = running.handle.await {
            warn!(error = %e, "Asset server task did not shut down cleanly");
        }
        info!(base_url = %running.base_url, "Asset server stopped");
    }

    /// Base URL of the running server, if any.
    pub fn base_url(&self) -> Option<String> {
        self.lock_running().as_ref().map(|r| r.base_url.clone())
    }

    pub fn is_running(&self) -> bool {
        self.lock_running().is_some()
    }

    fn lock_running(&self) -> std::sync::MutexGuard<'_, Option<RunningServer>> {
        self.running
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
