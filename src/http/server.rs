//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Own the shared state: config, module loader, artifacts, renderers
//! - Swap in reloaded configuration
//! - Serve until shutdown is signalled

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::handlers::{health_handler, load_data_handler, page_handler};
use crate::http::request::{request_id_header, UuidRequestId};
use crate::lifecycle::startup::warm_up;
use crate::manifest::BuildArtifacts;
use crate::modules::{ModuleLoader, ModuleResolver};
use crate::render::{HtmlRenderer, RenderComposer, StreamRenderer, TreeRenderer};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    config: ArcSwap<AppConfig>,
    loader: Arc<ModuleLoader>,
    artifacts: BuildArtifacts,
    composer: RenderComposer,
    renderer: StreamRenderer,
}

impl AppState {
    pub fn new(config: AppConfig, resolver: Arc<dyn ModuleResolver>, tree_renderer: Arc<dyn TreeRenderer>) -> Self {
        let loader = Arc::new(ModuleLoader::new(resolver, config.cache_policy()));
        Self {
            inner: Arc::new(InnerState {
                config: ArcSwap::from_pointee(config),
                artifacts: BuildArtifacts::new(loader.clone()),
                composer: RenderComposer::new(loader.clone()),
                renderer: StreamRenderer::new(tree_renderer),
                loader,
            }),
        }
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> Arc<AppConfig> {
        self.inner.config.load_full()
    }

    /// Replace the configuration. In-flight requests keep their snapshot.
    ///
    /// Only `build` settings apply to the next request. The environment,
    /// listener, request timeout and observability were fixed at startup.
    pub fn swap_config(&self, config: AppConfig) {
        let old = self.inner.config.load();
        for field in restart_required(&old, &config) {
            tracing::warn!(field, "Change takes effect on restart");
        }
        self.inner.config.store(Arc::new(config));
    }

    pub fn loader(&self) -> &Arc<ModuleLoader> {
        &self.inner.loader
    }

    pub fn artifacts(&self) -> &BuildArtifacts {
        &self.inner.artifacts
    }

    pub fn composer(&self) -> &RenderComposer {
        &self.inner.composer
    }

    pub fn renderer(&self) -> &StreamRenderer {
        &self.inner.renderer
    }
}

/// Changed settings that a running server cannot pick up.
pub fn restart_required(old: &AppConfig, new: &AppConfig) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if old.environment != new.environment {
        fields.push("environment");
    }
    if old.server.bind_address != new.server.bind_address {
        fields.push("server.bind_address");
    }
    if old.server.request_timeout_secs != new.server.request_timeout_secs {
        fields.push("server.request_timeout_secs");
    }
    if old.observability != new.observability {
        fields.push("observability");
    }
    fields
}

/// HTTP server for the page renderer.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server rendering with the default HTML serializer.
    pub fn new(config: AppConfig, resolver: Arc<dyn ModuleResolver>) -> Self {
        Self::with_renderer(config, resolver, Arc::new(HtmlRenderer::new()))
    }

    pub fn with_renderer(
        config: AppConfig,
        resolver: Arc<dyn ModuleResolver>,
        tree_renderer: Arc<dyn TreeRenderer>,
    ) -> Self {
        let request_timeout = Duration::from_secs(config.server.request_timeout_secs);
        let state = AppState::new(config, resolver, tree_renderer);
        let router = Self::build_router(request_timeout, state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(request_timeout: Duration, state: AppState) -> Router {
        let header = request_id_header();
        Router::new()
            .route("/healthz", get(health_handler))
            .route("/load/{*file}", get(load_data_handler))
            .fallback(page_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(request_timeout))
            .layer(PropagateRequestIdLayer::new(header.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(header, UuidRequestId))
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires. Configs received on `config_updates` are swapped in.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<AppConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let config = self.state.config();

        if config.is_production() {
            match warm_up(self.state.artifacts()).await {
                Ok(loaded) => tracing::info!(modules = loaded, "Server modules warmed up"),
                Err(e) => tracing::warn!(error = %e, "Warm-up skipped"),
            }
        }

        let state = self.state.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                state.swap_config(config);
                tracing::info!("Configuration reloaded");
            }
        });

        tracing::info!(
            address = %addr,
            environment = ?config.environment,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
