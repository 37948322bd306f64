//! pagewright server.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌───────────────────────────────────────────────┐
//!     Browser request     │                  PAGEWRIGHT                   │
//!     ────────────────────┼─▶ http ──▶ routing ──▶ render::composer       │
//!                         │   server    matcher     (Document→App→Page)    │
//!                         │                              │                │
//!                         │          modules ◀───────────┘                │
//!                         │          loader/cache (build output)          │
//!                         │                              │                │
//!     Streamed HTML       │                              ▼                │
//!     ◀───────────────────┼── http response ◀── render::stream            │
//!                         │                                               │
//!                         │   config · observability · lifecycle          │
//!                         └───────────────────────────────────────────────┘
//! ```
//!
//! Pages are registered as modules before the server starts. Manifests,
//! the import map and other JSON artifacts are read from the build output.
//!
//! This binary links no pages of its own: it serves `/healthz`, `/load`
//! for JSON data and error pages, and answers every matched route with a
//! 500. Applications build their own binary around a populated
//! [`ModuleRegistry`]; see the crate docs for the registration calls.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use pagewright::config::load_or_default;
use pagewright::config::watcher::ConfigWatcher;
use pagewright::lifecycle::{spawn_signal_handler, Shutdown};
use pagewright::observability::{logging, metrics};
use pagewright::{HttpServer, ModuleRegistry};

#[derive(Debug, Parser)]
#[command(name = "pagewright", version, about = "Serve server-rendered pages from a build output")]
struct Args {
    /// Path to the configuration file. Missing file means defaults.
    #[arg(short, long, env = "PAGEWRIGHT_CONFIG", default_value = "app.config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(&args.config)?;

    logging::init_logging(&config);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pagewright starting");
    tracing::info!(
        environment = ?config.environment,
        bind_address = %config.server.bind_address,
        out_dir = %config.build.out_dir,
        route_dir = %config.build.route_dir,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let shutdown = Arc::new(Shutdown::new());
    spawn_signal_handler(shutdown.clone());

    // The watcher stops when dropped
    let (_watcher, config_updates) = if config.is_production() {
        let (_tx, rx) = mpsc::unbounded_channel();
        (None, rx)
    } else {
        let (watcher, rx) = ConfigWatcher::new(&args.config);
        match watcher.run() {
            Ok(watcher) => (Some(watcher), rx),
            Err(e) => {
                tracing::warn!(error = %e, "Config hot reload disabled");
                (None, rx)
            }
        }
    };

    let registry = ModuleRegistry::new().with_json_root(&config.build.out_dir);
    if registry.is_empty() {
        tracing::warn!("No page modules linked; matched routes will fail with 500");
    } else {
        tracing::info!(modules = registry.len(), "Module registry ready");
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config, Arc::new(registry));
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
