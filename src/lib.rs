//! Page routing and rendering engine.
//!
//! Matches request URLs against the build manifest, composes
//! Document → App → Page trees with their data, streams them as HTML and
//! drives soft navigation in the browser.
//!
//! Page, data, App and Document modules are Rust values registered under
//! their build output path. An application links them into its own server
//! binary:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use pagewright::config::AppConfig;
//! use pagewright::render::{el, page_data, ComponentError, DataModule, Node, PageProps};
//! use pagewright::{HttpServer, ModuleRegistry, Shutdown};
//!
//! # async fn serve() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::default();
//! let mut registry = ModuleRegistry::new().with_json_root(&config.build.out_dir);
//! registry
//!     .page("pages/index.js", |props: &PageProps| -> Result<Node, ComponentError> {
//!         let greeting = props.data["greeting"].as_str().unwrap_or_default().to_string();
//!         Ok(el("main").child(greeting).into())
//!     })
//!     .data(
//!         "pages/index.data.js",
//!         DataModule::new().with_load(|| async {
//!             Ok(page_data(serde_json::json!({"greeting": "Hello"})))
//!         }),
//!     );
//!
//! let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
//! let shutdown = Shutdown::new();
//! let (_reload, config_updates) = tokio::sync::mpsc::unbounded_channel();
//! HttpServer::new(config, Arc::new(registry))
//!     .run(listener, config_updates, shutdown.subscribe())
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod manifest;
pub mod modules;
pub mod observability;
pub mod render;
pub mod routing;

pub use config::AppConfig;
pub use error::PageError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use modules::{ModuleLoader, ModuleRegistry};
