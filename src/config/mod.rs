//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! app.config.toml (optional)
//!     → loader.rs (parse, defaults, APP_ENV / PORT overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via ArcSwap with the HTTP handlers
//!
//! In development:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → atomic swap of Arc<AppConfig>
//! ```
//!
//! # Design Decisions
//! - A missing config file is not an error; every field has a default
//! - The environment selects the module cache policy and error page detail
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{AppConfig, BuildConfig, Environment, LogFormat, ObservabilityConfig, ServerConfig};
