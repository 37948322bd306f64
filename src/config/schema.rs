//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the page server.
//! All types derive Serde traits for deserialization from `app.config.toml`.

use serde::{Deserialize, Serialize};

use crate::modules::CachePolicy;

/// Default base URL that client assets are served under.
pub const ASSET_BASE_URL_FALLBACK: &str = "/_assets/";
/// Default source root.
pub const ROOT_DIR_FALLBACK: &str = "src";
/// Default build output directory.
pub const OUT_DIR_FALLBACK: &str = "build";
/// Default public directory.
pub const PUBLIC_DIR_FALLBACK: &str = "public";
/// Default route directory, relative to the source root.
pub const ROUTE_DIR_FALLBACK: &str = "pages";
/// Default global stylesheet.
pub const GLOBAL_STYLESHEET_FALLBACK: &str = "styles.css";

/// Root configuration for the page server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Runtime environment. Controls module caching and error detail.
    pub environment: Environment,

    /// Listener and request handling settings.
    pub server: ServerConfig,

    /// Layout of the build output and asset URLs.
    pub build: BuildConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Whether the server runs in production mode.
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Module cache policy for the current environment.
    ///
    /// Development bypasses the cache so rebuilt artifacts are picked up
    /// without a restart.
    pub fn cache_policy(&self) -> CachePolicy {
        match self.environment {
            Environment::Production => CachePolicy::Memoize,
            Environment::Development => CachePolicy::Bypass,
        }
    }
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment `{other}`")),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Total time allowed for a request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Build output layout, shared with the bundler.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildConfig {
    /// Base URL for client assets. Either an absolute path or a full URL,
    /// always ending in `/`.
    pub asset_base_url: String,

    /// Source root.
    pub root_dir: String,

    /// Build output directory. Contains `server/` and `client/`.
    pub out_dir: String,

    /// Public files directory.
    pub public_dir: String,

    /// Route directory, relative to the source root and to each output tree.
    pub route_dir: String,

    /// Stylesheet linked from every page.
    pub global_stylesheet: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            asset_base_url: ASSET_BASE_URL_FALLBACK.to_string(),
            root_dir: ROOT_DIR_FALLBACK.to_string(),
            out_dir: OUT_DIR_FALLBACK.to_string(),
            public_dir: PUBLIC_DIR_FALLBACK.to_string(),
            route_dir: ROUTE_DIR_FALLBACK.to_string(),
            global_stylesheet: GLOBAL_STYLESHEET_FALLBACK.to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log format. Unset means pretty in development, JSON in production.
    pub log_format: Option<LogFormat>,

    /// Enable the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Address of the Prometheus scrape endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: None,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
