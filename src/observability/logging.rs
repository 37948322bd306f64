//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once at startup
//! - Pick the output format for the environment
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the built-in filter
//! - JSON in production, pretty output in development

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{AppConfig, LogFormat};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "pagewright=debug,tower_http=debug";

/// Output format for the given config.
pub fn log_format(config: &AppConfig) -> LogFormat {
    config.observability.log_format.unwrap_or(if config.is_production() {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    })
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    let result = match log_format(config) {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    };

    if result.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}
