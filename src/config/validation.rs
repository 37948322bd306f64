//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate asset URL shape and directory names
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("server.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("server.request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("build.assetBaseUrl `{0}` must start with `/` or a scheme and end with `/`")]
    AssetBaseUrl(String),

    #[error("build.{field} must not be empty")]
    EmptyDirectory { field: &'static str },

    #[error("build.routeDir `{0}` must be a relative path without leading or trailing `/`")]
    RouteDir(String),

    #[error("build.globalStylesheet `{0}` must name a .css file")]
    GlobalStylesheet(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.server.bind_address.clone()));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let build = &config.build;
    let url = &build.asset_base_url;
    if !(url.starts_with('/') || url.contains("://")) || !url.ends_with('/') {
        errors.push(ValidationError::AssetBaseUrl(url.clone()));
    }

    for (field, value) in [
        ("rootDir", &build.root_dir),
        ("outDir", &build.out_dir),
        ("publicDir", &build.public_dir),
        ("routeDir", &build.route_dir),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::EmptyDirectory { field });
        }
    }
    if !build.route_dir.is_empty()
        && (build.route_dir.starts_with('/') || build.route_dir.ends_with('/'))
    {
        errors.push(ValidationError::RouteDir(build.route_dir.clone()));
    }

    if !build.global_stylesheet.ends_with(".css") {
        errors.push(ValidationError::GlobalStylesheet(build.global_stylesheet.clone()));
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(observability.metrics_address.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
