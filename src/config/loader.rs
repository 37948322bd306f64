//! Configuration loading from disk and environment.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{AppConfig, Environment};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable selecting development or production.
pub const ENV_VAR: &str = "APP_ENV";
/// Environment variable overriding the listen port.
pub const PORT_VAR: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {var}: {message}")]
    Env { var: &'static str, message: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load the config file if it exists, otherwise start from defaults, then
/// apply environment overrides and validate the result.
pub fn load_or_default(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = if path.exists() {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)?
    } else {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        AppConfig::default()
    };

    let config = apply_env_overrides(config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply `APP_ENV` and `PORT` on top of a parsed config.
///
/// The lookup is injected so tests don't have to touch the process environment.
pub fn apply_env_overrides(
    mut config: AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig, ConfigError> {
    if let Some(env) = lookup(ENV_VAR) {
        config.environment = env
            .parse::<Environment>()
            .map_err(|message| ConfigError::Env { var: ENV_VAR, message })?;
    }

    if let Some(port) = lookup(PORT_VAR) {
        let port: u16 = port.parse().map_err(|_| ConfigError::Env {
            var: PORT_VAR,
            message: format!("`{port}` is not a port number"),
        })?;
        let host = config
            .server
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.server.bind_address = format!("{host}:{port}");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [server]
            bind_address = "127.0.0.1:4000"

            [build]
            routeDir = "routes"
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:4000");
        assert_eq!(config.build.route_dir, "routes");
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nrequest_timeout_secs = 0").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_or_default(&dir.path().join("app.config.toml")).unwrap();
        assert_eq!(config.build, crate::config::BuildConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = apply_env_overrides(AppConfig::default(), |var| match var {
            "APP_ENV" => Some("production".into()),
            "PORT" => Some("8081".into()),
            _ => None,
        })
        .unwrap();

        assert!(config.is_production());
        assert_eq!(config.server.bind_address, "0.0.0.0:8081");
    }

    #[test]
    fn test_bad_port_override() {
        let err = apply_env_overrides(AppConfig::default(), |var| {
            (var == "PORT").then(|| "http".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "PORT", .. }));
    }
}
