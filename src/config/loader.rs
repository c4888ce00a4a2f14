//! Configuration loading from disk and the environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{Environment, GatewayConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable holding the upstream bearer credential.
pub const ENV_TOKEN: &str = "TMDB_TOKEN";
/// Environment variable overriding the upstream base URL.
pub const ENV_BASE_URL: &str = "TMDB_BASE_URL";
/// Environment variable overriding the listen port.
pub const ENV_PORT: &str = "PORT";
/// Environment variable selecting the deployment environment.
pub const ENV_MODE: &str = "APP_ENV";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {message}")]
    Env { key: &'static str, message: String },

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

/// Parse a configuration file without validating it.
pub fn read_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment variables onto a configuration.
///
/// `lookup` abstracts the process environment so callers can pass
/// `std::env::var(..).ok()` or a fixed map.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup(ENV_TOKEN) {
        config.upstream.bearer_token = if token.is_empty() { None } else { Some(token) };
    }

    if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
        config.upstream.base_url = base_url;
    }

    if let Some(port) = lookup(ENV_PORT).filter(|v| !v.is_empty()) {
        let port: u16 = port.trim().parse().map_err(|_| ConfigError::Env {
            key: ENV_PORT,
            message: format!("'{}' is not a port number", port),
        })?;
        config.listener.bind_address = with_port(&config.listener.bind_address, port)?;
    }

    if let Some(mode) = lookup(ENV_MODE) {
        config.observability.environment = Environment::from_name(&mode);
    }

    Ok(())
}

fn with_port(bind_address: &str, port: u16) -> Result<String, ConfigError> {
    let mut addr: SocketAddr = bind_address.parse().map_err(|_| ConfigError::Env {
        key: ENV_PORT,
        message: format!("cannot apply to bind address '{}'", bind_address),
    })?;
    addr.set_port(port);
    Ok(addr.to_string())
}

/// Build the effective configuration: file (or defaults), then environment,
/// then validation.
pub fn resolve_config<F>(path: Option<&Path>, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => GatewayConfig::default(),
    };
    apply_env_overrides(&mut config, lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("TMDB_TOKEN", "secret"),
                ("PORT", "8088"),
                ("APP_ENV", "production"),
                ("TMDB_BASE_URL", "http://127.0.0.1:9000/3"),
            ]),
        )
        .unwrap();

        assert_eq!(config.upstream.token(), Some("secret"));
        assert_eq!(config.listener.bind_address, "0.0.0.0:8088");
        assert!(config.observability.is_production());
        assert_eq!(config.upstream.base_url, "http://127.0.0.1:9000/3");
    }

    #[test]
    fn test_empty_token_clears_file_token() {
        let mut config = GatewayConfig::default();
        config.upstream.bearer_token = Some("from-file".into());
        apply_env_overrides(&mut config, env(&[("TMDB_TOKEN", "")])).unwrap();
        assert!(config.upstream.bearer_token.is_none());
    }

    #[test]
    fn test_no_env_leaves_config_untouched() {
        let mut config = GatewayConfig::default();
        apply_env_overrides(&mut config, env(&[])).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:3000");
        assert!(config.upstream.bearer_token.is_none());
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let mut config = GatewayConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Env { key: "PORT", .. }));
    }

    #[test]
    fn test_resolve_reports_validation_errors() {
        let err = resolve_config(None, env(&[("TMDB_BASE_URL", "not a url")])).unwrap_err();
        match err {
            ConfigError::Validation(errors) => assert_eq!(errors[0].field, "upstream.base_url"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
