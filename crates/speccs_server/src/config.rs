//! Environment-driven server configuration.
//!
//! # Invariants
//! - An optional `.env` file is loaded first; variables already set in the
//!   process environment win.
//! - Unset variables fall back to defaults; malformed ones are errors.

use log::debug;
use speccs_core::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, SocketAddr};

pub const DEFAULT_DATABASE_URL: &str = "sqlite://speccs.sqlite3";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Absolute directory for rotated log files; stderr when unset.
    pub log_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidHost(String),
    InvalidPort(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidHost(value) => write!(f, "HOST must be an IP address, got `{value}`"),
            Self::InvalidPort(value) => {
                write!(f, "PORT must be an integer in 1..=65535, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl ServerConfig {
    /// Loads `.env` when present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("event=config_env_file module=server status=ok path={}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let host_text = value("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host: IpAddr = host_text
            .parse()
            .map_err(|_| ConfigError::InvalidHost(host_text.clone()))?;

        let port = match value("PORT") {
            Some(text) => match text.parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => return Err(ConfigError::InvalidPort(text)),
            },
            None => DEFAULT_PORT,
        };

        Ok(Self {
            database_url: value("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            bind_addr: SocketAddr::new(host, port),
            log_level: value("LOG_LEVEL").unwrap_or_else(|| default_log_level().to_string()),
            log_dir: value("LOG_DIR"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, ServerConfig, DEFAULT_DATABASE_URL};
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_listen_on_port_5000() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.bind_addr.ip().to_string(), "0.0.0.0");
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "sqlite:///data/speccs.sqlite3"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("LOG_LEVEL", "warn"),
            ("LOG_DIR", "/var/log/speccs"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite:///data/speccs.sqlite3");
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/speccs"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = config_from(&[("PORT", "  "), ("LOG_DIR", "")]).unwrap();
        assert_eq!(config.bind_addr.port(), 5000);
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn postgres_variables_are_ignored() {
        let config = config_from(&[
            ("POSTGRES_USER", "speccs"),
            ("POSTGRES_PASSWORD", "secret"),
            ("POSTGRES_DB", "inventory"),
        ])
        .unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn rejects_malformed_values() {
        assert_eq!(
            config_from(&[("PORT", "http")]).unwrap_err(),
            ConfigError::InvalidPort("http".to_string())
        );
        assert_eq!(
            config_from(&[("PORT", "0")]).unwrap_err(),
            ConfigError::InvalidPort("0".to_string())
        );
        assert!(matches!(
            config_from(&[("HOST", "localhost")]).unwrap_err(),
            ConfigError::InvalidHost(_)
        ));
    }
}
