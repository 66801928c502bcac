use serde::{Deserialize, Serialize};
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_RESOURCE_DATA_PATH: &str = "RESOURCE_DATA_PATH";
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_API_HOST: &str = "API_HOST";
pub const ENV_API_PORT: &str = "API_PORT";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const SQLITE_SCHEME: &str = "sqlite://";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API_PORT must be a port number, got '{0}'")]
    InvalidPort(String),
    #[error("LOG_LEVEL must be one of trace|debug|info|warn|error, got '{0}'")]
    InvalidLogLevel(String),
    #[error("invalid listen address: {0}")]
    InvalidAddress(#[from] AddrParseError),
}

/// Runtime settings, read from the environment with fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmConfig {
    /// Directory holding `machinery.json`, `personnel.json` and `usage_log.json`.
    pub resource_data_path: PathBuf,
    pub database_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub log_level: String,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            resource_data_path: PathBuf::from("resource_data"),
            database_url: "sqlite://farm_manager.db".to_string(),
            api_host: "127.0.0.1".to_string(),
            api_port: 8000,
            log_level: "info".to_string(),
        }
    }
}

impl FarmConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; blank values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get(ENV_RESOURCE_DATA_PATH) {
            config.resource_data_path = PathBuf::from(path);
        }
        if let Some(url) = get(ENV_DATABASE_URL) {
            config.database_url = url;
        }
        if let Some(host) = get(ENV_API_HOST) {
            config.api_host = host;
        }
        if let Some(port) = get(ENV_API_PORT) {
            config.api_port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            let normalized = level.trim().to_ascii_lowercase();
            if !LOG_LEVELS.contains(&normalized.as_str()) {
                return Err(ConfigError::InvalidLogLevel(level));
            }
            config.log_level = normalized;
        }
        Ok(config)
    }

    pub fn http_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(format!("{}:{}", self.api_host, self.api_port).parse()?)
    }

    /// Filesystem path of the database when `database_url` uses the sqlite scheme.
    pub fn sqlite_path(&self) -> Option<PathBuf> {
        self.database_url
            .strip_prefix(SQLITE_SCHEME)
            .map(|rest| rest.strip_prefix('/').unwrap_or(rest))
            .filter(|rest| !rest.is_empty())
            .map(PathBuf::from)
    }
}
