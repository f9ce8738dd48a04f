//! Configuration management for Cloudkite
//!
//! Defaults, TOML file loading, and environment overrides. Environment
//! variables follow the pattern `CLOUDKITE_<SECTION>_<KEY>`, e.g.
//! `CLOUDKITE_LOGIN_ATTEMPTS=3`.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core_cloud::LoginPolicy;
use crate::logging::{LogConfig, LogLevel};

mod error;

pub use error::ConfigError;

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Login retry budget
    pub login: LoginPolicy,

    /// Credential storage configuration
    pub storage: StorageConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Credential storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for the file-backed secure store
    pub credential_dir: PathBuf,

    /// Name of the environment variable holding the storage passphrase.
    /// The passphrase itself never appears in config files.
    pub passphrase_env: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            credential_dir: PathBuf::from("./credentials"),
            passphrase_env: "CLOUDKITE_STORAGE_PASSPHRASE".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl From<&LoggingConfig> for LogConfig {
    /// Translate the config-file logging section into subscriber settings.
    /// An unparseable level falls back to the default; `validate()` rejects
    /// it before this conversion runs on a loaded config.
    fn from(config: &LoggingConfig) -> Self {
        LogConfig::new(LogLevel::parse(&config.level).unwrap_or_default())
            .json_format(config.json_format)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: Config =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables over the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(attempts) = env::var("CLOUDKITE_LOGIN_ATTEMPTS") {
            config.login.attempts = attempts
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("Invalid login attempts: {}", e)))?;
        }
        if let Ok(interval_ms) = env::var("CLOUDKITE_LOGIN_RETRY_INTERVAL_MS") {
            let millis: u64 = interval_ms.parse().map_err(|e| {
                ConfigError::InvalidValue(format!("Invalid login retry interval: {}", e))
            })?;
            config.login.retry_interval = Duration::from_millis(millis);
        }
        if let Ok(dir) = env::var("CLOUDKITE_STORAGE_CREDENTIAL_DIR") {
            config.storage.credential_dir = PathBuf::from(dir);
        }
        if let Ok(level) = env::var("CLOUDKITE_LOGGING_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = env::var("CLOUDKITE_LOGGING_JSON") {
            config.logging.json_format = json
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("Invalid JSON flag: {}", e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.login.attempts == 0 {
            return Err(ConfigError::ValidationFailed(
                "login.attempts must be at least 1".to_string(),
            ));
        }
        if self.login.retry_interval.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "login.retry_interval must be positive".to_string(),
            ));
        }
        if crate::logging::LogLevel::parse(&self.logging.level).is_none() {
            return Err(ConfigError::ValidationFailed(format!(
                "unknown log level: {}",
                self.logging.level
            )));
        }
        Ok(())
    }
}
