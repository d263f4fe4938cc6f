//! Configuration loading for bridge-dart.
//!
//! The host process points `PORTBRIDGE_CONFIG` at a TOML file. Without it
//! the defaults apply: an in-memory store, a small worker pool and `info`
//! logging.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "PORTBRIDGE_CONFIG";

/// Root configuration for the bridge.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BridgeConfig {
    /// Engine store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Worker runtime configuration.
    #[serde(default)]
    pub runtime: RuntimeConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Engine store configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Backing TOML file for the config store (in memory when unset).
    pub path: Option<PathBuf>,
}

/// Worker runtime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    /// Async worker threads (default: 1).
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
    /// Upper bound on threads running dispatched calls (default: 8).
    #[serde(default = "default_max_blocking_threads")]
    pub max_blocking_threads: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter used when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

// Default value functions
fn default_worker_threads() -> usize {
    1
}

fn default_max_blocking_threads() -> usize {
    8
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: default_worker_threads(),
            max_blocking_threads: default_max_blocking_threads(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or holds
    /// unusable values.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by `PORTBRIDGE_CONFIG`, or the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Check values the runtime builder would reject.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runtime.worker_threads == 0 {
            return Err(ConfigError::Invalid(
                "runtime.worker_threads must be at least 1".to_string(),
            ));
        }
        if self.runtime.max_blocking_threads == 0 {
            return Err(ConfigError::Invalid(
                "runtime.max_blocking_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}
