//! Runtime configuration for the to-do core.
//!
//! # Responsibility
//! - Provide defaults for storage, logging, seed fetch and worker settings.
//! - Read overrides from `TODO_*` environment variables.
//!
//! # Invariants
//! - `worker_count` is always within `1..=MAX_WORKERS` after `validated`.
//! - HTTP timeouts are at least one second after `validated`.
//! - Malformed numeric overrides are rejected, never silently ignored.

use crate::logging::default_log_level;
use crate::remote::DEFAULT_SEED_ENDPOINT;
use crate::runtime::MAX_WORKERS;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "TODO_DB_PATH";
pub const ENV_LOG_DIR: &str = "TODO_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "TODO_LOG_LEVEL";
pub const ENV_SEED_URL: &str = "TODO_SEED_URL";
pub const ENV_WORKERS: &str = "TODO_WORKERS";
pub const ENV_HTTP_CONNECT_TIMEOUT: &str = "TODO_HTTP_CONNECT_TIMEOUT_SECS";
pub const ENV_HTTP_READ_TIMEOUT: &str = "TODO_HTTP_READ_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
        }
    }
}

impl Error for ConfigError {}

/// Core settings. `db_path = None` selects an in-memory store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub db_path: Option<PathBuf>,
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
    pub seed_endpoint: String,
    pub worker_count: usize,
    pub http_connect_timeout_secs: u64,
    pub http_read_timeout_secs: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_dir: None,
            log_level: default_log_level().to_string(),
            seed_endpoint: DEFAULT_SEED_ENDPOINT.to_string(),
            worker_count: MAX_WORKERS,
            http_connect_timeout_secs: 10,
            http_read_timeout_secs: 20,
        }
    }
}

impl CoreConfig {
    /// Loads defaults overridden by process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads defaults overridden by `lookup(key)`; blank values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = get(ENV_DB_PATH) {
            config.db_path = Some(PathBuf::from(path));
        }
        if let Some(dir) = get(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(endpoint) = get(ENV_SEED_URL) {
            config.seed_endpoint = endpoint;
        }
        if let Some(value) = get(ENV_WORKERS) {
            config.worker_count = parse_number(ENV_WORKERS, &value)?;
        }
        if let Some(value) = get(ENV_HTTP_CONNECT_TIMEOUT) {
            config.http_connect_timeout_secs = parse_number(ENV_HTTP_CONNECT_TIMEOUT, &value)?;
        }
        if let Some(value) = get(ENV_HTTP_READ_TIMEOUT) {
            config.http_read_timeout_secs = parse_number(ENV_HTTP_READ_TIMEOUT, &value)?;
        }

        config.validated()
    }

    /// Clamps `worker_count` and rejects zero HTTP timeouts.
    ///
    /// Applied by `from_lookup` and by `TodoCore::open`, so deserialized
    /// configs go through the same checks.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.worker_count = self.worker_count.clamp(1, MAX_WORKERS);
        if self.http_connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_HTTP_CONNECT_TIMEOUT,
                value: "0".to_string(),
            });
        }
        if self.http_read_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_HTTP_READ_TIMEOUT,
                value: "0".to_string(),
            });
        }
        Ok(self)
    }

    pub fn http_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.http_connect_timeout_secs)
    }

    pub fn http_read_timeout(&self) -> Duration {
        Duration::from_secs(self.http_read_timeout_secs)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}
