//! Error kinds surfaced through completion channels.
//!
//! # Invariants
//! - Errors cross thread boundaries as values; nothing here is fatal.
//! - `Validation` failures never mutate state.
//! - `Network` failures never touch local data.

use crate::config::ConfigError;
use crate::model::task::TaskValidationError;
use crate::remote::NetworkError;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CoreResult<T> = Result<T, CoreError>;

/// Tagged failure delivered to callers of the service and sync APIs.
#[derive(Debug)]
pub enum CoreError {
    /// User input failed a precondition.
    Validation(TaskValidationError),
    /// Persistent read/write failure.
    Storage(StoreError),
    /// Seed fetch failure.
    Network(NetworkError),
    /// The runtime could not run the operation (shut down or job panicked).
    Unavailable(String),
    /// Startup settings were rejected.
    Config(ConfigError),
}

impl CoreError {
    /// Stable machine-readable code for logs and presentation mapping.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Storage(_) => "storage_error",
            Self::Network(_) => "network_error",
            Self::Unavailable(_) => "unavailable",
            Self::Config(_) => "config_error",
        }
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
            Self::Network(err) => write!(f, "{err}"),
            Self::Unavailable(reason) => write!(f, "operation unavailable: {reason}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::Network(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<TaskValidationError> for CoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for CoreError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}

impl From<NetworkError> for CoreError {
    fn from(value: NetworkError) -> Self {
        Self::Network(value)
    }
}

impl From<ConfigError> for CoreError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}
