//! # Data Error Types
//!
//! Errors raised while loading configuration, tax tables and reference data.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  io / toml / serde_json errors      ValidationError (larder-core)      │
//! │       │                                   │                             │
//! │       └──────────────┬────────────────────┘                             │
//! │                      ▼                                                  │
//! │  DataError (this module) ← Adds the file or entity that failed         │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │  costing-report prints it and exits non-zero                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use larder_core::ValidationError;
use thiserror::Error;

/// Result type for data operations.
pub type DataResult<T> = Result<T, DataError>;

/// Reference data and configuration errors.
#[derive(Debug, Error)]
pub enum DataError {
    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A TOML config file or tax table did not parse.
    #[error("Invalid TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Config could not be written back as TOML.
    #[error("Failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A JSON fixture did not parse, or report output failed.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration parsed but is not usable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reference data failed domain validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Looked-up entity is not in the store.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },
}

impl DataError {
    /// Wraps an I/O error with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DataError::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DataError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            DataError::TomlParse(_) | DataError::TomlSerialize(_) | DataError::InvalidConfig(_)
        )
    }
}
