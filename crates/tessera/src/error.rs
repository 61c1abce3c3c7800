//! Error types for the widget service.

use std::path::PathBuf;

use tessera_core::StoreError;

/// Result type alias for widget operations.
pub type WidgetResult<T> = std::result::Result<T, WidgetError>;

/// Errors that can occur in the widget service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WidgetError {
    /// Error raised by the entity store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An area query was partial or had a non-positive extent.
    #[error("Invalid area query: {message}")]
    InvalidQuery { message: String },

    /// Widget geometry was rejected.
    #[error("Invalid value for '{field}': {message}")]
    InvalidGeometry { field: &'static str, message: String },
}

impl WidgetError {
    /// Create a query error.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Create a geometry error.
    pub fn invalid_geometry(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            field,
            message: message.into(),
        }
    }

    /// Returns `true` if the referenced widget does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(err) if err.is_not_found())
    }
}

/// Result type alias for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading service configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("Failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid value for '{key}': {message}")]
    Invalid { key: &'static str, message: String },
}

impl ConfigError {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a value error.
    pub fn invalid(key: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            message: message.into(),
        }
    }
}
