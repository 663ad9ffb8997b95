//! Error types for schema registry and settings loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or querying the schema catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    /// Failed to read or write a registry/settings file.
    #[error("failed to access file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Registry or settings TOML could not be parsed.
    #[error("failed to parse TOML {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Settings could not be serialized.
    #[error("failed to serialize settings: {source}")]
    Serialize {
        #[source]
        source: toml::ser::Error,
    },

    /// Two types share a name (case-insensitive).
    #[error("duplicate type '{name}' in schema registry")]
    DuplicateType { name: String },

    /// Two fields of one type share a name (case-insensitive).
    #[error("duplicate field '{field}' in type '{data_type}'")]
    DuplicateField { data_type: String, field: String },

    /// A type or field has an empty name.
    #[error("invalid schema registry: {message}")]
    InvalidRegistry { message: String },

    /// The requested type is not in the registry.
    #[error("unknown data type: {name}")]
    TypeNotFound { name: String },
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
