//! Error types for lookup-table and configuration loading.
//!
//! Provides a unified error type covering I/O, YAML/JSON parsing, and
//! malformed table entries.

use thiserror::Error;

/// Errors that can occur while loading tables or settings.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A table line or mapping entry could not be interpreted.
    #[error("invalid table entry: {0}")]
    InvalidEntry(String),
}

/// Convenience alias for results with [`RegistryError`].
pub type Result<T> = std::result::Result<T, RegistryError>;
