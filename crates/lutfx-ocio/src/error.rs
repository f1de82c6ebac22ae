//! Error types for OCIO config reading.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for OCIO operations.
pub type OcioResult<T> = Result<T, OcioError>;

/// Errors that can occur while reading an OCIO config.
#[derive(Debug, Error)]
pub enum OcioError {
    /// I/O error reading the config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Config file not found.
    #[error("config file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched.
        path: PathBuf,
    },

    /// The document parsed but is not an OCIO config.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
