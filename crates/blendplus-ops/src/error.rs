//! Error types for compositing operations.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for compositing operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Invalid dimensions specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Surfaces have incompatible sizes.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Preset file does not exist.
    #[error("preset not found: {}", .path.display())]
    PresetNotFound {
        /// Path that was searched.
        path: PathBuf,
    },

    /// I/O error reading a preset.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Overlay image could not be acquired.
    #[error("overlay acquisition failed: {0}")]
    Acquire(#[from] blendplus_io::IoError),

    /// Error raised by a core buffer operation.
    #[error(transparent)]
    Core(#[from] blendplus_core::Error),
}

/// Result type for compositing operations.
pub type OpsResult<T> = Result<T, OpsError>;
