//! Error types for image acquisition.
//!
//! Provides unified error handling for file, memory and clipboard sources.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// I/O operation error.
#[derive(Debug, Error)]
pub enum IoError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Source file does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Unsupported format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error.
    #[error("decode error: {0}")]
    DecodeError(String),

    /// Encoding error.
    #[error("encode error: {0}")]
    EncodeError(String),

    /// Clipboard holds no image payload.
    #[error("clipboard holds no image")]
    ClipboardEmpty,

    /// No clipboard reader was configured, or the reader failed.
    #[error("clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    /// Decoded image could not be turned into a surface.
    #[error(transparent)]
    Core(#[from] blendplus_core::Error),
}

/// Result type for I/O operations.
pub type IoResult<T> = Result<T, IoError>;

impl From<image::ImageError> for IoError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => IoError::Io(e),
            image::ImageError::Unsupported(e) => IoError::UnsupportedFormat(e.to_string()),
            image::ImageError::Encoding(e) => IoError::EncodeError(e.to_string()),
            other => IoError::DecodeError(other.to_string()),
        }
    }
}
