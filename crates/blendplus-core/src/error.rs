//! Error types for blendplus-core operations.
//!
//! The [`Error`] enum covers the failure modes of buffer construction and
//! region handling:
//! - Surface allocation from raw buffers (length checks)
//! - Bounds checking of pixel coordinates and regions
//! - Row-band views that do not cover a requested region
//!
//! # Usage
//!
//! ```rust
//! use blendplus_core::{Error, Result};
//!
//! fn check_pixel(x: u32, y: u32, width: u32, height: u32) -> Result<()> {
//!     if x >= width || y >= height {
//!         return Err(Error::out_of_bounds(x, y, width, height));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or addressing surfaces.
#[derive(Debug, Error)]
pub enum Error {
    /// Pixel coordinates are outside surface bounds.
    #[error("pixel ({x}, {y}) out of bounds for surface {width}x{height}")]
    OutOfBounds {
        /// X coordinate that was out of bounds
        x: u32,
        /// Y coordinate that was out of bounds
        y: u32,
        /// Surface width
        width: u32,
        /// Surface height
        height: u32,
    },

    /// Region extends beyond the bounds it must fit in.
    ///
    /// Returned when a [`crate::rect::Rect`] does not fit within a surface
    /// or within the rows covered by a [`crate::surface::RowsMut`] band.
    #[error("region ({rx}, {ry}, {rw}x{rh}) exceeds bounds {width}x{height}")]
    InvalidRegion {
        /// Region X origin
        rx: u32,
        /// Region Y origin
        ry: u32,
        /// Region width
        rw: u32,
        /// Region height
        rh: u32,
        /// Bounds width
        width: u32,
        /// Bounds height
        height: u32,
    },

    /// Surface dimensions don't match for the operation.
    #[error("dimension mismatch: {a_width}x{a_height} vs {b_width}x{b_height}")]
    DimensionMismatch {
        /// First surface width
        a_width: u32,
        /// First surface height
        a_height: u32,
        /// Second surface width
        b_width: u32,
        /// Second surface height
        b_height: u32,
    },

    /// Invalid surface dimensions.
    ///
    /// Returned when dimensions would overflow buffer size calculations or
    /// a zero-sized surface is passed where content is required.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Raw buffer length does not match the declared dimensions.
    #[error("buffer length mismatch: expected {expected} elements, got {got}")]
    BufferLength {
        /// Expected element count
        expected: usize,
        /// Actual element count
        got: usize,
    },
}

impl Error {
    /// Creates an [`Error::OutOfBounds`] error.
    #[inline]
    pub fn out_of_bounds(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::OutOfBounds {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates an [`Error::InvalidRegion`] error.
    #[inline]
    pub fn invalid_region(region: crate::Rect, width: u32, height: u32) -> Self {
        Self::InvalidRegion {
            rx: region.x,
            ry: region.y,
            rw: region.width,
            rh: region.height,
            width,
            height,
        }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::DimensionMismatch`] error.
    #[inline]
    pub fn dimension_mismatch(a: (u32, u32), b: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            a_width: a.0,
            a_height: a.1,
            b_width: b.0,
            b_height: b.1,
        }
    }

    /// Returns `true` if this is a bounds-related error.
    #[inline]
    pub fn is_bounds_error(&self) -> bool {
        matches!(self, Self::OutOfBounds { .. } | Self::InvalidRegion { .. })
    }
}
