//! # blendplus-core
//!
//! Core types for BlendPlus image compositing.
//!
//! This crate provides the foundational types shared by every BlendPlus crate:
//!
//! - [`Pixel`] - 8-bit RGBA value type
//! - [`Surface`] - Owned row-major pixel buffer
//! - [`RowsMut`] - Mutable view over a contiguous band of full surface rows
//! - [`Rect`] - Integer rectangle for selections and render tiles
//!
//! ## Crate Structure
//!
//! This crate has no internal dependencies. The other crates build on it:
//!
//! ```text
//! blendplus-core (this crate)
//!    ^
//!    |
//!    +-- blendplus-ops (blend modes, placement, compositor)
//!    +-- blendplus-io (image acquisition)
//!    +-- blendplus-cli
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod pixel;
pub mod rect;
pub mod surface;

// Re-exports for convenience
pub use error::*;
pub use pixel::{clamp_byte, clamp_byte_f32, Pixel};
pub use rect::*;
pub use surface::*;

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use blendplus_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::pixel::Pixel;
    pub use crate::rect::Rect;
    pub use crate::surface::{RowsMut, Surface};
}
