//! # blendplus-ops
//!
//! Blend modes, overlay placement and the compositor.
//!
//! Work happens in two phases. The configuration phase runs once per
//! settings change: [`configure`] acquires the overlay, places it on a
//! canvas-sized surface and freezes everything in a [`RenderConfig`]. The
//! render phase then blends any number of regions against that snapshot,
//! concurrently if the caller wants.
//!
//! # Modules
//!
//! - [`blend`] - The 39 per-pixel blend functions and the alpha rule
//! - [`hsv`] - HSV conversion for the Hue, Saturation, Color and Luminosity modes
//! - [`resize`] - Separable filter resampler
//! - [`placement`] - Fill, Fit, Stretch and Center geometry
//! - [`configure`] - Effect settings, YAML presets and the configuration phase
//! - [`render`] - Region compositor with cooperative cancellation
//! - [`parallel`] - Rayon tile driver (feature `parallel`)
//!
//! # Example
//!
//! ```rust
//! use blendplus_core::Pixel;
//! use blendplus_ops::{blend, BlendMode};
//!
//! let base = Pixel::opaque(200, 100, 50);
//! let overlay = Pixel::opaque(100, 100, 100);
//! let out = blend(base, overlay, BlendMode::Multiply);
//! assert_eq!(out, Pixel::opaque(78, 39, 19));
//! ```
//!
//! ## Full pipeline
//!
//! ```rust,ignore
//! use blendplus_io::ImageProvider;
//! use blendplus_ops::{configure, parallel, EffectSettings, FilterResampler};
//! use blendplus_ops::render::NeverCancel;
//!
//! let settings = EffectSettings::from_file("paper.yaml")?;
//! let config = configure(&settings, base.dimensions(), base.bounds(),
//!     &ImageProvider::new(), &FilterResampler::default());
//! let mut out = Surface::new(base.width(), base.height());
//! parallel::render_tiles(&mut out, &base, &config, base.bounds(), 64, &NeverCancel)?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod blend;
pub mod configure;
pub mod hsv;
pub mod placement;
pub mod render;
pub mod resize;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use blend::{blend, BlendMode};
pub use configure::{configure, EffectSettings};
pub use error::{OpsError, OpsResult};
pub use placement::{place, plan, PlacementPlan, PlacementPolicy};
pub use render::{
    render, render_surface, CancelFlag, CancelToken, NeverCancel, Overlay, RenderConfig,
    RenderStatus,
};
pub use resize::{resize, Filter, FilterResampler, Resampler};
