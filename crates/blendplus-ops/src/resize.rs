//! Surface resampling.
//!
//! Placement never scales pixels itself; it asks a [`Resampler`] for a
//! surface of the target size. [`FilterResampler`] is the stock
//! implementation: a two-pass separable filter over premultiplied `f32`
//! samples, so transparent pixels do not bleed their color into neighbours.
//!
//! # Filters
//!
//! - [`Filter::Nearest`] - Fastest, no interpolation (blocky)
//! - [`Filter::Bilinear`] - Linear interpolation (smooth but blurry)
//! - [`Filter::Bicubic`] - Cubic interpolation (sharper than bilinear)
//! - [`Filter::Lanczos3`] - High-quality sinc-based (best for downscaling)
//!
//! # Example
//!
//! ```rust
//! use blendplus_core::{Pixel, Surface};
//! use blendplus_ops::resize::{Filter, FilterResampler, Resampler};
//!
//! let src = Surface::filled(64, 64, Pixel::opaque(10, 20, 30));
//! let dst = FilterResampler::new(Filter::Lanczos3).resample(&src, 128, 96).unwrap();
//! assert_eq!(dst.dimensions(), (128, 96));
//! ```

use std::fmt;
use std::str::FromStr;

use blendplus_core::{clamp_byte_f32, Pixel, Surface};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{OpsError, OpsResult};

/// Resamples a surface to a new size.
///
/// Implementations must return a surface of exactly `width x height`.
pub trait Resampler: Send + Sync {
    /// Produces a `width x height` version of `src`.
    fn resample(&self, src: &Surface, width: u32, height: u32) -> OpsResult<Surface>;
}

/// Resampling filter for resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Filter {
    /// Nearest-neighbor (fastest, no interpolation).
    Nearest,
    /// Bilinear interpolation (smooth, fast).
    Bilinear,
    /// Bicubic interpolation (sharper than bilinear).
    #[default]
    Bicubic,
    /// Lanczos-3 (high quality, best for downscaling).
    Lanczos3,
}

impl Filter {
    /// All filters.
    pub const ALL: [Filter; 4] = [
        Filter::Nearest,
        Filter::Bilinear,
        Filter::Bicubic,
        Filter::Lanczos3,
    ];

    /// Returns the support radius for this filter.
    #[inline]
    pub fn support(&self) -> f32 {
        match self {
            Filter::Nearest => 0.5,
            Filter::Bilinear => 1.0,
            Filter::Bicubic => 2.0,
            Filter::Lanczos3 => 3.0,
        }
    }

    /// Evaluates the filter kernel at position x.
    #[inline]
    pub fn weight(&self, x: f32) -> f32 {
        match self {
            Filter::Nearest => nearest_weight(x),
            Filter::Bilinear => bilinear_weight(x),
            Filter::Bicubic => bicubic_weight(x),
            Filter::Lanczos3 => lanczos_weight(x, 3.0),
        }
    }

    /// Lowercase name as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Filter::Nearest => "nearest",
            Filter::Bilinear => "bilinear",
            Filter::Bicubic => "bicubic",
            Filter::Lanczos3 => "lanczos3",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Filter {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" | "point" => Ok(Filter::Nearest),
            "bilinear" | "linear" | "triangle" => Ok(Filter::Bilinear),
            "bicubic" | "cubic" | "mitchell" => Ok(Filter::Bicubic),
            "lanczos3" | "lanczos" => Ok(Filter::Lanczos3),
            _ => Err(OpsError::InvalidParameter(format!("unknown filter '{s}'"))),
        }
    }
}

/// Nearest-neighbor weight function. Half-open so ties pick one sample.
#[inline]
fn nearest_weight(x: f32) -> f32 {
    if (-0.5..0.5).contains(&x) { 1.0 } else { 0.0 }
}

/// Bilinear (triangle) weight function.
#[inline]
fn bilinear_weight(x: f32) -> f32 {
    let ax = x.abs();
    if ax < 1.0 { 1.0 - ax } else { 0.0 }
}

/// Bicubic (Mitchell-Netravali) weight function.
#[inline]
fn bicubic_weight(x: f32) -> f32 {
    // Mitchell-Netravali with B=1/3, C=1/3
    const B: f32 = 1.0 / 3.0;
    const C: f32 = 1.0 / 3.0;

    let ax = x.abs();
    if ax < 1.0 {
        ((12.0 - 9.0 * B - 6.0 * C) * ax * ax * ax
            + (-18.0 + 12.0 * B + 6.0 * C) * ax * ax
            + (6.0 - 2.0 * B))
            / 6.0
    } else if ax < 2.0 {
        ((-B - 6.0 * C) * ax * ax * ax
            + (6.0 * B + 30.0 * C) * ax * ax
            + (-12.0 * B - 48.0 * C) * ax
            + (8.0 * B + 24.0 * C))
            / 6.0
    } else {
        0.0
    }
}

/// Lanczos weight function.
#[inline]
fn lanczos_weight(x: f32, a: f32) -> f32 {
    let ax = x.abs();
    if ax < 1e-8 {
        1.0
    } else if ax < a {
        let pi_x = std::f32::consts::PI * ax;
        let pi_x_a = pi_x / a;
        (pi_x.sin() / pi_x) * (pi_x_a.sin() / pi_x_a)
    } else {
        0.0
    }
}

/// Separable filter resampler over premultiplied float samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterResampler {
    /// Kernel used in both passes.
    pub filter: Filter,
}

impl FilterResampler {
    /// Creates a resampler using `filter`.
    pub const fn new(filter: Filter) -> Self {
        Self { filter }
    }
}

impl Resampler for FilterResampler {
    fn resample(&self, src: &Surface, width: u32, height: u32) -> OpsResult<Surface> {
        resize(src, width, height, self.filter)
    }
}

/// Resizes a surface with the given filter.
///
/// A request for the source size returns an unfiltered copy.
pub fn resize(src: &Surface, width: u32, height: u32, filter: Filter) -> OpsResult<Surface> {
    if width == 0 || height == 0 {
        return Err(OpsError::InvalidDimensions(
            "destination size must be > 0".into(),
        ));
    }
    if src.is_empty() {
        return Err(OpsError::InvalidDimensions("source surface is empty".into()));
    }
    if src.dimensions() == (width, height) {
        return Ok(src.clone());
    }

    trace!(
        src_w = src.width(),
        src_h = src.height(),
        dst_w = width,
        dst_h = height,
        ?filter,
        "resize"
    );

    let premul: Vec<[f32; 4]> = src.pixels().iter().map(|&p| premultiply(p)).collect();
    let (sw, sh) = (src.width() as usize, src.height() as usize);
    let (dw, dh) = (width as usize, height as usize);

    // Two-pass separable resize: horizontal then vertical
    let temp = resize_horizontal(&premul, sw, sh, dw, filter);
    let result = resize_vertical(&temp, dw, sh, dh, filter);

    let pixels = result.into_iter().map(unpremultiply).collect();
    Ok(Surface::from_pixels(width, height, pixels)?)
}

#[inline]
fn premultiply(p: Pixel) -> [f32; 4] {
    let a = p.a as f32 / 255.0;
    [
        p.r as f32 / 255.0 * a,
        p.g as f32 / 255.0 * a,
        p.b as f32 / 255.0 * a,
        a,
    ]
}

#[inline]
fn unpremultiply(v: [f32; 4]) -> Pixel {
    let a = v[3].clamp(0.0, 1.0);
    if a <= 0.0 {
        return Pixel::TRANSPARENT;
    }
    let c = |x: f32| clamp_byte_f32((x / a).clamp(0.0, 1.0) * 255.0);
    Pixel::new(c(v[0]), c(v[1]), c(v[2]), clamp_byte_f32(a * 255.0))
}

/// Filter taps for one destination coordinate along one axis.
fn taps(dst_pos: usize, scale: f32, src_len: usize, filter: Filter) -> (usize, Vec<f32>) {
    let support = filter.support() * scale.max(1.0);
    // Map destination coordinate to source coordinate
    let center = (dst_pos as f32 + 0.5) * scale - 0.5;
    let left = ((center - support).floor() as isize).max(0) as usize;
    let right = ((center + support).ceil().max(0.0) as usize).min(src_len - 1);

    let mut weights: Vec<f32> = (left..=right)
        .map(|s| filter.weight((s as f32 - center) / scale.max(1.0)))
        .collect();
    let sum: f32 = weights.iter().sum();

    if sum.abs() > 1e-8 {
        for w in &mut weights {
            *w /= sum;
        }
        (left, weights)
    } else {
        // Degenerate kernel: fall back to the closest sample
        let nearest = (center.round().max(0.0) as usize).min(src_len - 1);
        (nearest, vec![1.0])
    }
}

/// Horizontal resize pass.
fn resize_horizontal(
    src: &[[f32; 4]],
    src_w: usize,
    src_h: usize,
    dst_w: usize,
    filter: Filter,
) -> Vec<[f32; 4]> {
    let mut dst = vec![[0.0f32; 4]; dst_w * src_h];
    let scale = src_w as f32 / dst_w as f32;
    let kernels: Vec<_> = (0..dst_w).map(|x| taps(x, scale, src_w, filter)).collect();

    for y in 0..src_h {
        let row = &src[y * src_w..(y + 1) * src_w];
        for (x, (start, weights)) in kernels.iter().enumerate() {
            let mut sum = [0.0f32; 4];
            for (i, w) in weights.iter().enumerate() {
                let s = row[start + i];
                for c in 0..4 {
                    sum[c] += s[c] * w;
                }
            }
            dst[y * dst_w + x] = sum;
        }
    }

    dst
}

/// Vertical resize pass.
fn resize_vertical(
    src: &[[f32; 4]],
    src_w: usize,
    src_h: usize,
    dst_h: usize,
    filter: Filter,
) -> Vec<[f32; 4]> {
    let mut dst = vec![[0.0f32; 4]; src_w * dst_h];
    let scale = src_h as f32 / dst_h as f32;

    for y in 0..dst_h {
        let (start, weights) = taps(y, scale, src_h, filter);
        for x in 0..src_w {
            let mut sum = [0.0f32; 4];
            for (i, w) in weights.iter().enumerate() {
                let s = src[(start + i) * src_w + x];
                for c in 0..4 {
                    sum[c] += s[c] * w;
                }
            }
            dst[y * src_w + x] = sum;
        }
    }

    dst
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_filter_weights() {
        // Nearest at center
        assert_abs_diff_eq!(Filter::Nearest.weight(0.0), 1.0);
        assert_abs_diff_eq!(Filter::Nearest.weight(0.6), 0.0);
        assert_abs_diff_eq!(Filter::Nearest.weight(-0.5), 1.0);
        assert_abs_diff_eq!(Filter::Nearest.weight(0.5), 0.0);

        // Bilinear at center
        assert_abs_diff_eq!(Filter::Bilinear.weight(0.0), 1.0);
        assert_abs_diff_eq!(Filter::Bilinear.weight(0.5), 0.5);

        // Lanczos at center
        assert_abs_diff_eq!(Filter::Lanczos3.weight(0.0), 1.0);
        assert_abs_diff_eq!(Filter::Lanczos3.weight(3.5), 0.0);
    }

    #[test]
    fn test_same_size_is_copy() {
        let mut src = Surface::new(3, 2);
        src.set_pixel(1, 1, Pixel::new(1, 2, 3, 4)).unwrap();
        let dst = resize(&src, 3, 2, Filter::Lanczos3).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn test_constant_stays_constant() {
        let px = Pixel::new(120, 60, 200, 255);
        let src = Surface::filled(4, 4, px);
        for filter in Filter::ALL {
            for (w, h) in [(8, 8), (2, 2), (7, 3), (1, 1)] {
                let dst = resize(&src, w, h, filter).unwrap();
                assert_eq!(dst.dimensions(), (w, h));
                assert!(dst.pixels().iter().all(|&p| p == px), "{filter} {w}x{h}");
            }
        }
    }

    #[test]
    fn test_transparent_does_not_bleed() {
        // Left half opaque red, right half transparent green
        let mut src = Surface::new(4, 1);
        for x in 0..2 {
            src.set_pixel(x, 0, Pixel::opaque(255, 0, 0)).unwrap();
        }
        for x in 2..4 {
            src.set_pixel(x, 0, Pixel::new(0, 255, 0, 0)).unwrap();
        }
        let dst = resize(&src, 8, 1, Filter::Bilinear).unwrap();
        for p in dst.pixels().iter().filter(|p| p.a > 0) {
            assert_eq!((p.r, p.g, p.b), (255, 0, 0));
        }
    }

    #[test]
    fn test_nearest_upscale_duplicates() {
        let src = Surface::from_pixels(
            2,
            1,
            vec![Pixel::opaque(10, 10, 10), Pixel::opaque(200, 200, 200)],
        )
        .unwrap();
        let dst = resize(&src, 3, 1, Filter::Nearest).unwrap();
        assert_eq!(dst.pixel(0, 0).r, 10);
        assert_eq!(dst.pixel(2, 0).r, 200);
        assert!(dst.pixels().iter().all(|p| p.a == 255));
    }

    #[test]
    fn test_invalid_sizes() {
        let src = Surface::new(2, 2);
        assert!(resize(&src, 0, 2, Filter::Bicubic).is_err());
        assert!(resize(&Surface::new(0, 0), 2, 2, Filter::Bicubic).is_err());
    }

    #[test]
    fn test_filter_names() {
        for filter in Filter::ALL {
            assert_eq!(filter.name().parse::<Filter>().unwrap(), filter);
        }
        assert_eq!("Lanczos".parse::<Filter>().unwrap(), Filter::Lanczos3);
        assert!("sinc".parse::<Filter>().is_err());
    }
}
