//! Compositor: blends the base and the placed overlay over a region.
//!
//! A [`RenderConfig`] is built once per settings change and then shared
//! read-only by every render call. Each call writes only the pixels of its
//! own region, so callers can render disjoint regions concurrently (see
//! [`crate::parallel`]).
//!
//! # Example
//!
//! ```rust
//! use blendplus_core::{Pixel, Rect, Surface};
//! use blendplus_ops::blend::BlendMode;
//! use blendplus_ops::render::{render_surface, NeverCancel, Overlay, RenderConfig, RenderStatus};
//!
//! let base = Surface::filled(4, 4, Pixel::opaque(255, 0, 0));
//! let config = RenderConfig {
//!     blend_mode: BlendMode::Difference,
//!     overlay: Overlay::Placed(Surface::filled(4, 4, Pixel::opaque(0, 0, 255))),
//!     ..Default::default()
//! };
//!
//! let mut dst = Surface::new(4, 4);
//! let status = render_surface(&mut dst, &base, &config, base.bounds(), &NeverCancel).unwrap();
//! assert_eq!(status, RenderStatus::Completed);
//! assert_eq!(dst.pixel(0, 0), Pixel::opaque(255, 0, 255));
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use blendplus_core::{Rect, RowsMut, Surface};
use tracing::trace;

use crate::blend::BlendMode;
use crate::placement::PlacementPolicy;
use crate::{OpsError, OpsResult};

/// Overlay state of a render configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Overlay {
    /// No overlay could be acquired; rendering copies the base.
    #[default]
    Absent,
    /// Canvas-sized overlay, transparent outside the placed area.
    Placed(Surface),
}

impl Overlay {
    /// The placed surface, if any.
    pub fn surface(&self) -> Option<&Surface> {
        match self {
            Overlay::Absent => None,
            Overlay::Placed(s) => Some(s),
        }
    }

    /// Returns `true` if there is no overlay.
    pub fn is_absent(&self) -> bool {
        matches!(self, Overlay::Absent)
    }
}

/// Immutable snapshot consumed by every render call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RenderConfig {
    /// Blend function applied per pixel.
    pub blend_mode: BlendMode,
    /// Blend the base onto the overlay instead of the overlay onto the base.
    pub swap_layers: bool,
    /// Policy the overlay was placed with.
    pub placement: PlacementPolicy,
    /// The placed overlay.
    pub overlay: Overlay,
}

/// Outcome of a render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// Every row of the region was written.
    Completed,
    /// Cancellation was observed; rows from that point on were not written.
    Cancelled,
}

/// Cooperative cancellation query, polled once per row.
pub trait CancelToken: Sync {
    /// Returns `true` once work should stop.
    fn is_cancelled(&self) -> bool;
}

/// Token that never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl CancelToken for NeverCancel {
    #[inline]
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl CancelToken for AtomicBool {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates an unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Clears a previous request.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

impl CancelToken for CancelFlag {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Adapts a host-provided callable into a [`CancelToken`].
pub struct CancelFn<F>(pub F);

impl<F: Fn() -> bool + Sync> CancelToken for CancelFn<F> {
    #[inline]
    fn is_cancelled(&self) -> bool {
        (self.0)()
    }
}

/// Renders `region` of the canvas into `dst`.
///
/// `dst` is a band of full destination rows; the clipped region must lie
/// inside it. The region is first clipped to the base surface. Without an
/// overlay the base pixels are copied unchanged.
///
/// Cancellation is polled before each row is written. When it fires the
/// call returns [`RenderStatus::Cancelled`] and leaves the remaining rows
/// untouched.
pub fn render(
    dst: &mut RowsMut<'_>,
    base: &Surface,
    config: &RenderConfig,
    region: Rect,
    cancel: &dyn CancelToken,
) -> OpsResult<RenderStatus> {
    let Some(region) = region.clamp_to(base.width(), base.height()) else {
        return Ok(RenderStatus::Completed);
    };
    if dst.width() != base.width() {
        return Err(OpsError::SizeMismatch(format!(
            "destination width {} does not match base width {}",
            dst.width(),
            base.width()
        )));
    }
    let band = dst.bounds();
    if !band.contains_rect(&region) {
        return Err(
            blendplus_core::Error::invalid_region(region, band.right(), band.bottom()).into(),
        );
    }
    if let Some(overlay) = config.overlay.surface() {
        if overlay.dimensions() != base.dimensions() {
            return Err(OpsError::SizeMismatch(format!(
                "overlay {}x{} does not match canvas {}x{}",
                overlay.width(),
                overlay.height(),
                base.width(),
                base.height()
            )));
        }
    }

    trace!(%region, mode = %config.blend_mode, swap = config.swap_layers, "render region");

    let x0 = region.x as usize;
    let x1 = region.right() as usize;
    let blend_fn = config.blend_mode.function();

    for y in region.y..region.bottom() {
        if cancel.is_cancelled() {
            trace!(%region, row = y, "render cancelled");
            return Ok(RenderStatus::Cancelled);
        }
        let Some(out) = dst.row_mut(y) else {
            return Err(
                blendplus_core::Error::out_of_bounds(region.x, y, band.right(), band.bottom()).into(),
            );
        };
        let out = &mut out[x0..x1];
        let base_row = &base.row(y)[x0..x1];

        match config.overlay.surface() {
            None => out.copy_from_slice(base_row),
            Some(overlay) => {
                let over_row = &overlay.row(y)[x0..x1];
                for ((o, &b), &v) in out.iter_mut().zip(base_row).zip(over_row) {
                    *o = if config.swap_layers {
                        blend_fn(v, b)
                    } else {
                        blend_fn(b, v)
                    };
                }
            }
        }
    }

    Ok(RenderStatus::Completed)
}

/// Renders `region` into a whole destination surface.
pub fn render_surface(
    dst: &mut Surface,
    base: &Surface,
    config: &RenderConfig,
    region: Rect,
    cancel: &dyn CancelToken,
) -> OpsResult<RenderStatus> {
    if dst.dimensions() != base.dimensions() {
        return Err(blendplus_core::Error::dimension_mismatch(dst.dimensions(), base.dimensions()).into());
    }
    render(&mut dst.rows_mut(), base, config, region, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blendplus_core::Pixel;
    use std::sync::atomic::AtomicUsize;

    fn checker(w: u32, h: u32) -> Surface {
        let pixels = (0..h)
            .flat_map(|y| {
                (0..w).map(move |x| {
                    let v = ((x + y) % 2 * 200) as u8 + 20;
                    Pixel::new(v, 255 - v, x as u8 * 10, 255)
                })
            })
            .collect();
        Surface::from_pixels(w, h, pixels).unwrap()
    }

    fn config(mode: BlendMode, overlay: Surface) -> RenderConfig {
        RenderConfig {
            blend_mode: mode,
            overlay: Overlay::Placed(overlay),
            ..Default::default()
        }
    }

    #[test]
    fn test_difference_red_blue() {
        let base = Surface::filled(4, 4, Pixel::opaque(255, 0, 0));
        let cfg = config(BlendMode::Difference, Surface::filled(4, 4, Pixel::opaque(0, 0, 255)));
        let mut dst = Surface::new(4, 4);
        let status = render_surface(&mut dst, &base, &cfg, base.bounds(), &NeverCancel).unwrap();
        assert_eq!(status, RenderStatus::Completed);
        assert!(dst.pixels().iter().all(|&p| p == Pixel::opaque(255, 0, 255)));
    }

    #[test]
    fn test_absent_overlay_copies_base() {
        let base = checker(5, 3);
        let mut dst = Surface::new(5, 3);
        let status = render_surface(&mut dst, &base, &RenderConfig::default(), base.bounds(), &NeverCancel).unwrap();
        assert_eq!(status, RenderStatus::Completed);
        assert_eq!(dst, base);
    }

    #[test]
    fn test_swap_exchanges_operands() {
        let base = Surface::filled(2, 2, Pixel::opaque(200, 100, 50));
        let overlay = Surface::filled(2, 2, Pixel::opaque(100, 150, 0));
        let mut cfg = config(BlendMode::GrainExtract, overlay);

        let mut plain = Surface::new(2, 2);
        render_surface(&mut plain, &base, &cfg, base.bounds(), &NeverCancel).unwrap();
        cfg.swap_layers = true;
        let mut swapped = Surface::new(2, 2);
        render_surface(&mut swapped, &base, &cfg, base.bounds(), &NeverCancel).unwrap();

        // 200 - 100 + 128 = 228; 100 - 200 + 128 = 28
        assert_eq!(plain.pixel(0, 0).r, 228);
        assert_eq!(swapped.pixel(0, 0).r, 28);
    }

    #[test]
    fn test_only_region_is_written() {
        let base = checker(6, 6);
        let cfg = config(BlendMode::Multiply, Surface::filled(6, 6, Pixel::opaque(0, 0, 0)));
        let sentinel = Pixel::new(1, 2, 3, 4);
        let mut dst = Surface::filled(6, 6, sentinel);
        let region = Rect::new(1, 2, 3, 2);
        render_surface(&mut dst, &base, &cfg, region, &NeverCancel).unwrap();

        for (x, y) in dst.bounds().iter_coords() {
            if region.contains(x, y) {
                assert_eq!(dst.pixel(x, y), Pixel::opaque(0, 0, 0));
            } else {
                assert_eq!(dst.pixel(x, y), sentinel);
            }
        }
    }

    #[test]
    fn test_region_clipped_to_canvas() {
        let base = checker(4, 4);
        let mut dst = Surface::new(4, 4);
        let status = render_surface(&mut dst, &base, &RenderConfig::default(), Rect::new(2, 2, 100, 100), &NeverCancel).unwrap();
        assert_eq!(status, RenderStatus::Completed);
        assert_eq!(dst.pixel(3, 3), base.pixel(3, 3));
        assert_eq!(dst.pixel(1, 1), Pixel::TRANSPARENT);

        // Entirely outside: nothing to do
        let status = render_surface(&mut dst, &base, &RenderConfig::default(), Rect::new(10, 10, 2, 2), &NeverCancel).unwrap();
        assert_eq!(status, RenderStatus::Completed);
    }

    #[test]
    fn test_precancelled_writes_nothing() {
        let base = checker(4, 4);
        let sentinel = Pixel::new(9, 9, 9, 9);
        let flag = CancelFlag::new();
        flag.cancel();

        for cfg in [RenderConfig::default(), config(BlendMode::Screen, checker(4, 4))] {
            let mut dst = Surface::filled(4, 4, sentinel);
            let status = render_surface(&mut dst, &base, &cfg, base.bounds(), &flag).unwrap();
            assert_eq!(status, RenderStatus::Cancelled);
            assert!(dst.pixels().iter().all(|&p| p == sentinel));
        }
    }

    #[test]
    fn test_cancel_mid_region_stops_at_row() {
        let base = checker(3, 5);
        let polls = AtomicUsize::new(0);
        // Allow two rows, then cancel
        let cancel = CancelFn(|| polls.fetch_add(1, Ordering::SeqCst) >= 2);
        let sentinel = Pixel::new(7, 7, 7, 7);
        let mut dst = Surface::filled(3, 5, sentinel);

        let status = render_surface(&mut dst, &base, &RenderConfig::default(), base.bounds(), &cancel).unwrap();
        assert_eq!(status, RenderStatus::Cancelled);
        assert_eq!(dst.row(0), base.row(0));
        assert_eq!(dst.row(1), base.row(1));
        assert!(dst.row(2).iter().all(|&p| p == sentinel));
        assert!(dst.row(4).iter().all(|&p| p == sentinel));
    }

    #[test]
    fn test_atomic_bool_token() {
        let flag = AtomicBool::new(false);
        assert!(!flag.is_cancelled());
        flag.store(true, Ordering::Relaxed);
        assert!(flag.is_cancelled());

        let shared = CancelFlag::new();
        let clone = shared.clone();
        shared.cancel();
        assert!(clone.is_cancelled());
        clone.reset();
        assert!(!shared.is_cancelled());
    }

    #[test]
    fn test_band_must_cover_region() {
        let base = checker(4, 4);
        let mut dst = Surface::new(4, 4);
        let mut bands = dst.bands_mut(2);
        let err = render(&mut bands[0], &base, &RenderConfig::default(), Rect::new(0, 1, 4, 2), &NeverCancel);
        assert!(err.is_err());
        let ok = render(&mut bands[1], &base, &RenderConfig::default(), Rect::new(0, 2, 4, 2), &NeverCancel);
        assert_eq!(ok.unwrap(), RenderStatus::Completed);
    }

    #[test]
    fn test_mismatched_overlay_is_rejected() {
        let base = checker(4, 4);
        let cfg = config(BlendMode::Normal, Surface::new(3, 3));
        let mut dst = Surface::new(4, 4);
        assert!(render_surface(&mut dst, &base, &cfg, base.bounds(), &NeverCancel).is_err());
    }
}
