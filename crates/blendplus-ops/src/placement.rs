//! Overlay placement onto the canvas.
//!
//! Placement happens in two steps. [`plan`] is pure geometry: it decides
//! which part of the overlay to use, how large it ends up and where its
//! top-left corner lands. [`place`] carries the plan out: crop, resample
//! through a [`Resampler`] and copy into a transparent canvas-sized surface.
//!
//! # Policies
//!
//! | Policy | Behaviour |
//! |--------|-----------|
//! | [`PlacementPolicy::Fill`] | center-crop to the selection ratio, scale to the selection |
//! | [`PlacementPolicy::Fit`] | scale to fit inside the selection, keep ratio, center |
//! | [`PlacementPolicy::Stretch`] | scale to the selection, ignore ratio |
//! | [`PlacementPolicy::Center`] | native size centered on the selection, no scaling |
//!
//! Midpoint values in crop and fit geometry round half to even. Centering
//! uses truncating integer division.

use std::fmt;
use std::str::FromStr;

use blendplus_core::{Rect, Surface};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::resize::Resampler;
use crate::{OpsError, OpsResult};

/// How the overlay is mapped into the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacementPolicy {
    /// Crop to the selection aspect ratio, then scale to cover it.
    Fill,
    /// Scale to fit inside the selection preserving aspect ratio.
    Fit,
    /// Scale to exactly the selection size.
    #[default]
    Stretch,
    /// Native size, centered on the selection.
    Center,
}

impl PlacementPolicy {
    /// All policies in settings order.
    pub const ALL: [PlacementPolicy; 4] = [Self::Fill, Self::Fit, Self::Stretch, Self::Center];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Fill => "Fill",
            Self::Fit => "Fit",
            Self::Stretch => "Stretch",
            Self::Center => "Center",
        }
    }
}

impl fmt::Display for PlacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PlacementPolicy {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| OpsError::InvalidParameter(format!("unknown placement '{s}'")))
    }
}

/// Geometry decided by [`plan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPlan {
    /// Part of the overlay that is used.
    pub crop: Rect,
    /// Size the cropped overlay is scaled to. Equal to the crop size when no
    /// scaling happens.
    pub size: (u32, u32),
    /// Canvas position of the placed overlay's top-left corner. May be
    /// negative when the overlay is larger than the selection.
    pub offset: (i32, i32),
}

impl PlacementPlan {
    /// Returns `true` if carrying out this plan requires resampling.
    #[inline]
    pub fn needs_resample(&self) -> bool {
        self.size != (self.crop.width, self.crop.height)
    }
}

#[inline]
fn round_even(v: f32) -> u32 {
    v.round_ties_even().max(0.0) as u32
}

#[inline]
fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Computes placement geometry for an overlay of `overlay_size`.
///
/// Fails on an empty overlay or an empty selection.
pub fn plan(
    overlay_size: (u32, u32),
    selection: Rect,
    policy: PlacementPolicy,
) -> OpsResult<PlacementPlan> {
    let (w, h) = overlay_size;
    if w == 0 || h == 0 {
        return Err(OpsError::InvalidDimensions(format!(
            "overlay is empty ({w}x{h})"
        )));
    }
    if selection.is_empty() {
        return Err(OpsError::InvalidDimensions(format!(
            "selection is empty ({selection})"
        )));
    }

    let full = Rect::from_size(w, h);
    let sel_size = (selection.width, selection.height);
    let sel_origin = (to_i32(selection.x), to_i32(selection.y));
    let Some(sel_ratio) = selection.aspect_ratio() else {
        return Err(OpsError::InvalidDimensions(format!(
            "selection has no aspect ratio ({selection})"
        )));
    };
    let (wf, hf) = (w as f32, h as f32);

    let result = match policy {
        PlacementPolicy::Fill => {
            let (mut cw, mut ch) = (w, h);
            if wf < hf * sel_ratio {
                ch = round_even(wf / sel_ratio).clamp(1, h);
            } else if wf > hf * sel_ratio {
                cw = round_even(hf * sel_ratio).clamp(1, w);
            }
            let cx = round_even((w - cw) as f32 / 2.0);
            let cy = round_even((h - ch) as f32 / 2.0);
            PlacementPlan {
                crop: Rect::new(cx, cy, cw, ch),
                size: sel_size,
                offset: sel_origin,
            }
        }
        PlacementPolicy::Fit => {
            let img_ratio = wf / hf;
            let (nw, nh) = if wf < hf * sel_ratio {
                // Narrower than the selection: scale to its shorter side
                let sel_min = selection.width.min(selection.height);
                let nw = round_even(sel_min as f32 * img_ratio).max(1);
                (nw, sel_min)
            } else if wf > hf * sel_ratio {
                // Wider: the selection width decides. Scaling to the longer
                // side would spill past a portrait selection.
                let nh = round_even(selection.width as f32 / img_ratio).clamp(1, selection.height);
                (selection.width, nh)
            } else {
                sel_size
            };
            let pad = |sel: u32, new: u32| {
                if new < sel {
                    to_i32(round_even((sel - new) as f32 / 2.0))
                } else {
                    0
                }
            };
            PlacementPlan {
                crop: full,
                size: (nw, nh),
                offset: (
                    sel_origin.0 + pad(selection.width, nw),
                    sel_origin.1 + pad(selection.height, nh),
                ),
            }
        }
        PlacementPolicy::Stretch => PlacementPlan {
            crop: full,
            size: sel_size,
            offset: sel_origin,
        },
        PlacementPolicy::Center => {
            // Rust integer division truncates toward zero
            let dx = (to_i32(selection.width) - to_i32(w)) / 2;
            let dy = (to_i32(selection.height) - to_i32(h)) / 2;
            PlacementPlan {
                crop: full,
                size: overlay_size,
                offset: (sel_origin.0 + dx, sel_origin.1 + dy),
            }
        }
    };

    debug!(
        %policy,
        overlay_w = w,
        overlay_h = h,
        %selection,
        crop = %result.crop,
        size_w = result.size.0,
        size_h = result.size.1,
        offset_x = result.offset.0,
        offset_y = result.offset.1,
        "placement plan"
    );

    Ok(result)
}

/// Places `overlay` on a transparent `canvas`-sized surface.
///
/// Anything outside the placed area stays transparent; parts falling off
/// the canvas are clipped. The resampler is only called when the plan
/// changes the size of the cropped overlay.
pub fn place(
    overlay: &Surface,
    canvas: (u32, u32),
    selection: Rect,
    policy: PlacementPolicy,
    resampler: &dyn Resampler,
) -> OpsResult<Surface> {
    let geometry = plan(overlay.dimensions(), selection, policy)?;

    let cropped = if geometry.crop == overlay.bounds() {
        None
    } else {
        Some(overlay.crop(geometry.crop)?)
    };
    let source = cropped.as_ref().unwrap_or(overlay);

    let scaled = if geometry.needs_resample() {
        let out = resampler.resample(source, geometry.size.0, geometry.size.1)?;
        if out.dimensions() != geometry.size {
            return Err(OpsError::SizeMismatch(format!(
                "resampler returned {}x{}, expected {}x{}",
                out.width(),
                out.height(),
                geometry.size.0,
                geometry.size.1
            )));
        }
        Some(out)
    } else {
        None
    };
    let placed = scaled.as_ref().unwrap_or(source);

    let mut surface = Surface::new(canvas.0, canvas.1);
    surface.copy_from(placed, geometry.offset.0, geometry.offset.1);
    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resize::FilterResampler;
    use blendplus_core::Pixel;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and delegates to the stock resampler.
    #[derive(Default)]
    struct CountingResampler {
        calls: AtomicUsize,
    }

    impl Resampler for CountingResampler {
        fn resample(&self, src: &Surface, width: u32, height: u32) -> OpsResult<Surface> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            FilterResampler::default().resample(src, width, height)
        }
    }

    #[test]
    fn test_fill_crops_wide_overlay() {
        let p = plan((200, 100), Rect::new(5, 6, 100, 100), PlacementPolicy::Fill).unwrap();
        assert_eq!(p.crop, Rect::new(50, 0, 100, 100));
        assert_eq!(p.size, (100, 100));
        assert_eq!(p.offset, (5, 6));
    }

    #[test]
    fn test_fill_crops_tall_overlay() {
        let p = plan((100, 300), Rect::new(0, 0, 200, 100), PlacementPolicy::Fill).unwrap();
        assert_eq!(p.crop, Rect::new(0, 125, 100, 50));
        assert_eq!(p.size, (200, 100));
    }

    #[test]
    fn test_fill_offset_rounds_half_even() {
        // Diff of 5 pixels: 2.5 rounds to 2
        let p = plan((7, 2), Rect::new(0, 0, 2, 2), PlacementPolicy::Fill).unwrap();
        assert_eq!(p.crop, Rect::new(2, 0, 2, 2));
    }

    #[test]
    fn test_fit_wide_overlay() {
        let p = plan((200, 100), Rect::new(10, 20, 100, 100), PlacementPolicy::Fit).unwrap();
        assert_eq!(p.crop, Rect::new(0, 0, 200, 100));
        assert_eq!(p.size, (100, 50));
        assert_eq!(p.offset, (10, 45));
    }

    #[test]
    fn test_fit_narrow_overlay_uses_shorter_side() {
        let sel = Rect::new(0, 0, 90, 100);
        let p = plan((10, 40), sel, PlacementPolicy::Fit).unwrap();
        // 90 * 0.25 = 22.5 -> 22
        assert_eq!(p.size, (22, 90));
        assert_eq!(p.offset, (34, 5));
    }

    #[test]
    fn test_fit_portrait_selection_narrow_overlay() {
        let sel = Rect::new(0, 0, 50, 200);
        let p = plan((10, 100), sel, PlacementPolicy::Fit).unwrap();
        assert_eq!(p.size, (5, 50));
        // (50 - 5) / 2 = 22.5 -> 22
        assert_eq!(p.offset, (22, 75));
    }

    #[test]
    fn test_fit_portrait_selection_wide_overlay() {
        let sel = Rect::new(0, 0, 50, 200);
        let p = plan((100, 100), sel, PlacementPolicy::Fit).unwrap();
        assert_eq!(p.size, (50, 50));
        assert_eq!(p.offset, (0, 75));
        assert!(p.size.0 <= sel.width && p.size.1 <= sel.height);
    }

    #[test]
    fn test_fit_equal_ratio_scales_to_selection() {
        let p = plan((50, 25), Rect::new(3, 4, 100, 50), PlacementPolicy::Fit).unwrap();
        assert_eq!(p.size, (100, 50));
        assert_eq!(p.offset, (3, 4));
    }

    #[test]
    fn test_stretch_matches_selection() {
        for overlay in [(1, 1), (300, 7), (16, 900)] {
            let sel = Rect::new(4, 8, 33, 21);
            let p = plan(overlay, sel, PlacementPolicy::Stretch).unwrap();
            assert_eq!(p.size, (33, 21));
            assert_eq!(p.offset, (4, 8));
        }
    }

    #[test]
    fn test_center_offsets() {
        let p = plan((2, 2), Rect::new(1, 1, 6, 4), PlacementPolicy::Center).unwrap();
        assert_eq!(p.offset, (3, 2));
        assert!(!p.needs_resample());

        // Larger overlay: (5 - 10) / 2 truncates to -2
        let p = plan((10, 10), Rect::new(0, 0, 5, 4), PlacementPolicy::Center).unwrap();
        assert_eq!(p.offset, (-2, -3));
    }

    #[test]
    fn test_rejects_empty_inputs() {
        assert!(plan((0, 10), Rect::new(0, 0, 4, 4), PlacementPolicy::Fit).is_err());
        assert!(plan((10, 10), Rect::new(0, 0, 0, 4), PlacementPolicy::Fit).is_err());
        let resampler = FilterResampler::default();
        assert!(place(&Surface::new(0, 0), (4, 4), Rect::new(0, 0, 4, 4), PlacementPolicy::Stretch, &resampler).is_err());
    }

    #[test]
    fn test_place_center_without_resampling() {
        let overlay = Surface::filled(2, 2, Pixel::opaque(0, 0, 255));
        let resampler = CountingResampler::default();
        let out = place(&overlay, (8, 6), Rect::new(1, 1, 6, 4), PlacementPolicy::Center, &resampler).unwrap();

        assert_eq!(resampler.calls.load(Ordering::SeqCst), 0);
        assert_eq!(out.dimensions(), (8, 6));
        for (x, y) in out.bounds().iter_coords() {
            let inside = Rect::new(3, 2, 2, 2).contains(x, y);
            let expected = if inside { Pixel::opaque(0, 0, 255) } else { Pixel::TRANSPARENT };
            assert_eq!(out.pixel(x, y), expected, "({x}, {y})");
        }
    }

    #[test]
    fn test_place_center_clips_at_canvas() {
        let overlay = Surface::filled(10, 10, Pixel::opaque(1, 2, 3));
        let resampler = CountingResampler::default();
        let out = place(&overlay, (4, 4), Rect::new(0, 0, 4, 4), PlacementPolicy::Center, &resampler).unwrap();
        assert!(out.pixels().iter().all(|&p| p == Pixel::opaque(1, 2, 3)));
    }

    #[test]
    fn test_place_stretch_covers_selection() {
        let overlay = Surface::filled(3, 5, Pixel::opaque(9, 9, 9));
        let resampler = CountingResampler::default();
        let sel = Rect::new(2, 1, 4, 3);
        let out = place(&overlay, (8, 8), sel, PlacementPolicy::Stretch, &resampler).unwrap();

        assert_eq!(resampler.calls.load(Ordering::SeqCst), 1);
        let covered = out.bounds().iter_coords().filter(|&(x, y)| out.pixel(x, y).a > 0).count();
        assert_eq!(covered as u64, sel.area());
        for (x, y) in sel.iter_coords() {
            assert_eq!(out.pixel(x, y), Pixel::opaque(9, 9, 9));
        }
    }

    #[test]
    fn test_place_fill_uses_center_of_overlay() {
        // 3 columns: red | green | blue. Fill into a square keeps the middle.
        let mut overlay = Surface::new(3, 1);
        overlay.set_pixel(0, 0, Pixel::opaque(255, 0, 0)).unwrap();
        overlay.set_pixel(1, 0, Pixel::opaque(0, 255, 0)).unwrap();
        overlay.set_pixel(2, 0, Pixel::opaque(0, 0, 255)).unwrap();
        let resampler = CountingResampler::default();
        let out = place(&overlay, (2, 2), Rect::new(0, 0, 2, 2), PlacementPolicy::Fill, &resampler).unwrap();
        assert!(out.pixels().iter().all(|&p| p == Pixel::opaque(0, 255, 0)));
    }

    #[test]
    fn test_policy_names() {
        assert_eq!("fit".parse::<PlacementPolicy>().unwrap(), PlacementPolicy::Fit);
        assert_eq!("CENTER".parse::<PlacementPolicy>().unwrap(), PlacementPolicy::Center);
        assert!("tile".parse::<PlacementPolicy>().is_err());
        assert_eq!(PlacementPolicy::default(), PlacementPolicy::Stretch);
    }
}
