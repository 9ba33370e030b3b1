//! Parallel rendering using Rayon.
//!
//! The destination is split into horizontal bands with `par_chunks_mut`;
//! every band renders the part of each tile that falls inside it. Bands
//! never share rows, so no locking is needed.
//!
//! # Example
//!
//! ```rust
//! use blendplus_core::{Pixel, Surface};
//! use blendplus_ops::blend::BlendMode;
//! use blendplus_ops::parallel;
//! use blendplus_ops::render::{NeverCancel, Overlay, RenderConfig};
//!
//! let base = Surface::filled(256, 256, Pixel::opaque(10, 20, 30));
//! let config = RenderConfig {
//!     blend_mode: BlendMode::Screen,
//!     overlay: Overlay::Placed(Surface::filled(256, 256, Pixel::opaque(90, 90, 90))),
//!     ..Default::default()
//! };
//! let mut dst = Surface::new(256, 256);
//! parallel::render_tiles(&mut dst, &base, &config, base.bounds(), 64, &NeverCancel).unwrap();
//! ```

use blendplus_core::{Rect, RowsMut, Surface};
use rayon::prelude::*;
use tracing::debug;

use crate::render::{render, CancelToken, RenderConfig, RenderStatus};
use crate::OpsResult;

/// Splits `rect` into a row-major grid of tiles of at most
/// `tile_size x tile_size`.
///
/// # Example
///
/// ```rust
/// use blendplus_core::Rect;
/// use blendplus_ops::parallel::split_tiles;
///
/// let tiles = split_tiles(Rect::new(0, 0, 100, 50), 64);
/// assert_eq!(tiles.len(), 2);
/// assert_eq!(tiles[1], Rect::new(64, 0, 36, 50));
/// ```
pub fn split_tiles(rect: Rect, tile_size: u32) -> Vec<Rect> {
    if rect.is_empty() {
        return Vec::new();
    }
    let step = tile_size.max(1);
    let mut tiles = Vec::new();
    let mut y = rect.y;
    while y < rect.bottom() {
        let h = step.min(rect.bottom() - y);
        let mut x = rect.x;
        while x < rect.right() {
            let w = step.min(rect.right() - x);
            tiles.push(Rect::new(x, y, w, h));
            x += w;
        }
        y += h;
    }
    tiles
}

/// Renders `region` split into `tile_size` tiles across the Rayon pool.
pub fn render_tiles(
    dst: &mut Surface,
    base: &Surface,
    config: &RenderConfig,
    region: Rect,
    tile_size: u32,
    cancel: &dyn CancelToken,
) -> OpsResult<RenderStatus> {
    let tiles = split_tiles(region, tile_size);
    render_rects(dst, base, config, &tiles, tile_size, cancel)
}

/// Renders every rectangle in `rects` in parallel.
///
/// The destination is divided into bands of `band_rows` rows. Rectangles
/// may straddle bands; each band renders its own slice of them. Returns
/// [`RenderStatus::Cancelled`] if any band observed cancellation.
pub fn render_rects(
    dst: &mut Surface,
    base: &Surface,
    config: &RenderConfig,
    rects: &[Rect],
    band_rows: u32,
    cancel: &dyn CancelToken,
) -> OpsResult<RenderStatus> {
    if dst.dimensions() != base.dimensions() {
        return Err(blendplus_core::Error::dimension_mismatch(dst.dimensions(), base.dimensions()).into());
    }
    if dst.is_empty() || rects.is_empty() {
        return Ok(RenderStatus::Completed);
    }

    let width = dst.width();
    let rows = band_rows.max(1);
    let chunk = rows as usize * width as usize;

    debug!(
        rects = rects.len(),
        band_rows = rows,
        mode = %config.blend_mode,
        "parallel render"
    );

    let statuses = dst
        .pixels_mut()
        .par_chunks_mut(chunk)
        .enumerate()
        .map(|(i, pixels)| -> OpsResult<RenderStatus> {
            let mut band = RowsMut::new(width, i as u32 * rows, pixels)?;
            let bounds = band.bounds();
            for rect in rects {
                let Some(part) = rect.intersect(&bounds) else {
                    continue;
                };
                if render(&mut band, base, config, part, cancel)? == RenderStatus::Cancelled {
                    return Ok(RenderStatus::Cancelled);
                }
            }
            Ok(RenderStatus::Completed)
        })
        .collect::<OpsResult<Vec<_>>>()?;

    if statuses.contains(&RenderStatus::Cancelled) {
        Ok(RenderStatus::Cancelled)
    } else {
        Ok(RenderStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blend::BlendMode;
    use crate::render::{render_surface, CancelFlag, NeverCancel, Overlay};
    use blendplus_core::Pixel;

    fn noise(w: u32, h: u32, seed: u32) -> Surface {
        let pixels = (0..w * h)
            .map(|i| {
                let v = i.wrapping_mul(2_654_435_761).wrapping_add(seed);
                Pixel::new(v as u8, (v >> 8) as u8, (v >> 16) as u8, (v >> 24) as u8 | 0x40)
            })
            .collect();
        Surface::from_pixels(w, h, pixels).unwrap()
    }

    #[test]
    fn test_split_tiles_covers_exactly() {
        let rect = Rect::new(3, 5, 70, 33);
        let tiles = split_tiles(rect, 16);
        let area: u64 = tiles.iter().map(|t| t.area()).sum();
        assert_eq!(area, rect.area());
        for (i, a) in tiles.iter().enumerate() {
            assert!(rect.contains_rect(a));
            for b in &tiles[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }
    }

    #[test]
    fn test_split_tiles_edge_cases() {
        assert!(split_tiles(Rect::new(0, 0, 0, 10), 8).is_empty());
        assert_eq!(split_tiles(Rect::new(0, 0, 3, 2), 0).len(), 6);
        assert_eq!(split_tiles(Rect::new(1, 1, 5, 5), 100), vec![Rect::new(1, 1, 5, 5)]);
    }

    #[test]
    fn test_parallel_matches_serial() {
        let (w, h) = (97, 61);
        let base = noise(w, h, 1);
        for mode in [BlendMode::Normal, BlendMode::Overlay, BlendMode::Hue, BlendMode::PinLight] {
            for swap in [false, true] {
                let config = RenderConfig {
                    blend_mode: mode,
                    swap_layers: swap,
                    overlay: Overlay::Placed(noise(w, h, 7)),
                    ..Default::default()
                };
                let mut serial = Surface::new(w, h);
                render_surface(&mut serial, &base, &config, base.bounds(), &NeverCancel).unwrap();

                let mut par = Surface::new(w, h);
                let status = render_tiles(&mut par, &base, &config, base.bounds(), 16, &NeverCancel).unwrap();
                assert_eq!(status, RenderStatus::Completed);
                assert_eq!(par, serial, "{mode} swap={swap}");
            }
        }
    }

    #[test]
    fn test_rects_straddling_bands() {
        let base = noise(20, 20, 3);
        let config = RenderConfig::default();
        let sentinel = Pixel::new(1, 1, 1, 1);
        let mut dst = Surface::filled(20, 20, sentinel);
        let rects = [Rect::new(2, 3, 5, 11), Rect::new(10, 0, 10, 20)];
        render_rects(&mut dst, &base, &config, &rects, 4, &NeverCancel).unwrap();

        for (x, y) in dst.bounds().iter_coords() {
            let inside = rects.iter().any(|r| r.contains(x, y));
            let expected = if inside { base.pixel(x, y) } else { sentinel };
            assert_eq!(dst.pixel(x, y), expected, "({x}, {y})");
        }
    }

    #[test]
    fn test_precancelled_parallel_writes_nothing() {
        let base = noise(32, 32, 5);
        let flag = CancelFlag::new();
        flag.cancel();
        let sentinel = Pixel::new(2, 2, 2, 2);
        let mut dst = Surface::filled(32, 32, sentinel);
        let status = render_tiles(&mut dst, &base, &RenderConfig::default(), base.bounds(), 8, &flag).unwrap();
        assert_eq!(status, RenderStatus::Cancelled);
        assert!(dst.pixels().iter().all(|&p| p == sentinel));
    }

    #[test]
    fn test_size_mismatch() {
        let base = noise(8, 8, 0);
        let mut dst = Surface::new(4, 4);
        assert!(render_tiles(&mut dst, &base, &RenderConfig::default(), base.bounds(), 4, &NeverCancel).is_err());
    }
}
