//! Owned pixel buffers and mutable row-band views.
//!
//! [`Surface`] is a dense row-major grid of [`Pixel`]s. The compositor
//! reads from a source surface and writes to a destination through
//! [`RowsMut`], a view over a contiguous run of full rows. Splitting a
//! surface into disjoint bands with [`Surface::bands_mut`] is how
//! independent workers write concurrently without sharing a buffer.
//!
//! # Example
//!
//! ```rust
//! use blendplus_core::{Pixel, Rect, Surface};
//!
//! let mut surface = Surface::new(4, 4);
//! surface.fill(Pixel::opaque(10, 20, 30));
//!
//! let crop = surface.crop(Rect::new(1, 1, 2, 2)).unwrap();
//! assert_eq!(crop.dimensions(), (2, 2));
//! ```

use crate::error::{Error, Result};
use crate::pixel::Pixel;
use crate::rect::Rect;

/// An owned, row-major RGBA8 pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
}

impl Surface {
    /// Creates a transparent surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Pixel::TRANSPARENT)
    }

    /// Creates a surface with every pixel set to `px`.
    pub fn filled(width: u32, height: u32, px: Pixel) -> Self {
        Self {
            width,
            height,
            pixels: vec![px; width as usize * height as usize],
        }
    }

    /// Wraps an existing pixel vector.
    ///
    /// Fails if `pixels.len() != width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Pixel>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(Error::BufferLength {
                expected,
                got: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Builds a surface from interleaved RGBA8 bytes.
    pub fn from_rgba8(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(Error::BufferLength {
                expected,
                got: data.len(),
            });
        }
        let pixels = data
            .chunks_exact(4)
            .map(|c| Pixel::new(c[0], c[1], c[2], c[3]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Returns the pixels as interleaved RGBA8 bytes.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_rgba()).collect()
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Full-surface rectangle at the origin.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Returns `true` if the surface holds no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// All pixels in row-major order.
    #[inline]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// All pixels in row-major order, mutably.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Returns the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for {}x{}",
            self.width,
            self.height
        );
        self.pixels[self.index(x, y)]
    }

    /// Returns the pixel at (x, y), or `None` if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    /// Writes a pixel at (x, y).
    pub fn set_pixel(&mut self, x: u32, y: u32, px: Pixel) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::out_of_bounds(x, y, self.width, self.height));
        }
        let idx = self.index(x, y);
        self.pixels[idx] = px;
        Ok(())
    }

    /// Sets every pixel to `px`.
    pub fn fill(&mut self, px: Pixel) {
        self.pixels.fill(px);
    }

    /// Sets every pixel to transparent black.
    pub fn clear(&mut self) {
        self.fill(Pixel::TRANSPARENT);
    }

    /// Returns row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[Pixel] {
        let start = self.index(0, y);
        &self.pixels[start..start + self.width as usize]
    }

    /// Returns row `y` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [Pixel] {
        let start = self.index(0, y);
        let w = self.width as usize;
        &mut self.pixels[start..start + w]
    }

    /// Copies the pixels under `rect` into a new surface.
    pub fn crop(&self, rect: Rect) -> Result<Surface> {
        if !self.bounds().contains_rect(&rect) {
            return Err(Error::invalid_region(rect, self.width, self.height));
        }
        let mut pixels = Vec::with_capacity(rect.area() as usize);
        for y in rect.y..rect.bottom() {
            let start = self.index(rect.x, y);
            pixels.extend_from_slice(&self.pixels[start..start + rect.width as usize]);
        }
        Ok(Surface {
            width: rect.width,
            height: rect.height,
            pixels,
        })
    }

    /// Copies `src` onto this surface with its top-left at (dst_x, dst_y).
    ///
    /// Parts of `src` falling outside this surface are dropped. Negative
    /// offsets are allowed.
    pub fn copy_from(&mut self, src: &Surface, dst_x: i32, dst_y: i32) {
        let x0 = i64::from(dst_x).max(0);
        let y0 = i64::from(dst_y).max(0);
        let x1 = (i64::from(dst_x) + i64::from(src.width)).min(i64::from(self.width));
        let y1 = (i64::from(dst_y) + i64::from(src.height)).min(i64::from(self.height));
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let span = (x1 - x0) as usize;
        let sx = (x0 - i64::from(dst_x)) as u32;
        for y in y0..y1 {
            let sy = (y - i64::from(dst_y)) as u32;
            let s = src.index(sx, sy);
            let d = self.index(x0 as u32, y as u32);
            self.pixels[d..d + span].copy_from_slice(&src.pixels[s..s + span]);
        }
    }

    /// Mutable view over every row of the surface.
    pub fn rows_mut(&mut self) -> RowsMut<'_> {
        RowsMut {
            width: self.width,
            first_row: 0,
            pixels: &mut self.pixels,
        }
    }

    /// Splits the surface into disjoint bands of at most `rows_per_band` rows.
    ///
    /// A `rows_per_band` of zero is treated as one.
    pub fn bands_mut(&mut self, rows_per_band: u32) -> Vec<RowsMut<'_>> {
        let width = self.width;
        if width == 0 {
            return Vec::new();
        }
        let rows = rows_per_band.max(1);
        self.pixels
            .chunks_mut(rows as usize * width as usize)
            .enumerate()
            .map(|(i, pixels)| RowsMut {
                width,
                first_row: i as u32 * rows,
                pixels,
            })
            .collect()
    }
}

/// A mutable view over a contiguous band of full surface rows.
///
/// Rows are addressed by their absolute surface Y coordinate.
#[derive(Debug)]
pub struct RowsMut<'a> {
    width: u32,
    first_row: u32,
    pixels: &'a mut [Pixel],
}

impl<'a> RowsMut<'a> {
    /// Wraps a slice holding whole rows of a `width`-wide surface, starting
    /// at absolute row `first_row`.
    pub fn new(width: u32, first_row: u32, pixels: &'a mut [Pixel]) -> Result<Self> {
        if width == 0 {
            return Err(Error::invalid_dimensions(width, 0, "zero-width row band"));
        }
        if pixels.len() % width as usize != 0 {
            let rows = pixels.len().div_ceil(width as usize);
            return Err(Error::BufferLength {
                expected: rows * width as usize,
                got: pixels.len(),
            });
        }
        Ok(Self {
            width,
            first_row,
            pixels,
        })
    }

    /// Row width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Absolute Y of the first row in this band.
    #[inline]
    pub fn first_row(&self) -> u32 {
        self.first_row
    }

    /// Number of rows in this band.
    #[inline]
    pub fn row_count(&self) -> u32 {
        if self.width == 0 {
            0
        } else {
            (self.pixels.len() / self.width as usize) as u32
        }
    }

    /// The area this band covers in surface coordinates.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(0, self.first_row, self.width, self.row_count())
    }

    /// Returns `true` if `rect` lies entirely within this band.
    #[inline]
    pub fn contains_rect(&self, rect: &Rect) -> bool {
        self.bounds().contains_rect(rect)
    }

    /// Returns absolute row `y` mutably, or `None` if the band does not hold it.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> Option<&mut [Pixel]> {
        if y < self.first_row || y >= self.first_row + self.row_count() {
            return None;
        }
        let w = self.width as usize;
        let start = (y - self.first_row) as usize * w;
        Some(&mut self.pixels[start..start + w])
    }

    /// Returns absolute row `y`, or `None` if the band does not hold it.
    #[inline]
    pub fn row(&self, y: u32) -> Option<&[Pixel]> {
        if y < self.first_row || y >= self.first_row + self.row_count() {
            return None;
        }
        let w = self.width as usize;
        let start = (y - self.first_row) as usize * w;
        Some(&self.pixels[start..start + w])
    }
}
