//! 8-bit RGBA pixel type and channel clamping helpers.
//!
//! [`Pixel`] is a plain value type: four unsigned 8-bit channels with
//! straight (non-premultiplied) alpha. Every blend formula produces its
//! channels through [`clamp_byte`] or [`clamp_byte_f32`], which is what
//! keeps results inside `[0, 255]`.
//!
//! # Usage
//!
//! ```rust
//! use blendplus_core::Pixel;
//!
//! let red = Pixel::opaque(255, 0, 0);
//! assert_eq!(red.to_rgba(), [255, 0, 0, 255]);
//!
//! // Host buffers are often stored blue-first.
//! let same = Pixel::from_bgra(0, 0, 255, 255);
//! assert_eq!(red, same);
//! ```

/// A straight-alpha RGBA pixel with 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub struct Pixel {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel (0 = transparent, 255 = opaque)
    pub a: u8,
}

impl Pixel {
    /// Fully transparent black.
    pub const TRANSPARENT: Pixel = Pixel::new(0, 0, 0, 0);

    /// Creates a pixel from red, green, blue and alpha.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque pixel.
    #[inline]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Creates a pixel from channels listed blue first.
    #[inline]
    pub const fn from_bgra(b: u8, g: u8, r: u8, a: u8) -> Self {
        Self::new(r, g, b, a)
    }

    /// Creates a pixel from an `[r, g, b, a]` array.
    #[inline]
    pub const fn from_rgba(rgba: [u8; 4]) -> Self {
        Self::new(rgba[0], rgba[1], rgba[2], rgba[3])
    }

    /// Returns the channels as `[r, g, b, a]`.
    #[inline]
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Returns a copy with the alpha channel replaced.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }
}

impl From<[u8; 4]> for Pixel {
    fn from(rgba: [u8; 4]) -> Self {
        Pixel::from_rgba(rgba)
    }
}

impl From<Pixel> for [u8; 4] {
    fn from(px: Pixel) -> Self {
        px.to_rgba()
    }
}

/// Clamps an integer channel value into `[0, 255]`.
#[inline]
pub fn clamp_byte(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

/// Rounds a float channel value and clamps it into `[0, 255]`.
///
/// `NaN` maps to 0.
#[inline]
pub fn clamp_byte_f32(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bgra_order() {
        let px = Pixel::from_bgra(1, 2, 3, 4);
        assert_eq!(px.r, 3);
        assert_eq!(px.g, 2);
        assert_eq!(px.b, 1);
        assert_eq!(px.a, 4);
    }

    #[test]
    fn test_array_conversion() {
        let px: Pixel = [10, 20, 30, 40].into();
        let back: [u8; 4] = px.into();
        assert_eq!(back, [10, 20, 30, 40]);
    }

    #[test]
    fn test_clamp_byte() {
        assert_eq!(clamp_byte(-5), 0);
        assert_eq!(clamp_byte(128), 128);
        assert_eq!(clamp_byte(300), 255);
    }

    #[test]
    fn test_clamp_byte_f32() {
        assert_eq!(clamp_byte_f32(-0.4), 0);
        assert_eq!(clamp_byte_f32(127.5), 128);
        assert_eq!(clamp_byte_f32(254.6), 255);
        assert_eq!(clamp_byte_f32(1e9), 255);
        assert_eq!(clamp_byte_f32(f32::NAN), 0);
    }
}
