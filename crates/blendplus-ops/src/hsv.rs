//! HSV color model used by the hue, saturation, color and luminosity modes.
//!
//! Conversions are done in `f32`: hue in degrees `[0, 360)`, saturation and
//! value in `[0, 1]`. Converting back rounds each channel to the nearest byte.

use blendplus_core::{clamp_byte_f32, Pixel};

/// A color in hue/saturation/value form.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsv {
    /// Hue in degrees, `[0, 360)`.
    pub h: f32,
    /// Saturation, `[0, 1]`.
    pub s: f32,
    /// Value, `[0, 1]`.
    pub v: f32,
}

impl Hsv {
    /// Creates an HSV triple.
    #[inline]
    pub const fn new(h: f32, s: f32, v: f32) -> Self {
        Self { h, s, v }
    }

    /// Converts the color channels of a pixel. Alpha is ignored.
    pub fn from_pixel(px: Pixel) -> Self {
        let r = px.r as f32 / 255.0;
        let g = px.g as f32 / 255.0;
        let b = px.b as f32 / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let v = max;
        let s = if max > 0.0 { delta / max } else { 0.0 };

        if delta <= 0.0 {
            return Self::new(0.0, s, v);
        }

        let mut h = if max == r {
            60.0 * ((g - b) / delta)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        if h < 0.0 {
            h += 360.0;
        }
        if h >= 360.0 {
            h -= 360.0;
        }

        Self::new(h, s, v)
    }

    /// Converts back to an opaque pixel.
    pub fn to_pixel(self) -> Pixel {
        let s = self.s.clamp(0.0, 1.0);
        let v = self.v.clamp(0.0, 1.0);

        if s <= 0.0 {
            let c = clamp_byte_f32(v * 255.0);
            return Pixel::opaque(c, c, c);
        }

        let h = self.h.rem_euclid(360.0) / 60.0;
        let sector = h.floor();
        let f = h - sector;

        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match sector as u32 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };

        Pixel::opaque(
            clamp_byte_f32(r * 255.0),
            clamp_byte_f32(g * 255.0),
            clamp_byte_f32(b * 255.0),
        )
    }
}
