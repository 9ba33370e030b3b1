//! Per-pixel blend modes.
//!
//! Every mode is a pure function of a base pixel and an overlay pixel. Color
//! channels are computed in integer arithmetic (division truncates toward
//! zero) and clamped to `[0, 255]`. The output alpha never depends on the
//! mode: it is always the alpha of the overlay composited over the base.
//!
//! # Modes
//!
//! - Arithmetic: [`BlendMode::Additive`], [`BlendMode::Average`],
//!   [`BlendMode::Difference`], [`BlendMode::Divide`], [`BlendMode::Multiply`],
//!   [`BlendMode::Screen`], ...
//! - Contrast: [`BlendMode::Overlay`], [`BlendMode::HardLight`],
//!   [`BlendMode::SoftLight`], [`BlendMode::VividLight`], [`BlendMode::PinLight`]
//! - Channel isolation: [`BlendMode::Red`], [`BlendMode::Green`],
//!   [`BlendMode::Blue`], [`BlendMode::Cyan`], [`BlendMode::Magenta`],
//!   [`BlendMode::Yellow`]
//! - HSV recombination: [`BlendMode::Hue`], [`BlendMode::Saturation`],
//!   [`BlendMode::Color`], [`BlendMode::Luminosity`]
//!
//! # Example
//!
//! ```rust
//! use blendplus_core::Pixel;
//! use blendplus_ops::blend::{blend, BlendMode};
//!
//! let red = Pixel::opaque(255, 0, 0);
//! let blue = Pixel::opaque(0, 0, 255);
//!
//! let out = blend(red, blue, BlendMode::Difference);
//! assert_eq!(out, Pixel::opaque(255, 0, 255));
//! ```

use std::fmt;
use std::str::FromStr;

use blendplus_core::{clamp_byte, clamp_byte_f32, Pixel};
use serde::{Deserialize, Serialize};

use crate::hsv::Hsv;
use crate::OpsError;

/// Signature shared by every blend function: `(base, overlay) -> output`.
pub type BlendFn = fn(Pixel, Pixel) -> Pixel;

/// Blend mode selector.
///
/// Variant order is stable; [`BlendMode::index`] and
/// [`BlendMode::from_index`] use it for persisted settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// Alpha "over" of the overlay atop the base.
    #[default]
    Normal,
    /// `b + o`.
    Additive,
    /// `(b + o) / 2`.
    Average,
    /// Blue channel from the overlay.
    Blue,
    /// Overlay hue and saturation, base value.
    Color,
    /// Darkens the base by the inverse of the overlay.
    ColorBurn,
    /// Brightens the base by the overlay.
    ColorDodge,
    /// Blue and green channels from the overlay.
    Cyan,
    /// Per-channel minimum.
    Darken,
    /// `|b - o|`.
    Difference,
    /// `b * 255 / (o + 1)`.
    Divide,
    /// Lower-contrast difference.
    Exclusion,
    /// `o * o / (255 - b)`.
    Glow,
    /// `b - o + 128`.
    GrainExtract,
    /// `b + o - 128`.
    GrainMerge,
    /// Green channel from the overlay.
    Green,
    /// Overlay with the roles of base and overlay exchanged.
    HardLight,
    /// Thresholds `b + o` at 255.
    HardMix,
    /// Overlay hue, base saturation and value.
    Hue,
    /// Per-channel maximum.
    Lighten,
    /// `b + o - 255`.
    LinearBurn,
    /// `b + o`.
    LinearDodge,
    /// `b + 2o - 255`.
    LinearLight,
    /// Base hue and saturation, overlay value.
    Luminosity,
    /// Blue and red channels from the overlay.
    Magenta,
    /// `b * o / 255`.
    Multiply,
    /// `255 - |255 - b - o|`.
    Negation,
    /// Multiply or screen depending on the base.
    Overlay,
    /// `min - max + 255`.
    Phoenix,
    /// Replaces channels depending on the overlay brightness.
    PinLight,
    /// Red channel from the overlay.
    Red,
    /// `b * b / (255 - o)`.
    Reflect,
    /// Overlay saturation, base hue and value.
    Saturation,
    /// Inverse multiply.
    Screen,
    /// `(b - o) / 2 + 128`.
    SignedDifference,
    /// Soft contrast, computed in floating point.
    SoftLight,
    /// Same as linear light.
    Stamp,
    /// Burn or dodge depending on the overlay.
    VividLight,
    /// Green and red channels from the overlay.
    Yellow,
}

impl BlendMode {
    /// Every mode in index order.
    pub const ALL: [BlendMode; 39] = [
        Self::Normal,
        Self::Additive,
        Self::Average,
        Self::Blue,
        Self::Color,
        Self::ColorBurn,
        Self::ColorDodge,
        Self::Cyan,
        Self::Darken,
        Self::Difference,
        Self::Divide,
        Self::Exclusion,
        Self::Glow,
        Self::GrainExtract,
        Self::GrainMerge,
        Self::Green,
        Self::HardLight,
        Self::HardMix,
        Self::Hue,
        Self::Lighten,
        Self::LinearBurn,
        Self::LinearDodge,
        Self::LinearLight,
        Self::Luminosity,
        Self::Magenta,
        Self::Multiply,
        Self::Negation,
        Self::Overlay,
        Self::Phoenix,
        Self::PinLight,
        Self::Red,
        Self::Reflect,
        Self::Saturation,
        Self::Screen,
        Self::SignedDifference,
        Self::SoftLight,
        Self::Stamp,
        Self::VividLight,
        Self::Yellow,
    ];

    /// Position of this mode in [`BlendMode::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Mode at `index`, or [`BlendMode::Normal`] for an unknown index.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self::ALL.get(index).copied().unwrap_or_default()
    }

    /// Human-readable name, e.g. `"Color Burn"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Additive => "Additive",
            Self::Average => "Average",
            Self::Blue => "Blue",
            Self::Color => "Color",
            Self::ColorBurn => "Color Burn",
            Self::ColorDodge => "Color Dodge",
            Self::Cyan => "Cyan",
            Self::Darken => "Darken",
            Self::Difference => "Difference",
            Self::Divide => "Divide",
            Self::Exclusion => "Exclusion",
            Self::Glow => "Glow",
            Self::GrainExtract => "Grain Extract",
            Self::GrainMerge => "Grain Merge",
            Self::Green => "Green",
            Self::HardLight => "Hard Light",
            Self::HardMix => "Hard Mix",
            Self::Hue => "Hue",
            Self::Lighten => "Lighten",
            Self::LinearBurn => "Linear Burn",
            Self::LinearDodge => "Linear Dodge",
            Self::LinearLight => "Linear Light",
            Self::Luminosity => "Luminosity",
            Self::Magenta => "Magenta",
            Self::Multiply => "Multiply",
            Self::Negation => "Negation",
            Self::Overlay => "Overlay",
            Self::Phoenix => "Phoenix",
            Self::PinLight => "Pin Light",
            Self::Red => "Red",
            Self::Reflect => "Reflect",
            Self::Saturation => "Saturation",
            Self::Screen => "Screen",
            Self::SignedDifference => "Signed Difference",
            Self::SoftLight => "Soft Light",
            Self::Stamp => "Stamp",
            Self::VividLight => "Vivid Light",
            Self::Yellow => "Yellow",
        }
    }

    /// The function implementing this mode.
    #[inline]
    pub fn function(self) -> BlendFn {
        BLEND_TABLE[self.index()]
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlendMode {
    type Err = OpsError;

    /// Parses `"color-burn"`, `"Color Burn"`, `"color_burn"` or `"ColorBurn"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize_name(s);
        Self::ALL
            .iter()
            .copied()
            .find(|m| normalize_name(m.name()) == key)
            .ok_or_else(|| OpsError::InvalidParameter(format!("unknown blend mode '{s}'")))
    }
}

fn normalize_name(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Mode dispatch, indexed by [`BlendMode::index`].
static BLEND_TABLE: [BlendFn; 39] = [
    normal,
    additive,
    average,
    blue,
    color,
    color_burn,
    color_dodge,
    cyan,
    darken,
    difference,
    divide,
    exclusion,
    glow,
    grain_extract,
    grain_merge,
    green,
    hard_light,
    hard_mix,
    hue,
    lighten,
    linear_burn,
    linear_dodge,
    linear_light,
    luminosity,
    magenta,
    multiply,
    negation,
    overlay,
    phoenix,
    pin_light,
    red,
    reflect,
    saturation,
    screen,
    signed_difference,
    soft_light,
    stamp,
    vivid_light,
    yellow,
];

/// Blends `overlay` onto `base` with the given mode.
#[inline]
pub fn blend(base: Pixel, overlay: Pixel, mode: BlendMode) -> Pixel {
    (mode.function())(base, overlay)
}

/// Output alpha shared by all modes: `b + o - b*o/255`, rounded.
#[inline]
pub fn composite_alpha(base_a: u8, overlay_a: u8) -> u8 {
    let b = base_a as u32;
    let o = overlay_a as u32;
    ((o * 255 + b * (255 - o) + 127) / 255) as u8
}

/// Straight-alpha "over" of `overlay` atop `base`, rounded.
///
/// ```rust
/// use blendplus_core::Pixel;
/// use blendplus_ops::blend::over;
///
/// let half_red = Pixel::new(255, 0, 0, 128);
/// let blue = Pixel::opaque(0, 0, 255);
/// let out = over(blue, half_red);
/// assert_eq!(out.a, 255);
/// assert_eq!(out.r, 128);
/// ```
#[inline]
pub fn over(base: Pixel, overlay: Pixel) -> Pixel {
    let oa = overlay.a as u32;
    let ba = base.a as u32;
    let wo = oa * 255;
    let wb = ba * (255 - oa);
    let total = wo + wb;
    if total == 0 {
        return Pixel::TRANSPARENT;
    }
    let half = total / 2;
    let mix = |o: u8, b: u8| ((o as u32 * wo + b as u32 * wb + half) / total) as u8;
    Pixel::new(
        mix(overlay.r, base.r),
        mix(overlay.g, base.g),
        mix(overlay.b, base.b),
        ((total + 127) / 255) as u8,
    )
}

#[inline]
fn per_channel(base: Pixel, overlay: Pixel, f: impl Fn(i32, i32) -> i32) -> Pixel {
    Pixel::new(
        clamp_byte(f(base.r as i32, overlay.r as i32)),
        clamp_byte(f(base.g as i32, overlay.g as i32)),
        clamp_byte(f(base.b as i32, overlay.b as i32)),
        composite_alpha(base.a, overlay.a),
    )
}

#[inline]
fn channels(r: u8, g: u8, b: u8, base: Pixel, overlay: Pixel) -> Pixel {
    Pixel::new(r, g, b, composite_alpha(base.a, overlay.a))
}

fn normal(b: Pixel, o: Pixel) -> Pixel {
    over(b, o)
}

fn additive(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| b + o)
}

fn average(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| (b + o) / 2)
}

fn color_burn(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| if o == 0 { 0 } else { 255 - ((255 - b) << 8) / o })
}

fn color_dodge(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| if o == 255 { 255 } else { (b << 8) / (255 - o) })
}

fn darken(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| b.min(o))
}

fn lighten(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| b.max(o))
}

fn difference(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| (b - o).abs())
}

fn divide(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| b * 255 / (o + 1))
}

fn exclusion(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| b + o - 2 * b * o / 255)
}

fn glow(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| if b == 255 { 255 } else { o * o / (255 - b) })
}

fn reflect(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| if o == 255 { 255 } else { b * b / (255 - o) })
}

fn grain_extract(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| b - o + 128)
}

fn grain_merge(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| b + o - 128)
}

#[inline]
fn hard_light_channel(b: i32, o: i32, o_bright: i32) -> i32 {
    if o > 128 {
        255 - (255 - b) * (255 - 2 * (o_bright - 128)) / 255
    } else {
        2 * b * o / 255
    }
}

fn hard_light(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| hard_light_channel(b, o, o))
}

/// Hard light as historically shipped: the blue channel's bright branch
/// uses the overlay's green channel in its screen term.
///
/// Kept for output compatibility with older renders. [`BlendMode::HardLight`]
/// uses the per-channel formula.
pub fn hard_light_legacy(base: Pixel, overlay: Pixel) -> Pixel {
    let (b, o) = (base, overlay);
    channels(
        clamp_byte(hard_light_channel(b.r as i32, o.r as i32, o.r as i32)),
        clamp_byte(hard_light_channel(b.g as i32, o.g as i32, o.g as i32)),
        clamp_byte(hard_light_channel(b.b as i32, o.b as i32, o.g as i32)),
        base,
        overlay,
    )
}

fn hard_mix(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| if o >= 255 - b { 255 } else { 0 })
}

fn linear_burn(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| b + o - 255)
}

fn linear_dodge(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| b + o)
}

fn linear_light(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| b + 2 * o - 255)
}

fn stamp(b: Pixel, o: Pixel) -> Pixel {
    linear_light(b, o)
}

fn multiply(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| b * o / 255)
}

fn negation(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| 255 - (255 - b - o).abs())
}

fn overlay(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| {
        if b < 128 {
            2 * o * b / 255
        } else {
            255 - 2 * (255 - o) * (255 - b) / 255
        }
    })
}

fn phoenix(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| b.min(o) - b.max(o) + 255)
}

fn pin_light(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| {
        let lo = 2 * o - 255;
        let hi = 2 * o;
        // Later rules override earlier ones; values on a boundary stay 0.
        let mut out = 0;
        if b < lo {
            out = lo;
        }
        if b > lo && b < hi {
            out = b;
        }
        if b > hi {
            out = hi;
        }
        out
    })
}

fn screen(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| 255 - (((255 - b) * (255 - o)) >> 8))
}

fn signed_difference(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| (b - o) / 2 + 128)
}

#[inline]
fn soft_light_channel(b: u8, o: u8) -> u8 {
    let mid = ((b >> 1) as i32 + 64) as f32;
    let o = o as f32;
    let v = if o < 128.0 {
        2.0 * mid * (o / 255.0)
    } else {
        255.0 - 2.0 * (255.0 - mid) * (255.0 - o) / 255.0
    };
    clamp_byte_f32(v)
}

fn soft_light(b: Pixel, o: Pixel) -> Pixel {
    channels(
        soft_light_channel(b.r, o.r),
        soft_light_channel(b.g, o.g),
        soft_light_channel(b.b, o.b),
        b,
        o,
    )
}

fn vivid_light(b: Pixel, o: Pixel) -> Pixel {
    per_channel(b, o, |b, o| {
        if o <= 128 {
            b + 2 * o - 255
        } else {
            b + 2 * (o - 128)
        }
    })
}

fn red(b: Pixel, o: Pixel) -> Pixel {
    channels(o.r, b.g, b.b, b, o)
}

fn green(b: Pixel, o: Pixel) -> Pixel {
    channels(b.r, o.g, b.b, b, o)
}

fn blue(b: Pixel, o: Pixel) -> Pixel {
    channels(b.r, b.g, o.b, b, o)
}

fn cyan(b: Pixel, o: Pixel) -> Pixel {
    channels(b.r, o.g, o.b, b, o)
}

fn magenta(b: Pixel, o: Pixel) -> Pixel {
    channels(o.r, b.g, o.b, b, o)
}

fn yellow(b: Pixel, o: Pixel) -> Pixel {
    channels(o.r, o.g, b.b, b, o)
}

#[inline]
fn recombine(b: Pixel, o: Pixel, pick: impl Fn(Hsv, Hsv) -> Hsv) -> Pixel {
    let out = pick(Hsv::from_pixel(b), Hsv::from_pixel(o)).to_pixel();
    out.with_alpha(composite_alpha(b.a, o.a))
}

fn color(b: Pixel, o: Pixel) -> Pixel {
    recombine(b, o, |b, o| Hsv::new(o.h, o.s, b.v))
}

fn hue(b: Pixel, o: Pixel) -> Pixel {
    recombine(b, o, |b, o| Hsv::new(o.h, b.s, b.v))
}

fn saturation(b: Pixel, o: Pixel) -> Pixel {
    recombine(b, o, |b, o| Hsv::new(b.h, o.s, b.v))
}

fn luminosity(b: Pixel, o: Pixel) -> Pixel {
    recombine(b, o, |b, o| Hsv::new(b.h, b.s, o.v))
}
