//! Color values and the contrast-aware foreground selector.
//!
//! [`Color`] is straight (non-premultiplied) RGBA8. [`Hsv`] carries hue in
//! degrees and saturation/value in `[0, 1]`; conversions between the two are
//! exact up to 8-bit rounding.

use std::{fmt, str::FromStr};

use image::Rgba;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CaptchaError, CaptchaResult};

/// Smallest lightness gap between a foreground and its background.
pub const MIN_CONTRAST: f64 = 0.3;

/// Extra spread added on top of [`MIN_CONTRAST`].
const CONTRAST_SPREAD: f64 = 0.2;

const SATURATION_MIN: f64 = 0.6;
const SATURATION_SPREAD: f64 = 0.2;

/// Covers the worst-case 8-bit rounding of max and min channels.
const ROUNDING_SLACK: f64 = 1.0 / 255.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    /// Degrees in `[0, 360)`.
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::rgba(r, g, b, 255)
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Midpoint of the largest and smallest RGB channel, in `[0, 1]`.
    ///
    /// A fully transparent color counts as white.
    pub fn lightness(self) -> f64 {
        if self.is_transparent() {
            return 1.0;
        }
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        (f64::from(max) + f64::from(min)) / (2.0 * 255.0)
    }

    pub fn from_hsv(hsv: Hsv, alpha: u8) -> Self {
        let h = hsv.h.rem_euclid(360.0);
        let s = hsv.s.clamp(0.0, 1.0);
        let v = hsv.v.clamp(0.0, 1.0);

        let c = v * s;
        let sector = h / 60.0;
        let x = c * (1.0 - (sector % 2.0 - 1.0).abs());
        let (r, g, b) = match sector as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = v - c;
        Color::rgba(channel(r + m), channel(g + m), channel(b + m), alpha)
    }

    pub fn to_hsv(self) -> Hsv {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let h = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        let s = if max == 0.0 { 0.0 } else { delta / max };

        Hsv { h, s, v: max }
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, self.a])
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }

    /// Parses `#rrggbb`, `#rrggbbaa` (leading `#` optional) or `transparent`.
    pub fn from_hex(hex: &str) -> CaptchaResult<Self> {
        let hex = hex.trim();
        if hex.eq_ignore_ascii_case("transparent") {
            return Ok(Color::TRANSPARENT);
        }
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
            return Err(CaptchaError::invalid_options(format!(
                "color '{hex}': expected 6 or 8 hex digits"
            )));
        }
        let part = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|e| {
                CaptchaError::invalid_options(format!("color '{hex}': {e}"))
            })
        };
        let a = if digits.len() == 8 { part(6)? } else { 255 };
        Ok(Color::rgba(part(0)?, part(2)?, part(4)?, a))
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::TRANSPARENT
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = CaptchaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = CaptchaError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Color::from_hex(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

impl From<Color> for Rgba<u8> {
    fn from(c: Color) -> Self {
        c.to_rgba()
    }
}

fn channel(unit: f64) -> u8 {
    (unit.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Picks an opaque foreground that stays legible on `background`.
///
/// Light backgrounds get a darker value, dark ones a lighter value, with a
/// random hue and a saturation in `[0.6, 0.8)`.
pub fn contrast_color<R: Rng + ?Sized>(rng: &mut R, background: Color) -> Color {
    let base = background.lightness();
    let offset = MIN_CONTRAST + rng.gen_range(0.0..CONTRAST_SPREAD);
    let value = if base >= 0.5 {
        base - offset
    } else {
        base + offset
    };
    let hsv = Hsv {
        h: rng.gen_range(0.0..360.0),
        s: SATURATION_MIN + rng.gen_range(0.0..SATURATION_SPREAD),
        v: value,
    };

    let color = Color::from_hsv(hsv, 255);
    if (color.lightness() - base).abs() >= MIN_CONTRAST {
        return color;
    }
    Color::from_hsv(lift_to_contrast(hsv, base), 255)
}

// An HSV color's lightness is v * (1 - s/2), so on dark backgrounds the raw
// value offset can fall short; raise value first, then drop saturation.
fn lift_to_contrast(hsv: Hsv, base: f64) -> Hsv {
    let target = (base + MIN_CONTRAST + ROUNDING_SLACK).min(1.0);
    let value = target / (1.0 - hsv.s / 2.0);
    if value <= 1.0 {
        return Hsv { v: value, ..hsv };
    }
    Hsv {
        h: hsv.h,
        s: 2.0 * (1.0 - target),
        v: 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn lightness_of_transparent_is_white() {
        assert_eq!(Color::TRANSPARENT.lightness(), 1.0);
        assert_eq!(Color::rgba(0, 0, 0, 0).lightness(), 1.0);
        assert_eq!(Color::WHITE.lightness(), 1.0);
        assert_eq!(Color::BLACK.lightness(), 0.0);
    }

    #[test]
    fn lightness_uses_channel_midpoint() {
        let c = Color::rgb(255, 0, 0);
        assert!((c.lightness() - 0.5).abs() < 1e-9);
        let c = Color::rgb(51, 102, 204);
        assert!((c.lightness() - (204.0 + 51.0) / 510.0).abs() < 1e-9);
    }

    #[test]
    fn hsv_primaries() {
        let red = Color::from_hsv(Hsv { h: 0.0, s: 1.0, v: 1.0 }, 255);
        assert_eq!(red, Color::rgb(255, 0, 0));
        let green = Color::from_hsv(Hsv { h: 120.0, s: 1.0, v: 1.0 }, 255);
        assert_eq!(green, Color::rgb(0, 255, 0));
        let blue = Color::from_hsv(Hsv { h: 240.0, s: 1.0, v: 1.0 }, 7);
        assert_eq!(blue, Color::rgba(0, 0, 255, 7));
        let grey = Color::from_hsv(Hsv { h: 42.0, s: 0.0, v: 0.5 }, 255);
        assert_eq!(grey, Color::rgb(128, 128, 128));
    }

    #[test]
    fn hsv_conversion_is_stable_within_rounding() {
        for &c in &[
            Color::rgb(12, 200, 99),
            Color::rgb(250, 3, 180),
            Color::rgb(77, 77, 200),
            Color::rgb(240, 240, 10),
        ] {
            let back = Color::from_hsv(c.to_hsv(), c.a);
            assert!(c.r.abs_diff(back.r) <= 1, "{c} -> {back}");
            assert!(c.g.abs_diff(back.g) <= 1, "{c} -> {back}");
            assert!(c.b.abs_diff(back.b) <= 1, "{c} -> {back}");
        }
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(Color::from_hex("#ff8000").unwrap(), Color::rgb(255, 128, 0));
        assert_eq!(
            Color::from_hex("10203040").unwrap(),
            Color::rgba(0x10, 0x20, 0x30, 0x40)
        );
        assert_eq!(Color::from_hex("transparent").unwrap(), Color::TRANSPARENT);
        assert!(Color::from_hex("#fff").is_err());
        assert!(Color::from_hex("#gg0000").is_err());
        assert_eq!(Color::rgb(1, 2, 3).to_hex(), "#010203ff");
    }

    #[test]
    fn contrast_holds_against_many_backgrounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let backgrounds = [
            Color::TRANSPARENT,
            Color::WHITE,
            Color::BLACK,
            Color::rgb(128, 128, 128),
            Color::rgb(110, 120, 115),
            Color::rgb(255, 0, 0),
            Color::rgb(0, 0, 200),
            Color::rgba(30, 30, 30, 128),
        ];
        for bg in backgrounds {
            for _ in 0..500 {
                let fg = contrast_color(&mut rng, bg);
                assert_eq!(fg.a, 255);
                let gap = (fg.lightness() - bg.lightness()).abs();
                assert!(gap >= MIN_CONTRAST, "bg {bg} fg {fg} gap {gap}");
            }
        }
    }

    #[test]
    fn transparent_background_yields_dark_foregrounds() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..1000 {
            let fg = contrast_color(&mut rng, Color::TRANSPARENT);
            let l = fg.lightness();
            assert!((0.2..0.5).contains(&l), "lightness {l}");
            let v = fg.to_hsv().v;
            assert!(v > 0.49 && v <= 0.71, "value {v}");
        }
    }
}
