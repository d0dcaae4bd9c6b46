use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{CaptchaError, CaptchaResult};
use crate::text::DEFAULT_ALPHABET;

pub const DEFAULT_LENGTH: usize = 6;
pub const DEFAULT_WIDTH: u32 = 240;
pub const DEFAULT_HEIGHT: u32 = 80;
pub const DEFAULT_FONT_DPI: f64 = 72.0;
pub const DEFAULT_FONT_SCALE: f64 = 1.0;
pub const DEFAULT_NOISE: f64 = 1.0;

/// At this factor every canvas pixel gets one noise write on average.
pub const MAX_NOISE: f64 = 28.0;
pub const MAX_FONT_SCALE: f64 = 10.0;
pub const MAX_FONT_DPI: f64 = 1200.0;

/// Caller-facing settings; anything left `None` falls back to a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    pub alphabet: Option<String>,
    pub length: Option<usize>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub curves: Option<usize>,
    pub background: Option<Color>,
    pub font_dpi: Option<f64>,
    pub font_scale: Option<f64>,
    pub noise: Option<f64>,
}

/// Normalized, validated settings for one generator.
///
/// Only [`Options::normalize`] and [`Config::default`] produce one.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    alphabet: Vec<char>,
    length: usize,
    width: u32,
    height: u32,
    curves: usize,
    background: Color,
    font_dpi: f64,
    font_scale: f64,
    noise: f64,
}

impl Config {
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn curves(&self) -> usize {
        self.curves
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn font_dpi(&self) -> f64 {
        self.font_dpi
    }

    pub fn font_scale(&self) -> f64 {
        self.font_scale
    }

    pub fn noise(&self) -> f64 {
        self.noise
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            alphabet: DEFAULT_ALPHABET.chars().collect(),
            length: DEFAULT_LENGTH,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            curves: 0,
            background: Color::TRANSPARENT,
            font_dpi: DEFAULT_FONT_DPI,
            font_scale: DEFAULT_FONT_SCALE,
            noise: DEFAULT_NOISE,
        }
    }
}

fn bounded(name: &str, value: Option<f64>, default: f64, max: f64) -> CaptchaResult<f64> {
    match value {
        None => Ok(default),
        Some(v) if v.is_finite() && v > 0.0 && v <= max => Ok(v),
        Some(v) => Err(CaptchaError::invalid_options(format!(
            "{name} must be in (0, {max}], got {v}"
        ))),
    }
}

fn nonzero<T: PartialEq + Default + Copy>(
    name: &str,
    value: Option<T>,
    default: T,
) -> CaptchaResult<T> {
    match value {
        None => Ok(default),
        Some(v) if v == T::default() => Err(CaptchaError::invalid_options(format!(
            "{name} must be at least 1"
        ))),
        Some(v) => Ok(v),
    }
}

impl Options {
    pub fn normalize(&self) -> CaptchaResult<Config> {
        let alphabet: Vec<char> = match &self.alphabet {
            None => DEFAULT_ALPHABET.chars().collect(),
            Some(s) => s.chars().collect(),
        };
        if alphabet.is_empty() {
            return Err(CaptchaError::invalid_options("alphabet must not be empty"));
        }

        Ok(Config {
            alphabet,
            length: nonzero("length", self.length, DEFAULT_LENGTH)?,
            width: nonzero("width", self.width, DEFAULT_WIDTH)?,
            height: nonzero("height", self.height, DEFAULT_HEIGHT)?,
            curves: self.curves.unwrap_or(0),
            background: self.background.unwrap_or(Color::TRANSPARENT),
            font_dpi: bounded("font_dpi", self.font_dpi, DEFAULT_FONT_DPI, MAX_FONT_DPI)?,
            font_scale: bounded(
                "font_scale",
                self.font_scale,
                DEFAULT_FONT_SCALE,
                MAX_FONT_SCALE,
            )?,
            noise: bounded("noise", self.noise, DEFAULT_NOISE, MAX_NOISE)?,
        })
    }

    /// Fields set in `other` win over fields set in `self`.
    pub fn merge(self, other: Options) -> Options {
        Options {
            alphabet: other.alphabet.or(self.alphabet),
            length: other.length.or(self.length),
            width: other.width.or(self.width),
            height: other.height.or(self.height),
            curves: other.curves.or(self.curves),
            background: other.background.or(self.background),
            font_dpi: other.font_dpi.or(self.font_dpi),
            font_scale: other.font_scale.or(self.font_scale),
            noise: other.noise.or(self.noise),
        }
    }
}
