//! Sine-curve CAPTCHA images.
//!
//! ```no_run
//! use wavecaptcha::CaptchaBuilder;
//!
//! let captcha = CaptchaBuilder::new().curves(2).build()?;
//! std::fs::write("captcha.png", captcha.to_png_bytes()?)?;
//! println!("answer: {}", captcha.text());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod captcha;
pub mod color;
pub mod curve;
pub mod error;
pub mod font;
pub mod generator;
pub mod glyph;
pub mod noise;
pub mod options;
pub mod text;

pub use captcha::{generate, Captcha, CaptchaBuilder};
pub use color::{contrast_color, Color, Hsv};
pub use error::{CaptchaError, CaptchaResult};
pub use font::{BundledFonts, DirectoryFonts, FontData, FontProvider, MemoryFonts};
pub use generator::SharedGenerator;
pub use options::{Config, Options};
