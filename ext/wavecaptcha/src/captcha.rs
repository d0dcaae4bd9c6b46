use std::io::Write;

use image::{codecs::png::PngEncoder, ColorType, ImageEncoder, RgbaImage};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::color::Color;
use crate::curve::draw_curves;
use crate::error::CaptchaResult;
use crate::font::{choose_font, BundledFonts, FontProvider};
use crate::glyph::{draw_text, TextStyle};
use crate::noise::draw_noise;
use crate::options::{Config, Options};
use crate::text::random_text;

/// A finished challenge: the answer and the image that shows it.
#[derive(Debug, Clone)]
pub struct Captcha {
    text: String,
    image: RgbaImage,
}

impl Captcha {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_parts(self) -> (String, RgbaImage) {
        (self.text, self.image)
    }

    /// Encodes the image as RGBA PNG into `sink`.
    pub fn write_png<W: Write>(&self, sink: W) -> CaptchaResult<()> {
        PngEncoder::new(sink).write_image(
            self.image.as_raw(),
            self.image.width(),
            self.image.height(),
            ColorType::Rgba8,
        )?;
        Ok(())
    }

    pub fn to_png_bytes(&self) -> CaptchaResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write_png(&mut bytes)?;
        Ok(bytes)
    }
}

/// Runs the whole pipeline: text, background, noise, curves, glyphs.
#[tracing::instrument(
    skip_all,
    fields(width = config.width(), height = config.height(), length = config.length())
)]
pub fn generate<P, R>(config: &Config, fonts: &P, rng: &mut R) -> CaptchaResult<Captcha>
where
    P: FontProvider + ?Sized,
    R: Rng + ?Sized,
{
    let text = random_text(rng, config.alphabet(), config.length());

    let background = config.background();
    let mut image = RgbaImage::from_pixel(config.width(), config.height(), background.to_rgba());

    let noise = draw_noise(rng, &mut image, config.noise());
    tracing::debug!(noise, "noise drawn");

    draw_curves(rng, &mut image, config.curves(), background);

    let font = choose_font(fonts, rng)?;
    let style = TextStyle {
        width: config.width(),
        height: config.height(),
        dpi: config.font_dpi(),
        font_scale: config.font_scale(),
        background,
    };
    draw_text(rng, &mut image, &font, &text, &style)?;

    Ok(Captcha { text, image })
}

#[derive(Debug, Clone, Default)]
pub struct CaptchaBuilder {
    options: Options,
}

impl CaptchaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_options(options: Options) -> Self {
        CaptchaBuilder { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn alphabet(mut self, alphabet: impl Into<String>) -> Self {
        self.options.alphabet = Some(alphabet.into());
        self
    }

    pub fn length(mut self, length: usize) -> Self {
        self.options.length = Some(length);
        self
    }

    pub fn width(mut self, width: u32) -> Self {
        self.options.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.options.height = Some(height);
        self
    }

    pub fn curves(mut self, curves: usize) -> Self {
        self.options.curves = Some(curves);
        self
    }

    pub fn background(mut self, background: Color) -> Self {
        self.options.background = Some(background);
        self
    }

    pub fn font_dpi(mut self, dpi: f64) -> Self {
        self.options.font_dpi = Some(dpi);
        self
    }

    pub fn font_scale(mut self, scale: f64) -> Self {
        self.options.font_scale = Some(scale);
        self
    }

    pub fn noise(mut self, noise: f64) -> Self {
        self.options.noise = Some(noise);
        self
    }

    /// Builds with bundled fonts and a freshly seeded random source.
    pub fn build(&self) -> CaptchaResult<Captcha> {
        self.build_with(&mut StdRng::from_entropy())
    }

    pub fn build_with<R: Rng + ?Sized>(&self, rng: &mut R) -> CaptchaResult<Captcha> {
        self.build_with_fonts(&BundledFonts, rng)
    }

    pub fn build_with_fonts<P, R>(&self, fonts: &P, rng: &mut R) -> CaptchaResult<Captcha>
    where
        P: FontProvider + ?Sized,
        R: Rng + ?Sized,
    {
        generate(&self.options.normalize()?, fonts, rng)
    }
}
