//! Jittered per-character text rendering.

use image::{Rgba, RgbaImage};
use imageproc::pixelops::weighted_sum;
use rand::Rng;
use rusttype::{point, Font, Scale};

use crate::color::{contrast_color, Color};
use crate::error::{CaptchaError, CaptchaResult};
use crate::text::rand_below;

const POINTS_PER_INCH: f64 = 72.0;

/// Placement of one character, decided before rasterizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPlacement {
    pub ch: char,
    /// Left edge of the pen position.
    pub x: i32,
    /// Baseline row.
    pub y: i32,
    /// Font size in points.
    pub size: f64,
    pub color: Color,
}

/// Geometry shared by every glyph of one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub width: u32,
    pub height: u32,
    pub dpi: f64,
    pub font_scale: f64,
    pub background: Color,
}

/// Lays out `text` with one shared horizontal nudge and per-glyph jitter.
pub fn layout_text<R: Rng + ?Sized>(
    rng: &mut R,
    text: &str,
    style: &TextStyle,
) -> Vec<GlyphPlacement> {
    let count = text.chars().count().max(1) as u32;
    let slot = style.width / count;
    let shift = rand_below(rng, slot / 3);
    let height = f64::from(style.height);

    text.chars()
        .enumerate()
        .map(|(idx, ch)| {
            let shrink = rng.gen_range(0.9..1.3);
            let size = height / shrink * style.font_scale;
            let color = contrast_color(rng, style.background);
            let x = slot * idx as u32 + shift;
            let y = style.height / 5 + rand_below(rng, style.height / 3);
            GlyphPlacement {
                ch,
                x: x as i32,
                y: y as i32 + (size / 2.0) as i32,
                size,
                color,
            }
        })
        .collect()
}

/// Pixel size for a point size at `dpi`, snapped to whole pixels.
pub fn pixel_size(points: f64, dpi: f64) -> f32 {
    (points * dpi / POINTS_PER_INCH).round().max(1.0) as f32
}

/// Rasterizes one glyph with its pen origin on `(placement.x, placement.y)`.
///
/// Characters the font has no outline for map to `.notdef` and are rejected.
pub fn draw_glyph(
    image: &mut RgbaImage,
    font: &Font<'_>,
    placement: &GlyphPlacement,
    dpi: f64,
) -> CaptchaResult<()> {
    let glyph = font.glyph(placement.ch);
    if glyph.id().0 == 0 {
        return Err(CaptchaError::glyph_render(
            placement.ch,
            "font has no glyph for this character",
        ));
    }

    let size = pixel_size(placement.size, dpi);
    if !size.is_finite() {
        return Err(CaptchaError::glyph_render(
            placement.ch,
            format!("unusable font size {}", placement.size),
        ));
    }
    let glyph = glyph
        .scaled(Scale::uniform(size))
        .positioned(point(placement.x as f32, placement.y as f32));

    let Some(bb) = glyph.pixel_bounding_box() else {
        // whitespace and other blank glyphs
        return Ok(());
    };

    let (width, height) = (image.width() as i32, image.height() as i32);
    let color: Rgba<u8> = placement.color.to_rgba();
    glyph.draw(|gx, gy, coverage| {
        let px = bb.min.x + gx as i32;
        let py = bb.min.y + gy as i32;
        if px < 0 || py < 0 || px >= width || py >= height || coverage <= 0.0 {
            return;
        }
        let (px, py) = (px as u32, py as u32);
        let under = *image.get_pixel(px, py);
        let coverage = coverage.min(1.0);
        image.put_pixel(px, py, weighted_sum(under, color, 1.0 - coverage, coverage));
    });
    Ok(())
}

/// Lays out and draws `text`; the first failing character aborts the run.
pub fn draw_text<R: Rng + ?Sized>(
    rng: &mut R,
    image: &mut RgbaImage,
    font: &Font<'_>,
    text: &str,
    style: &TextStyle,
) -> CaptchaResult<Vec<GlyphPlacement>> {
    let placements = layout_text(rng, text, style);
    for placement in &placements {
        draw_glyph(image, font, placement, style.dpi)?;
    }
    Ok(placements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{parse_font, BundledFonts, FontProvider};
    use rand::{rngs::StdRng, SeedableRng};

    fn sans() -> Font<'static> {
        let id = "DejaVuSans-Bold.ttf";
        parse_font(id, BundledFonts.load(id).unwrap()).unwrap()
    }

    fn style() -> TextStyle {
        TextStyle {
            width: 240,
            height: 80,
            dpi: 72.0,
            font_scale: 1.0,
            background: Color::TRANSPARENT,
        }
    }

    #[test]
    fn layout_jitter_ranges() {
        let mut rng = StdRng::seed_from_u64(20);
        for _ in 0..100 {
            let placements = layout_text(&mut rng, "abcdef", &style());
            assert_eq!(placements.len(), 6);

            // slot width 40, shared shift in [0, 13)
            let shift = placements[0].x;
            assert!((0..13).contains(&shift));
            for (i, p) in placements.iter().enumerate() {
                assert_eq!(p.x, 40 * i as i32 + shift);
                assert!(p.size > 80.0 / 1.3 && p.size <= 80.0 / 0.9 + 1e-9);
                let top = p.y - (p.size / 2.0) as i32;
                assert!((16..42).contains(&top), "{p:?}");
                assert_eq!(p.color.a, 255);
            }
        }
    }

    #[test]
    fn font_scale_multiplies_size() {
        let mut a = StdRng::seed_from_u64(21);
        let mut b = StdRng::seed_from_u64(21);
        let base = layout_text(&mut a, "x", &style());
        let doubled = layout_text(
            &mut b,
            "x",
            &TextStyle {
                font_scale: 2.0,
                ..style()
            },
        );
        assert!((doubled[0].size - base[0].size * 2.0).abs() < 1e-9);
    }

    #[test]
    fn pixel_size_follows_dpi() {
        assert_eq!(pixel_size(40.0, 72.0), 40.0);
        assert_eq!(pixel_size(40.0, 144.0), 80.0);
        assert_eq!(pixel_size(10.4, 72.0), 10.0);
    }

    #[test]
    fn draws_visible_pixels() {
        let font = sans();
        let mut img = RgbaImage::new(100, 100);
        let placement = GlyphPlacement {
            ch: 'W',
            x: 10,
            y: 80,
            size: 60.0,
            color: Color::rgb(10, 20, 200),
        };
        draw_glyph(&mut img, &font, &placement, 72.0).unwrap();
        let inked = img.pixels().filter(|p| p.0[3] > 0).count();
        assert!(inked > 100, "only {inked} pixels inked");
        // nothing below the baseline for a 'W'
        assert!((85..100).all(|y| img.get_pixel(50, y).0[3] == 0));
    }

    #[test]
    fn missing_glyph_fails() {
        let font = sans();
        let mut img = RgbaImage::new(50, 50);
        let placement = GlyphPlacement {
            ch: '\u{10FFFD}',
            x: 0,
            y: 40,
            size: 30.0,
            color: Color::BLACK,
        };
        let err = draw_glyph(&mut img, &font, &placement, 72.0).unwrap_err();
        assert!(matches!(err, CaptchaError::GlyphRender { ch: '\u{10FFFD}', .. }));
    }

    #[test]
    fn draw_text_aborts_on_bad_char() {
        let font = sans();
        let mut rng = StdRng::seed_from_u64(22);
        let mut img = RgbaImage::new(240, 80);
        let res = draw_text(&mut rng, &mut img, &font, "ab\u{10FFFD}c", &style());
        assert!(res.is_err());
    }

    #[test]
    fn glyphs_partly_off_canvas_are_clipped() {
        let font = sans();
        let mut img = RgbaImage::new(20, 20);
        let placement = GlyphPlacement {
            ch: 'M',
            x: -10,
            y: 30,
            size: 40.0,
            color: Color::BLACK,
        };
        draw_glyph(&mut img, &font, &placement, 72.0).unwrap();
        assert_eq!(img.dimensions(), (20, 20));
    }
}
