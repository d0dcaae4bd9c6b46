//! Sine-wave interference strokes.

use std::f64::consts::PI;

use image::RgbaImage;
use imageproc::{drawing::draw_filled_rect_mut, rect::Rect};
use rand::Rng;

use crate::color::{contrast_color, Color};
use crate::text::rand_below;

/// Canvases at most this wide use the full span instead of random insets.
const NARROW_WIDTH: u32 = 40;

/// Stroke thickness in rows.
const STROKE_ROWS: u32 = 2;

/// One randomized sine stroke, ready to be drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SineCurve {
    /// First column, inclusive.
    pub x_start: u32,
    /// Last column, inclusive.
    pub x_end: u32,
    pub amplitude: f64,
    pub baseline: i32,
    pub frequency: f64,
    /// `1.0` or `-1.0`.
    pub flip: f64,
    pub color: Color,
}

impl SineCurve {
    pub fn random<R: Rng + ?Sized>(
        rng: &mut R,
        width: u32,
        height: u32,
        background: Color,
    ) -> Self {
        let (x_start, x_end) = if width <= NARROW_WIDTH {
            (1, width.saturating_sub(1))
        } else {
            let inset = width / 10;
            (
                rand_below(rng, inset) + 1,
                width - rand_below(rng, inset) - 1,
            )
        };

        let sixth = f64::from(height) / 6.0;
        let amplitude = sixth + rng.gen_range(0.0..1.0) * sixth;
        let baseline = (rand_below(rng, height * 2 / 3) + height / 6) as i32;
        let frequency = rng.gen_range(1.0..2.0);
        let flip = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        let color = contrast_color(rng, background);

        SineCurve {
            x_start,
            x_end,
            amplitude,
            baseline,
            frequency,
            flip,
            color,
        }
    }

    /// Row of the upper stroke pixel at column `x`.
    pub fn y_at(&self, x: u32, width: u32) -> i32 {
        let phase = PI * self.frequency * f64::from(x) / f64::from(width);
        let offset = phase.sin() * self.amplitude * self.flip;
        offset as i32 + self.baseline
    }

    /// Draws the stroke; points that fall off the canvas are clipped.
    pub fn draw(&self, image: &mut RgbaImage) {
        let width = image.width();
        if width == 0 || self.x_start > self.x_end {
            return;
        }
        let color = self.color.to_rgba();
        for x in self.x_start..=self.x_end {
            let y = self.y_at(x, width);
            draw_filled_rect_mut(image, Rect::at(x as i32, y).of_size(1, STROKE_ROWS), color);
        }
    }
}

/// Draws `count` independent curves and returns them.
pub fn draw_curves<R: Rng + ?Sized>(
    rng: &mut R,
    image: &mut RgbaImage,
    count: usize,
    background: Color,
) -> Vec<SineCurve> {
    let (width, height) = image.dimensions();
    (0..count)
        .map(|_| {
            let curve = SineCurve::random(rng, width, height, background);
            tracing::debug!(?curve, "sine curve");
            curve.draw(image);
            curve
        })
        .collect()
}
