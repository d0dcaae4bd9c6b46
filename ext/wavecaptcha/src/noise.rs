use image::{Rgba, RgbaImage};
use rand::Rng;

use crate::options::MAX_NOISE;

/// Canvas area covered by one noise pixel at a noise factor of 1.0.
const AREA_PER_NOISE_PIXEL: f64 = 28.0;

/// Number of noise pixels for a canvas, `floor(w * h / (28 / factor))`.
///
/// `factor` is capped at [`MAX_NOISE`], so the count never exceeds `w * h`.
pub fn noise_count(width: u32, height: u32, factor: f64) -> usize {
    let area = f64::from(width) * f64::from(height);
    let factor = factor.min(MAX_NOISE);
    (area / (AREA_PER_NOISE_PIXEL / factor)).floor() as usize
}

/// Overwrites randomly chosen pixels with random opaque colors.
///
/// Returns how many pixels were written; the same pixel may be hit twice.
pub fn draw_noise<R: Rng + ?Sized>(rng: &mut R, image: &mut RgbaImage, factor: f64) -> usize {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return 0;
    }
    let count = noise_count(width, height, factor);
    for _ in 0..count {
        let x = rng.gen_range(0..width);
        let y = rng.gen_range(0..height);
        let color = Rgba([rng.gen(), rng.gen(), rng.gen(), 255]);
        image.put_pixel(x, y, color);
    }
    count
}
