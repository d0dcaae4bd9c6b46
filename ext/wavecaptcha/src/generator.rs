use std::sync::{Mutex, PoisonError};

use rand::{rngs::StdRng, SeedableRng};

use crate::captcha::{generate, Captcha};
use crate::error::CaptchaResult;
use crate::font::{BundledFonts, FontProvider};
use crate::options::{Config, Options};

/// A reusable generator that can be shared between threads.
///
/// The random source sits behind a mutex held for a whole generation, so
/// concurrent callers each get an uninterleaved sequence.
pub struct SharedGenerator<P = BundledFonts> {
    config: Config,
    fonts: P,
    rng: Mutex<StdRng>,
}

impl SharedGenerator<BundledFonts> {
    pub fn new(options: &Options) -> CaptchaResult<Self> {
        Self::with_fonts(options, BundledFonts, StdRng::from_entropy())
    }

    pub fn seeded(options: &Options, seed: u64) -> CaptchaResult<Self> {
        Self::with_fonts(options, BundledFonts, StdRng::seed_from_u64(seed))
    }
}

impl<P: FontProvider> SharedGenerator<P> {
    pub fn with_fonts(options: &Options, fonts: P, rng: StdRng) -> CaptchaResult<Self> {
        Ok(SharedGenerator {
            config: options.normalize()?,
            fonts,
            rng: Mutex::new(rng),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn generate(&self) -> CaptchaResult<Captcha> {
        // a panic mid-generation leaves the rng usable, just advanced
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        generate(&self.config, &self.fonts, &mut *rng)
    }
}
