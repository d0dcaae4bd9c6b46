//! Font catalogs the glyph renderer draws from.
//!
//! A [`FontProvider`] only lists identifiers and hands out raw bytes; parsing
//! happens once per image in [`choose_font`].

use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
};

use rand::Rng;
use rusttype::Font;

use crate::error::{CaptchaError, CaptchaResult};

pub type FontData = Cow<'static, [u8]>;

pub trait FontProvider {
    /// Identifiers of every font in the catalog.
    fn list(&self) -> CaptchaResult<Vec<String>>;

    /// Raw TrueType/OpenType bytes of one catalog entry.
    fn load(&self, id: &str) -> CaptchaResult<FontData>;
}

static BUNDLED: [(&str, &[u8]); 3] = [
    (
        "DejaVuSans-Bold.ttf",
        include_bytes!("../fonts/DejaVuSans-Bold.ttf"),
    ),
    (
        "DejaVuSerif-Bold.ttf",
        include_bytes!("../fonts/DejaVuSerif-Bold.ttf"),
    ),
    (
        "DejaVuSansMono-Bold.ttf",
        include_bytes!("../fonts/DejaVuSansMono-Bold.ttf"),
    ),
];

/// Fonts compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledFonts;

impl FontProvider for BundledFonts {
    fn list(&self) -> CaptchaResult<Vec<String>> {
        Ok(BUNDLED.iter().map(|(name, _)| name.to_string()).collect())
    }

    fn load(&self, id: &str) -> CaptchaResult<FontData> {
        BUNDLED
            .iter()
            .find(|(name, _)| *name == id)
            .map(|(_, bytes)| Cow::Borrowed(*bytes))
            .ok_or_else(|| CaptchaError::font_load(id, "not in bundled catalog"))
    }
}

/// Every `.ttf`/`.otf` file directly inside a directory.
#[derive(Debug, Clone)]
pub struct DirectoryFonts {
    root: PathBuf,
}

impl DirectoryFonts {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryFonts { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ttf") || ext.eq_ignore_ascii_case("otf"))
}

impl FontProvider for DirectoryFonts {
    fn list(&self) -> CaptchaResult<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            CaptchaError::font_unavailable(format!("read '{}': {e}", self.root.display()))
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                CaptchaError::font_unavailable(format!("read '{}': {e}", self.root.display()))
            })?;
            let path = entry.path();
            if !path.is_file() || !is_font_file(&path) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn load(&self, id: &str) -> CaptchaResult<FontData> {
        let path = self.root.join(id);
        fs::read(&path)
            .map(Cow::Owned)
            .map_err(|e| CaptchaError::font_load(id, format!("read '{}': {e}", path.display())))
    }
}

/// Named font blobs held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryFonts {
    fonts: Vec<(String, FontData)>,
}

impl MemoryFonts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, id: impl Into<String>, data: impl Into<FontData>) -> Self {
        self.insert(id, data);
        self
    }

    /// Adds a font, replacing any entry with the same id.
    pub fn insert(&mut self, id: impl Into<String>, data: impl Into<FontData>) {
        let id = id.into();
        let data = data.into();
        match self.fonts.iter_mut().find(|(name, _)| *name == id) {
            Some(slot) => slot.1 = data,
            None => self.fonts.push((id, data)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

impl FontProvider for MemoryFonts {
    fn list(&self) -> CaptchaResult<Vec<String>> {
        Ok(self.fonts.iter().map(|(name, _)| name.clone()).collect())
    }

    fn load(&self, id: &str) -> CaptchaResult<FontData> {
        self.fonts
            .iter()
            .find(|(name, _)| name == id)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| CaptchaError::font_load(id, "no such font"))
    }
}

impl<P: FontProvider + ?Sized> FontProvider for &P {
    fn list(&self) -> CaptchaResult<Vec<String>> {
        (**self).list()
    }

    fn load(&self, id: &str) -> CaptchaResult<FontData> {
        (**self).load(id)
    }
}

impl<P: FontProvider + ?Sized> FontProvider for Box<P> {
    fn list(&self) -> CaptchaResult<Vec<String>> {
        (**self).list()
    }

    fn load(&self, id: &str) -> CaptchaResult<FontData> {
        (**self).load(id)
    }
}

pub fn parse_font(id: &str, data: FontData) -> CaptchaResult<Font<'static>> {
    let font = match data {
        Cow::Borrowed(bytes) => Font::try_from_bytes(bytes),
        Cow::Owned(bytes) => Font::try_from_vec(bytes),
    };
    font.ok_or_else(|| CaptchaError::font_load(id, "not a usable TrueType/OpenType font"))
}

/// Picks one font uniformly at random and parses it.
pub fn choose_font<P, R>(fonts: &P, rng: &mut R) -> CaptchaResult<Font<'static>>
where
    P: FontProvider + ?Sized,
    R: Rng + ?Sized,
{
    let names = fonts.list()?;
    if names.is_empty() {
        return Err(CaptchaError::font_unavailable("font catalog is empty"));
    }
    let id = &names[rng.gen_range(0..names.len())];
    tracing::debug!(font = %id, "chose font");
    parse_font(id, fonts.load(id)?)
}
