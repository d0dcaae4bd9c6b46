pub type CaptchaResult<T> = Result<T, CaptchaError>;

#[derive(thiserror::Error, Debug)]
pub enum CaptchaError {
    #[error("font unavailable: {0}")]
    FontUnavailable(String),

    #[error("failed to load font '{name}': {reason}")]
    FontLoad { name: String, reason: String },

    #[error("failed to render glyph {ch:?}: {reason}")]
    GlyphRender { ch: char, reason: String },

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("encode error: {0}")]
    Encode(image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CaptchaError {
    pub fn font_unavailable(msg: impl Into<String>) -> Self {
        Self::FontUnavailable(msg.into())
    }

    pub fn font_load(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FontLoad {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn glyph_render(ch: char, reason: impl Into<String>) -> Self {
        Self::GlyphRender {
            ch,
            reason: reason.into(),
        }
    }

    pub fn invalid_options(msg: impl Into<String>) -> Self {
        Self::InvalidOptions(msg.into())
    }
}

impl From<image::ImageError> for CaptchaError {
    fn from(err: image::ImageError) -> Self {
        match err {
            // sink failures stay distinguishable from encoder failures
            image::ImageError::IoError(io) => Self::Io(io),
            other => Self::Encode(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(CaptchaError::font_unavailable("x")
            .to_string()
            .contains("font unavailable:"));
        assert!(CaptchaError::font_load("a.ttf", "bad")
            .to_string()
            .contains("failed to load font 'a.ttf'"));
        assert!(CaptchaError::glyph_render('Z', "missing")
            .to_string()
            .contains("'Z'"));
        assert!(CaptchaError::invalid_options("x")
            .to_string()
            .contains("invalid options:"));
    }

    #[test]
    fn image_io_errors_become_io() {
        let base = std::io::Error::other("sink closed");
        let err = CaptchaError::from(image::ImageError::IoError(base));
        assert!(matches!(err, CaptchaError::Io(_)));
        assert!(err.to_string().contains("sink closed"));
    }
}
