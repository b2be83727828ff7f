use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{ImageFormat, Rgba, RgbaImage};
use thiserror::Error;

use crate::geometry::Vec2;

pub const PLACEHOLDER_TEXTURE_KEY: &str = "placeholder";
const PLACEHOLDER_SIZE_PX: u32 = 16;
const PLACEHOLDER_CELL_PX: u32 = 4;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("texture key must not be empty")]
    EmptyKey,
    #[error("texture key must not start with '/'")]
    LeadingSlash,
    #[error("texture key must not contain '..'")]
    ParentTraversal,
    #[error("texture key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
    #[error("texture '{key}' has zero size ({width}x{height})")]
    ZeroSize { key: String, width: u32, height: u32 },
    #[error("failed to read texture file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode texture '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: image::ImageError,
    },
}

/// Immutable image handle. Clones share the same pixel data.
#[derive(Clone)]
pub struct Texture {
    inner: Arc<TextureData>,
}

struct TextureData {
    key: String,
    width: u32,
    height: u32,
    pixels: Option<RgbaImage>,
    placeholder: bool,
}

impl Texture {
    /// A handle with a size but no pixel data, for images owned by the renderer.
    pub fn new(key: impl Into<String>, width: u32, height: u32) -> Result<Self, TextureError> {
        Self::build(key.into(), width, height, None)
    }

    pub fn from_image(key: impl Into<String>, image: RgbaImage) -> Result<Self, TextureError> {
        let (width, height) = image.dimensions();
        Self::build(key.into(), width, height, Some(image))
    }

    pub fn from_png_bytes(key: impl Into<String>, bytes: &[u8]) -> Result<Self, TextureError> {
        let key = key.into();
        validate_texture_key(&key)?;
        let image = match image::load_from_memory_with_format(bytes, ImageFormat::Png) {
            Ok(image) => image.into_rgba8(),
            Err(source) => return Err(TextureError::Decode { key, source }),
        };
        Self::from_image(key, image)
    }

    pub fn load_png(key: impl Into<String>, path: &Path) -> Result<Self, TextureError> {
        let bytes = fs::read(path).map_err(|source| TextureError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_png_bytes(key, &bytes)
    }

    /// Checkerboard stand-in for images that could not be provided.
    pub fn placeholder() -> Self {
        let image = RgbaImage::from_fn(PLACEHOLDER_SIZE_PX, PLACEHOLDER_SIZE_PX, |x, y| {
            if ((x / PLACEHOLDER_CELL_PX) + (y / PLACEHOLDER_CELL_PX)) % 2 == 0 {
                Rgba([255, 0, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        Self {
            inner: Arc::new(TextureData {
                key: PLACEHOLDER_TEXTURE_KEY.to_string(),
                width: PLACEHOLDER_SIZE_PX,
                height: PLACEHOLDER_SIZE_PX,
                pixels: Some(image),
                placeholder: true,
            }),
        }
    }

    fn build(
        key: String,
        width: u32,
        height: u32,
        pixels: Option<RgbaImage>,
    ) -> Result<Self, TextureError> {
        validate_texture_key(&key)?;
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroSize { key, width, height });
        }
        Ok(Self {
            inner: Arc::new(TextureData {
                key,
                width,
                height,
                pixels,
                placeholder: false,
            }),
        })
    }

    pub fn key(&self) -> &str {
        &self.inner.key
    }

    pub fn width(&self) -> u32 {
        self.inner.width
    }

    pub fn height(&self) -> u32 {
        self.inner.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.inner.width as f32, self.inner.height as f32)
    }

    pub fn pixels(&self) -> Option<&RgbaImage> {
        self.inner.pixels.as_ref()
    }

    pub fn is_placeholder(&self) -> bool {
        self.inner.placeholder
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.placeholder == other.inner.placeholder
                && self.inner.key == other.inner.key
                && self.inner.width == other.inner.width
                && self.inner.height == other.inner.height)
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("key", &self.inner.key)
            .field("width", &self.inner.width)
            .field("height", &self.inner.height)
            .field("has_pixels", &self.inner.pixels.is_some())
            .finish()
    }
}

pub(crate) fn validate_texture_key(key: &str) -> Result<(), TextureError> {
    if key.is_empty() {
        return Err(TextureError::EmptyKey);
    }
    if key.starts_with('/') {
        return Err(TextureError::LeadingSlash);
    }
    if key.contains("..") {
        return Err(TextureError::ParentTraversal);
    }
    for ch in key.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '/' | '-' | '.') {
            continue;
        }
        return Err(TextureError::InvalidCharacter { character: ch });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    #[test]
    fn accepts_valid_keys() {
        for key in ["player", "ui/icons/Worker_1", "walk-0.png"] {
            assert!(validate_texture_key(key).is_ok(), "key={key}");
        }
    }

    #[test]
    fn rejects_invalid_keys() {
        for key in ["", "/a", "..", "a/../b", r"a\b", "a b"] {
            assert!(validate_texture_key(key).is_err(), "key={key}");
        }
    }

    #[test]
    fn zero_size_texture_is_rejected() {
        let err = Texture::new("empty", 0, 4).expect_err("zero width");
        assert!(matches!(err, TextureError::ZeroSize { width: 0, .. }));
    }

    #[test]
    fn decodes_png_bytes_and_reports_size() {
        let texture = Texture::from_png_bytes("tile", &png_bytes(3, 5)).expect("decode");
        assert_eq!(texture.size(), Vec2::new(3.0, 5.0));
        assert!(texture.pixels().is_some());
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let err = Texture::from_png_bytes("broken", b"not a png").expect_err("decode error");
        assert!(matches!(err, TextureError::Decode { .. }));
    }

    #[test]
    fn loads_png_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("coin.png");
        fs::write(&path, png_bytes(8, 8)).expect("write png");

        let texture = Texture::load_png("coin", &path).expect("load");
        assert_eq!(texture.key(), "coin");
        assert_eq!((texture.width(), texture.height()), (8, 8));

        let missing = Texture::load_png("coin", &dir.path().join("missing.png"));
        assert!(matches!(missing, Err(TextureError::Read { .. })));
    }

    #[test]
    fn placeholder_has_pixels_and_fixed_size() {
        let texture = Texture::placeholder();
        assert!(texture.is_placeholder());
        assert_eq!(texture.size(), Vec2::new(16.0, 16.0));
        assert_eq!(texture.clone(), texture);
    }

    #[test]
    fn texture_keyed_like_placeholder_is_not_one() {
        let texture = Texture::new(PLACEHOLDER_TEXTURE_KEY, 16, 16).expect("texture");
        assert!(!texture.is_placeholder());
        assert_ne!(texture, Texture::placeholder());
    }
}
