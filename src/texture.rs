//! PNG texture loading.
//!
//! The loader reads a PNG file into a tightly packed pixel buffer plus
//! its dimensions and channel format. It knows nothing about the GPU;
//! uploading is the renderer's concern. Dimension constraints (powers of
//! two) are enforced by the host application, not here.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// The eight-byte magic number at the start of every PNG file.
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// Channel layout of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Single luminance channel.
    Gray,
    /// Luminance + alpha.
    GrayAlpha,
    /// Red, green, blue.
    Rgb,
    /// Red, green, blue, alpha.
    Rgba,
}

impl PixelFormat {
    /// Bytes per pixel for this format.
    #[must_use]
    pub fn channels(self) -> u32 {
        match self {
            Self::Gray => 1,
            Self::GrayAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// A decoded PNG image: packed pixels, dimensions, and channel format.
#[derive(Debug)]
pub struct PngTexture {
    /// Row-major pixel data, `width * height * channels` bytes.
    pub pixels: Vec<u8>,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Channel layout of `pixels`.
    pub format: PixelFormat,
}

impl PngTexture {
    /// Whether both dimensions are powers of two.
    #[must_use]
    pub fn is_power_of_two(&self) -> bool {
        self.width.is_power_of_two() && self.height.is_power_of_two()
    }
}

/// Errors produced while loading a PNG file.
#[derive(Debug)]
pub enum TextureError {
    /// The file could not be opened or read.
    Unreadable {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// The file does not begin with the PNG signature.
    InvalidSignature {
        /// Path of the offending file.
        path: PathBuf,
    },
    /// The PNG data failed to decode.
    Decode {
        /// Path of the offending file.
        path: PathBuf,
        /// Decoder error description.
        message: String,
    },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable { path, source } => {
                write!(f, "couldn't read {}: {source}", path.display())
            }
            Self::InvalidSignature { path } => {
                write!(f, "{} is not a valid PNG image", path.display())
            }
            Self::Decode { path, message } => {
                write!(f, "failed to decode {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Load and decode a PNG file.
///
/// Images with exotic channel layouts (16-bit, paletted) are normalized
/// to 8-bit RGBA.
///
/// # Errors
///
/// Returns [`TextureError::Unreadable`] if the file cannot be read,
/// [`TextureError::InvalidSignature`] if it does not start with the PNG
/// magic number, and [`TextureError::Decode`] on any decoder failure.
pub fn load(path: impl AsRef<Path>) -> Result<PngTexture, TextureError> {
    let path = path.as_ref();

    let bytes = fs::read(path).map_err(|source| TextureError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    if bytes.len() < PNG_SIGNATURE.len() || bytes[..PNG_SIGNATURE.len()] != PNG_SIGNATURE {
        return Err(TextureError::InvalidSignature {
            path: path.to_path_buf(),
        });
    }

    let decoded = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png).map_err(
        |e| TextureError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
    )?;

    let (width, height) = (decoded.width(), decoded.height());
    let (pixels, format) = match decoded {
        image::DynamicImage::ImageLuma8(img) => (img.into_raw(), PixelFormat::Gray),
        image::DynamicImage::ImageLumaA8(img) => (img.into_raw(), PixelFormat::GrayAlpha),
        image::DynamicImage::ImageRgb8(img) => (img.into_raw(), PixelFormat::Rgb),
        image::DynamicImage::ImageRgba8(img) => (img.into_raw(), PixelFormat::Rgba),
        other => (other.to_rgba8().into_raw(), PixelFormat::Rgba),
    };

    log::debug!(
        "loaded {}: {width}x{height}, {} channels",
        path.display(),
        format.channels()
    );

    Ok(PngTexture {
        pixels,
        width,
        height,
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("galleria-texture-test-{name}"))
    }

    fn write_test_png(name: &str, width: u32, height: u32) -> PathBuf {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let path = temp_path(name);
        img.save_with_format(&path, image::ImageFormat::Png)
            .unwrap();
        path
    }

    #[test]
    fn loads_rgb_png_round_trip() {
        let path = write_test_png("rgb.png", 64, 32);
        let tex = load(&path).unwrap();
        assert_eq!(tex.width, 64);
        assert_eq!(tex.height, 32);
        assert_eq!(tex.format, PixelFormat::Rgb);
        assert_eq!(tex.pixels.len(), 64 * 32 * 3);
        assert!(tex.is_power_of_two());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn non_power_of_two_is_detected() {
        let path = write_test_png("npot.png", 60, 32);
        let tex = load(&path).unwrap();
        assert!(!tex.is_power_of_two());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = load("/nonexistent/galleria.png").unwrap_err();
        assert!(matches!(err, TextureError::Unreadable { .. }));
    }

    #[test]
    fn bad_signature_is_rejected() {
        let path = temp_path("not-a-png.png");
        fs::write(&path, b"definitely not a png file").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, TextureError::InvalidSignature { .. }));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn truncated_png_fails_to_decode() {
        let full = write_test_png("full.png", 16, 16);
        let bytes = fs::read(&full).unwrap();
        let path = temp_path("truncated.png");
        fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
        fs::remove_file(full).unwrap();
        fs::remove_file(path).unwrap();
    }
}
