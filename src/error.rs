//! Crate-level error types.
//!
//! All failure handling is "log and abort" or "log and skip": fatal
//! setup errors carry a distinct process exit status per kind, and the
//! navigator itself has no failure paths at all.

use std::fmt;

use crate::texture::TextureError;

#[cfg(feature = "viewer")]
use crate::gpu::render_context::RenderContextError;

/// Errors produced by the galleria crate.
#[derive(Debug)]
pub enum GalleriaError {
    /// A texture file could not be loaded or decoded.
    Texture(TextureError),
    /// A texture's dimensions are not powers of two.
    TextureSize {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },
    /// More textures were requested than the fixed slot limit.
    TooManyTextures {
        /// Number of textures requested.
        requested: usize,
        /// The compile-time slot limit.
        limit: usize,
    },
    /// GPU context initialization failure.
    #[cfg(feature = "viewer")]
    Gpu(RenderContextError),
    /// Window / event-loop failure.
    #[cfg(feature = "viewer")]
    Viewer(String),
}

impl GalleriaError {
    /// The process exit status for this error kind.
    ///
    /// Each fatal setup error terminates the process with its own
    /// nonzero status so scripted callers can distinguish failure modes.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::TooManyTextures { .. } => 1,
            Self::TextureSize { .. } => 2,
            Self::Texture(TextureError::Unreadable { .. }) => 3,
            Self::Texture(TextureError::InvalidSignature { .. }) => 4,
            Self::Texture(TextureError::Decode { .. }) => 5,
            #[cfg(feature = "viewer")]
            Self::Gpu(_) => 6,
            #[cfg(feature = "viewer")]
            Self::Viewer(_) => 7,
        }
    }
}

impl fmt::Display for GalleriaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Texture(e) => write!(f, "texture error: {e}"),
            Self::TextureSize { width, height } => write!(
                f,
                "invalid image size {width}x{height}: dimensions must be powers of two"
            ),
            Self::TooManyTextures { requested, limit } => write!(
                f,
                "attempted to initialize {requested} textures, limit is {limit}"
            ),
            #[cfg(feature = "viewer")]
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            #[cfg(feature = "viewer")]
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for GalleriaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Texture(e) => Some(e),
            #[cfg(feature = "viewer")]
            Self::Gpu(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TextureError> for GalleriaError {
    fn from(e: TextureError) -> Self {
        Self::Texture(e)
    }
}

#[cfg(feature = "viewer")]
impl From<RenderContextError> for GalleriaError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_kind() {
        let size = GalleriaError::TextureSize {
            width: 300,
            height: 200,
        };
        let limit = GalleriaError::TooManyTextures {
            requested: 21,
            limit: 20,
        };
        assert_ne!(size.exit_code(), limit.exit_code());
        assert_ne!(size.exit_code(), 0);
        assert_ne!(limit.exit_code(), 0);
    }
}
