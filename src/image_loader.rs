//! # Image Resources
//!
//! The imaging boundary. The layout never decodes pixels; it asks an
//! `ImageService` for a picture's natural size and hands the chosen target
//! box back to the renderer. Missing resources come back as
//! `ResolveError::NotFound`, which the content pass turns into an empty
//! picture plus a `missing_resources` count. Drawing a placeholder in that
//! slot is left to the renderer.
//!
//! `ImageLibrary` loads from file paths (relative to a root directory),
//! `data:image/...;base64,` URIs, or raw base64 strings and reads the
//! dimensions with the `image` crate.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use crate::error::ResolveError;

/// What the layout needs to know about a resolved image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width_px: u32,
    pub height_px: u32,
    pub format: ImageFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

pub trait ImageService {
    /// Natural size of the resource named `src`.
    fn info(&self, src: &str) -> Result<ImageInfo, ResolveError>;
}

/// Loads images from disk or inline data.
#[derive(Debug, Clone)]
pub struct ImageLibrary {
    root: PathBuf,
}

impl Default for ImageLibrary {
    fn default() -> Self {
        Self::new(".")
    }
}

impl ImageLibrary {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Raw bytes of `src`.
    pub fn read(&self, src: &str) -> Result<Vec<u8>, ResolveError> {
        if let Some(rest) = src.strip_prefix("data:image/") {
            let comma = rest
                .find(',')
                .ok_or_else(|| ResolveError::Unavailable("invalid data URI: missing comma".into()))?;
            return base64_decode(&rest[comma + 1..]);
        }

        let path = self.root.join(src);
        if path.is_file() {
            return std::fs::read(&path).map_err(|e| {
                ResolveError::Unavailable(format!("failed to read '{}': {}", path.display(), e))
            });
        }

        // Anything with a file extension is a path that does not exist.
        if Path::new(src).extension().is_some() {
            return Err(ResolveError::NotFound {
                what: src.to_string(),
            });
        }
        base64_decode(src).map_err(|_| ResolveError::NotFound {
            what: src.to_string(),
        })
    }
}

impl ImageService for ImageLibrary {
    fn info(&self, src: &str) -> Result<ImageInfo, ResolveError> {
        let bytes = self.read(src)?;
        probe(&bytes)
    }
}

fn base64_decode(input: &str) -> Result<Vec<u8>, ResolveError> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| ResolveError::Unavailable(format!("base64 decode error: {}", e)))
}

fn detect_format(data: &[u8]) -> Option<ImageFormat> {
    if data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8 {
        Some(ImageFormat::Jpeg)
    } else if data.len() >= 4 && data[..4] == [0x89, 0x50, 0x4E, 0x47] {
        Some(ImageFormat::Png)
    } else if data.len() >= 12 && &data[..4] == b"RIFF" && &data[8..12] == b"WEBP" {
        Some(ImageFormat::Webp)
    } else {
        None
    }
}

/// Read dimensions without decoding pixels.
pub fn probe(data: &[u8]) -> Result<ImageInfo, ResolveError> {
    if data.len() < 4 {
        return Err(ResolveError::Unavailable("image data too short".into()));
    }
    let format = detect_format(data).ok_or_else(|| {
        ResolveError::Unavailable("unsupported image format (expected JPEG, PNG or WebP)".into())
    })?;
    let reader = image::io::Reader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ResolveError::Unavailable(format!("format detection error: {}", e)))?;
    let (width_px, height_px) = reader
        .into_dimensions()
        .map_err(|e| ResolveError::Unavailable(format!("failed to read dimensions: {}", e)))?;
    Ok(ImageInfo {
        width_px,
        height_px,
        format,
    })
}
