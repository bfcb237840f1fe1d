//! Source image loading
//!
//! Decodes any raster format the `image` crate understands into an RGBA
//! buffer. Anything that is not a decodable image is rejected here, before it
//! reaches the editor or compositor.

use glob::glob;
use image::io::Reader as ImageReader;
use image::{ImageFormat, RgbaImage};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File extensions treated as source images when scanning directories.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tga"];

/// Error loading a source image
#[derive(Debug, Error)]
pub enum SourceError {
    /// File could not be read
    #[error("Cannot open '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Content is not a recognized image format
    #[error("'{}' is not an image file", .0.display())]
    NotAnImage(PathBuf),
    /// Recognized format but decoding failed
    #[error("Cannot decode '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// Decoded image has no pixels
    #[error("'{}' has zero width or height", .0.display())]
    Empty(PathBuf),
}

/// Load and decode a source image as RGBA.
///
/// The format is detected from the file content; the extension is only
/// consulted when the content has no recognizable signature.
pub fn load_source(path: &Path) -> Result<RgbaImage, SourceError> {
    let io_error = |source| SourceError::Io { path: path.to_path_buf(), source };

    let file = File::open(path).map_err(io_error)?;
    let mut reader =
        ImageReader::new(BufReader::new(file)).with_guessed_format().map_err(io_error)?;

    // Formats without a magic number (e.g. TGA) fall back to the extension
    let sniffed = reader.format().is_some();
    if !sniffed {
        match ImageFormat::from_path(path) {
            Ok(format) => reader.set_format(format),
            Err(_) => return Err(SourceError::NotAnImage(path.to_path_buf())),
        }
    }

    let image = reader
        .decode()
        .map_err(|source| {
            if sniffed {
                SourceError::Decode { path: path.to_path_buf(), source }
            } else {
                SourceError::NotAnImage(path.to_path_buf())
            }
        })?
        .to_rgba8();

    if image.width() == 0 || image.height() == 0 {
        return Err(SourceError::Empty(path.to_path_buf()));
    }

    log::debug!("source: loaded {} ({}x{})", path.display(), image.width(), image.height());
    Ok(image)
}

/// Check if a path has an image file extension.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Find all image files in a directory (recursively), sorted by path.
pub fn find_image_files(dir: &Path) -> Vec<PathBuf> {
    let pattern = format!("{}/**/*", glob::Pattern::escape(&dir.display().to_string()));
    let mut files: Vec<PathBuf> = match glob(&pattern) {
        Ok(paths) => {
            paths.filter_map(Result::ok).filter(|p| p.is_file() && is_image_file(p)).collect()
        }
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}
