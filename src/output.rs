//! PNG output and file path generation

use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::TargetSize;

/// Stem used when the source path has no usable file name
pub const DEFAULT_STEM: &str = "nineslice";

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    /// IO error during file operations
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Encode an RGBA image as PNG bytes (lossless, alpha preserved).
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, OutputError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::Rgba8,
    )?;
    Ok(bytes)
}

/// Save an RGBA image to a PNG file.
///
/// The image is fully encoded before anything touches the filesystem, then
/// written to a temporary sibling and renamed into place, so a failed save
/// never leaves a partial file at `path`.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    let bytes = encode_png(image)?;
    write_file_atomic(path, &bytes)?;
    Ok(())
}

/// Write `bytes` to `path` via a temporary file in the same directory.
pub fn write_file_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
    let temp = path.with_file_name(format!(".{}.tmp", file_name.as_deref().unwrap_or("output")));
    if let Err(e) = fs::write(&temp, bytes).and_then(|_| fs::rename(&temp, path)) {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }
    Ok(())
}

/// File name for a composited image: `{stem}_{W}x{H}.png`.
///
/// # Examples
///
/// ```
/// use nineslice::models::TargetSize;
/// use nineslice::output::output_file_name;
/// use std::path::Path;
///
/// let name = output_file_name(Path::new("assets/button.png"), TargetSize::new(300, 200));
/// assert_eq!(name, "button_300x200.png");
/// ```
pub fn output_file_name(input: &Path, target: TargetSize) -> String {
    format!("{}_{}.png", source_stem(input), target)
}

/// File stem of the source, or [`DEFAULT_STEM`].
pub fn source_stem(input: &Path) -> &str {
    input.file_stem().and_then(|s| s.to_str()).filter(|s| !s.is_empty()).unwrap_or(DEFAULT_STEM)
}

/// Generate the output path for a composited image.
///
/// # Output Naming Rules
///
/// | Scenario | Output |
/// |----------|--------|
/// | Input `ui/button.png`, 300x200 | `ui/button_300x200.png` |
/// | With configured output dir `out` | `out/button_300x200.png` |
/// | With `-o result.png` (single input) | `result.png` |
/// | With `-o result.png` (multiple inputs) | `result_button_300x200.png` |
/// | With `-o dir/` | `dir/button_300x200.png` |
///
/// # Arguments
///
/// * `input` - The source image path (used for default naming)
/// * `target` - Output dimensions, included in generated names
/// * `output_arg` - The `-o` argument value, if provided
/// * `out_dir` - Configured output directory, used when `-o` is absent
/// * `is_single_input` - Whether only one image is being rendered
pub fn generate_output_path(
    input: &Path,
    target: TargetSize,
    output_arg: Option<&Path>,
    out_dir: Option<&Path>,
    is_single_input: bool,
) -> PathBuf {
    let file_name = output_file_name(input, target);

    match output_arg {
        Some(output) => {
            // Check if output is a directory (ends with / or is existing directory)
            let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();

            if is_dir {
                output.join(file_name)
            } else if is_single_input {
                output.to_path_buf()
            } else {
                let stem = output.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
                join_parent(output.parent(), format!("{}_{}", stem, file_name))
            }
        }
        None => match out_dir {
            Some(dir) => dir.join(file_name),
            None => join_parent(input.parent(), file_name),
        },
    }
}

fn join_parent(parent: Option<&Path>, file_name: String) -> PathBuf {
    match parent {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(file_name),
        _ => PathBuf::from(file_name),
    }
}
