//! Nine-slice compositing to image buffers

use clap::ValueEnum;
use image::imageops::{self, FilterType};
use image::RgbaImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::layout::{decompose, Cell, NineSliceLayout};
use crate::models::{CutLines, Rect, TargetSize};

/// A warning generated during compositing
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub message: String,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Resampling filter used to stretch edge and center cells.
///
/// | Filter | Use |
/// |--------|-----|
/// | `nearest` | Pixel art, keeps hard edges |
/// | `triangle` | Bilinear, the usual 2D canvas smoothing (default) |
/// | `catmull-rom` | Sharper bicubic |
/// | `gaussian` | Soft |
/// | `lanczos3` | Highest quality, slowest |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl ResampleFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl std::fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResampleFilter::Nearest => "nearest",
            ResampleFilter::Triangle => "triangle",
            ResampleFilter::CatmullRom => "catmull-rom",
            ResampleFilter::Gaussian => "gaussian",
            ResampleFilter::Lanczos3 => "lanczos3",
        };
        f.write_str(name)
    }
}

/// Compositing options, normally taken from the `[render]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeOptions {
    pub filter: ResampleFilter,
    /// Resample the nine cells on the rayon pool
    pub parallel: bool,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self { filter: ResampleFilter::default(), parallel: true }
    }
}

/// Composite a nine-slice image at `width` x `height` with default options.
///
/// Corners are copied unscaled, edges stretch along one axis, the center
/// stretches along both. See [`composite_with`].
///
/// # Examples
///
/// ```
/// use image::{Rgba, RgbaImage};
/// use nineslice::compositor::composite;
/// use nineslice::models::CutLines;
///
/// let source = RgbaImage::from_pixel(90, 90, Rgba([10, 20, 30, 255]));
/// let (output, warnings) = composite(&source, &CutLines::thirds(90, 90), 150, 120);
/// assert_eq!(output.dimensions(), (150, 120));
/// assert!(warnings.is_empty());
/// ```
pub fn composite(
    source: &RgbaImage,
    lines: &CutLines,
    width: u32,
    height: u32,
) -> (RgbaImage, Vec<Warning>) {
    composite_with(source, lines, TargetSize::new(width, height), &CompositeOptions::default())
}

/// Composite a nine-slice image to `target`.
///
/// The output is always exactly `target` in size and starts fully
/// transparent; source alpha is copied through, not blended.
///
/// # Error Handling (Lenient Mode)
///
/// Never fails. Degenerate input produces best-effort output plus warnings:
/// - Lines outside the source: clamped into it
/// - Collapsed lines: empty cells are skipped
/// - Target smaller than the fixed borders: center collapses to zero and the
///   right/bottom borders are clipped at the output edge
pub fn composite_with(
    source: &RgbaImage,
    lines: &CutLines,
    target: TargetSize,
    options: &CompositeOptions,
) -> (RgbaImage, Vec<Warning>) {
    let (source_width, source_height) = source.dimensions();
    let layout = decompose(source_width, source_height, lines, target);
    let warnings = layout_warnings(lines, &layout);
    for warning in &warnings {
        log::debug!("composite: {}", warning.message);
    }

    (render_layout(source, &layout, options), warnings)
}

/// Draw every cell of a precomputed layout into a new `target`-sized image.
pub fn render_layout(
    source: &RgbaImage,
    layout: &NineSliceLayout,
    options: &CompositeOptions,
) -> RgbaImage {
    let filter = options.filter.filter_type();

    // Cells never read each other's output, so resampling order is free.
    let patches: Vec<(Rect, RgbaImage)> = if options.parallel {
        layout.cells[..].par_iter().filter_map(|cell| render_cell(source, cell, filter)).collect()
    } else {
        layout.cells.iter().filter_map(|cell| render_cell(source, cell, filter)).collect()
    };

    let mut output = RgbaImage::new(layout.target.width, layout.target.height);
    for (dst, patch) in &patches {
        blit(&mut output, patch, dst.x, dst.y);
    }

    log::debug!(
        "composite: {}x{} -> {} ({} cells drawn, filter {})",
        layout.source[0],
        layout.source[1],
        layout.target,
        patches.len(),
        options.filter
    );
    output
}

/// Resample one cell's source region to its destination size.
///
/// Returns `None` for zero-area cells. Unscaled cells are copied verbatim.
fn render_cell(source: &RgbaImage, cell: &Cell, filter: FilterType) -> Option<(Rect, RgbaImage)> {
    if cell.is_noop() {
        return None;
    }
    let src = cell.src;
    let region = imageops::crop_imm(source, src.x, src.y, src.width, src.height).to_image();
    let patch = if cell.is_unscaled() {
        region
    } else {
        imageops::resize(&region, cell.dst.width, cell.dst.height, filter)
    };
    Some((cell.dst, patch))
}

/// Copy `patch` into `output` at (`x`, `y`), clipping at the output edge.
fn blit(output: &mut RgbaImage, patch: &RgbaImage, x: u32, y: u32) {
    let (out_w, out_h) = output.dimensions();
    for (px, py, pixel) in patch.enumerate_pixels() {
        let ox = x as u64 + px as u64;
        let oy = y as u64 + py as u64;
        if ox < out_w as u64 && oy < out_h as u64 {
            output.put_pixel(ox as u32, oy as u32, *pixel);
        }
    }
}

fn layout_warnings(requested: &CutLines, layout: &NineSliceLayout) -> Vec<Warning> {
    let mut warnings = Vec::new();
    let [width, height] = layout.source;

    if layout.lines_adjusted {
        warnings.push(Warning::new(format!(
            "cut lines {} do not fit the {}x{} source, clamped to {}",
            requested, width, height, layout.lines
        )));
    }
    if !layout.lines.is_well_ordered(width, height) {
        let skipped = layout.cells.iter().filter(|c| c.src.is_empty()).count();
        if skipped > 0 {
            warnings.push(Warning::new(format!(
                "cut lines {} leave {} empty cell(s), skipped",
                layout.lines, skipped
            )));
        }
    }
    if layout.is_degenerate() {
        warnings.push(Warning::new(format!(
            "target {} is smaller than the fixed borders ({}x{}), output is best effort",
            layout.target,
            layout.fixed_width(),
            layout.fixed_height()
        )));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 128]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn nearest() -> CompositeOptions {
        CompositeOptions { filter: ResampleFilter::Nearest, parallel: false }
    }

    /// 3x3 image with one pixel per cell: corners red, edges green, center blue.
    fn tiny_frame() -> RgbaImage {
        RgbaImage::from_fn(3, 3, |x, y| match (x == 1, y == 1) {
            (false, false) => RED,
            (true, true) => BLUE,
            _ => GREEN,
        })
    }

    #[test]
    fn test_output_has_target_size() {
        let source = tiny_frame();
        let (output, warnings) = composite(&source, &CutLines::new(1, 2, 1, 2), 40, 7);
        assert_eq!(output.dimensions(), (40, 7));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_stretches_cells() {
        let source = tiny_frame();
        let (output, _) =
            composite_with(&source, &CutLines::new(1, 2, 1, 2), TargetSize::new(5, 5), &nearest());

        // Corners stay one pixel
        for (x, y) in [(0, 0), (4, 0), (0, 4), (4, 4)] {
            assert_eq!(*output.get_pixel(x, y), RED, "corner at ({}, {})", x, y);
        }
        // Edges stretch along one axis only
        for i in 1..4 {
            assert_eq!(*output.get_pixel(i, 0), GREEN);
            assert_eq!(*output.get_pixel(i, 4), GREEN);
            assert_eq!(*output.get_pixel(0, i), GREEN);
            assert_eq!(*output.get_pixel(4, i), GREEN);
        }
        // Center fills the middle, alpha preserved
        for y in 1..4 {
            for x in 1..4 {
                assert_eq!(*output.get_pixel(x, y), BLUE);
            }
        }
    }

    #[test]
    fn test_same_size_is_pixel_identical() {
        let source = RgbaImage::from_fn(12, 9, |x, y| Rgba([x as u8 * 20, y as u8 * 25, 7, 200]));
        let options = CompositeOptions { filter: ResampleFilter::Lanczos3, parallel: true };
        let (output, warnings) =
            composite_with(&source, &CutLines::thirds(12, 9), TargetSize::new(12, 9), &options);
        assert!(warnings.is_empty());
        assert_eq!(output, source);
    }

    #[test]
    fn test_transparent_source_stays_transparent() {
        let source = RgbaImage::from_pixel(30, 30, CLEAR);
        let (output, _) = composite(&source, &CutLines::thirds(30, 30), 64, 48);
        assert!(output.pixels().all(|p| *p == CLEAR));
    }

    #[test]
    fn test_target_below_borders_does_not_panic() {
        let source = RgbaImage::from_pixel(90, 90, RED);
        let (output, warnings) = composite(&source, &CutLines::new(30, 60, 30, 60), 59, 10);
        assert_eq!(output.dimensions(), (59, 10));
        assert!(warnings.iter().any(|w| w.message.contains("best effort")));
        // Left border is copied; right border starts at x=30 and is clipped at 59
        assert_eq!(*output.get_pixel(0, 0), RED);
        assert_eq!(*output.get_pixel(58, 9), RED);
    }

    #[test]
    fn test_out_of_bounds_lines_warn_and_clamp() {
        let source = RgbaImage::from_pixel(20, 20, GREEN);
        let (output, warnings) = composite(&source, &CutLines::new(5, 50, 5, 15), 30, 30);
        assert_eq!(output.dimensions(), (30, 30));
        assert!(warnings[0].message.contains("clamped to 5,20,5,15"));
    }

    #[test]
    fn test_collapsed_lines_skip_empty_cells() {
        let source = RgbaImage::from_pixel(2, 2, RED);
        let (output, warnings) =
            composite_with(&source, &CutLines::thirds(2, 2), TargetSize::new(6, 6), &nearest());
        assert_eq!(output.dimensions(), (6, 6));
        assert!(warnings.iter().any(|w| w.message.contains("empty cell")));
        assert_eq!(*output.get_pixel(5, 5), RED);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let source =
            RgbaImage::from_fn(30, 24, |x, y| Rgba([(x * 8) as u8, (y * 10) as u8, 99, 255]));
        let lines = CutLines::new(6, 20, 5, 17);
        let target = TargetSize::new(77, 41);
        let seq = CompositeOptions { filter: ResampleFilter::Triangle, parallel: false };
        let par = CompositeOptions { filter: ResampleFilter::Triangle, parallel: true };
        assert_eq!(
            composite_with(&source, &lines, target, &seq).0,
            composite_with(&source, &lines, target, &par).0
        );
    }

    #[test]
    fn test_filter_names() {
        assert_eq!(ResampleFilter::CatmullRom.to_string(), "catmull-rom");
        assert_eq!(ResampleFilter::default(), ResampleFilter::Triangle);
    }
}
