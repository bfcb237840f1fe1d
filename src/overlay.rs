//! Cut-line overlay for the slice-line editor
//!
//! Draws the four cut lines as dashed strokes plus a square drag handle at the
//! middle of each line over a copy of the source image. Re-rendered after
//! every line move.
//!
//! Each region also gets a small marker showing how it scales: a hollow
//! square for corners, `<->` for cells stretched horizontally, its upright
//! form for cells stretched vertically, and both for the center.

use image::{Pixel, Rgba, RgbaImage};

use crate::layout::decompose;
use crate::models::{CellKind, CutLines, LineId, TargetSize};

const MARKER_SIZE: u32 = 7;

const CORNER_MARKER: [&str; 7] =
    [".......", ".#####.", ".#...#.", ".#...#.", ".#...#.", ".#####.", "......."];

const HORIZONTAL_MARKER: [&str; 7] =
    [".......", ".......", ".#...#.", "#######", ".#...#.", ".......", "......."];

/// Overlay appearance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub color: Rgba<u8>,
    /// Stroke width in pixels, centered on the line
    pub line_width: u32,
    /// Dash length in pixels; gaps have the same length. 0 draws solid lines.
    pub dash: u32,
    /// Side of the square drag handle
    pub handle_size: u32,
    /// Blended over the source; `None` disables region markers
    pub marker_color: Option<Rgba<u8>>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            color: Rgba([0xff, 0x44, 0x44, 0xff]),
            line_width: 2,
            dash: 5,
            handle_size: 8,
            marker_color: Some(Rgba([0xff, 0xff, 0xff, 0xcc])),
        }
    }
}

/// Render the source with its cut lines and handles drawn on top.
pub fn render_overlay(source: &RgbaImage, lines: &CutLines, style: &OverlayStyle) -> RgbaImage {
    let mut canvas = source.clone();
    let (width, height) = canvas.dimensions();
    let (w, h) = (width as i64, height as i64);
    let stroke = style.line_width.max(1) as i64;
    let half_stroke = stroke / 2;

    for id in LineId::ALL {
        let position = lines.get(id) as i64;
        if id.is_vertical() {
            for y in dashed(height, style.dash) {
                fill_rect(&mut canvas, position - half_stroke, y as i64, stroke, 1, style.color);
            }
        } else {
            for x in dashed(width, style.dash) {
                fill_rect(&mut canvas, x as i64, position - half_stroke, 1, stroke, style.color);
            }
        }
    }

    let size = style.handle_size as i64;
    for id in LineId::ALL {
        let position = lines.get(id) as i64;
        let (cx, cy) = if id.is_vertical() { (position, h / 2) } else { (w / 2, position) };
        fill_rect(&mut canvas, cx - size / 2, cy - size / 2, size, size, style.color);
    }

    if let Some(color) = style.marker_color {
        draw_region_markers(&mut canvas, lines, color);
    }

    canvas
}

/// Mark the center of every region large enough to hold a marker.
fn draw_region_markers(canvas: &mut RgbaImage, lines: &CutLines, color: Rgba<u8>) {
    let (width, height) = canvas.dimensions();
    let layout = decompose(width, height, lines, TargetSize::new(width, height));

    for cell in &layout.cells {
        let region = cell.src;
        if region.width < MARKER_SIZE || region.height < MARKER_SIZE {
            continue;
        }
        let x0 = region.x + (region.width - MARKER_SIZE) / 2;
        let y0 = region.y + (region.height - MARKER_SIZE) / 2;
        for dy in 0..MARKER_SIZE {
            for dx in 0..MARKER_SIZE {
                if marker_bit(cell.kind, dx as usize, dy as usize) {
                    canvas.get_pixel_mut(x0 + dx, y0 + dy).blend(&color);
                }
            }
        }
    }
}

fn marker_bit(kind: CellKind, x: usize, y: usize) -> bool {
    let set = |rows: &[&str; 7], x: usize, y: usize| rows[y].as_bytes()[x] == b'#';
    match kind {
        CellKind::Corner => set(&CORNER_MARKER, x, y),
        CellKind::HorizontalEdge => set(&HORIZONTAL_MARKER, x, y),
        CellKind::VerticalEdge => set(&HORIZONTAL_MARKER, y, x),
        CellKind::Center => set(&HORIZONTAL_MARKER, x, y) || set(&HORIZONTAL_MARKER, y, x),
    }
}

/// Positions along a line of `length` pixels that fall on a dash.
fn dashed(length: u32, dash: u32) -> impl Iterator<Item = u32> {
    (0..length).filter(move |i| dash == 0 || (i / dash) % 2 == 0)
}

/// Fill a rectangle, clipped to the canvas.
fn fill_rect(canvas: &mut RgbaImage, x: i64, y: i64, w: i64, h: i64, color: Rgba<u8>) {
    let (cw, ch) = canvas.dimensions();
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(cw as i64);
    let y1 = (y + h).min(ch as i64);
    for py in y0..y1 {
        for px in x0..x1 {
            canvas.put_pixel(px as u32, py as u32, color);
        }
    }
}
