//! Nine-slice region decomposition and target mapping
//!
//! Pure geometry, no pixels: given a source size, cut lines and a target size,
//! compute the nine source rectangles and the nine destination rectangles.
//!
//! Source columns are `[v1, v2 - v1, width - v2]` and rows are
//! `[h1, h2 - h1, height - h2]`. In the destination the outer columns and rows
//! keep their source size and the center column / middle row absorb the rest:
//!
//! ```text
//! dest center width  = max(0, target_width  - left - right)
//! dest middle height = max(0, target_height - top  - bottom)
//! ```
//!
//! Offsets are running sums of the preceding widths/heights, so the destination
//! cells tile the output exactly whenever the target is at least as large as
//! the fixed borders. Below that threshold the center collapses to zero and the
//! right/bottom borders start immediately after the left/top ones; they then
//! overhang the output and are clipped when drawn. Pixel output in that case is
//! best effort.

use serde::Serialize;

use crate::models::{CellKind, CellPosition, CutLines, Rect, TargetSize};

/// One grid cell: where to read from and where to draw to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub position: CellPosition,
    pub kind: CellKind,
    /// Region of the source image
    pub src: Rect,
    /// Region of the output image (may overhang it in degenerate layouts)
    pub dst: Rect,
}

impl Cell {
    /// Nothing to draw: empty source or empty destination.
    pub fn is_noop(&self) -> bool {
        self.src.is_empty() || self.dst.is_empty()
    }

    /// Source and destination have the same size.
    pub fn is_unscaled(&self) -> bool {
        self.src.size() == self.dst.size()
    }
}

/// The full 3x3 decomposition for one compositing request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NineSliceLayout {
    /// Source image `[width, height]`
    pub source: [u32; 2],
    pub target: TargetSize,
    /// Lines actually used, after clamping into the source
    pub lines: CutLines,
    /// True if the given lines had to be clamped into the source
    pub lines_adjusted: bool,
    /// Cells in reading order (see [`CellPosition::ALL`])
    pub cells: [Cell; 9],
}

impl NineSliceLayout {
    pub fn cell(&self, position: CellPosition) -> &Cell {
        &self.cells[position as usize]
    }

    /// Combined width of the unscaled left and right columns.
    pub fn fixed_width(&self) -> u32 {
        self.lines.vertical1 + (self.source[0] - self.lines.vertical2)
    }

    /// Combined height of the unscaled top and bottom rows.
    pub fn fixed_height(&self) -> u32 {
        self.lines.horizontal1 + (self.source[1] - self.lines.horizontal2)
    }

    /// The target is narrower or shorter than the fixed borders.
    pub fn is_degenerate(&self) -> bool {
        self.target.width < self.fixed_width() || self.target.height < self.fixed_height()
    }
}

/// Clamp lines into a `width` x `height` source so that
/// `v1 <= v2 <= width` and `h1 <= h2 <= height`.
///
/// Returns the clamped lines and whether anything changed. Zero-size cells are
/// allowed; only out-of-bounds and inverted lines are corrected.
pub fn fit_lines(lines: &CutLines, width: u32, height: u32) -> (CutLines, bool) {
    let vertical1 = lines.vertical1.min(width);
    let vertical2 = lines.vertical2.clamp(vertical1, width);
    let horizontal1 = lines.horizontal1.min(height);
    let horizontal2 = lines.horizontal2.clamp(horizontal1, height);
    let fitted = CutLines { vertical1, vertical2, horizontal1, horizontal2 };
    (fitted, fitted != *lines)
}

/// Decompose a `source_width` x `source_height` image into the nine cells
/// mapped onto `target`.
///
/// # Examples
///
/// ```
/// use nineslice::layout::decompose;
/// use nineslice::models::{CellPosition, CutLines, Rect, TargetSize};
///
/// let layout = decompose(90, 90, &CutLines::new(30, 60, 30, 60), TargetSize::new(150, 150));
/// let center = layout.cell(CellPosition::MiddleCenter);
/// assert_eq!(center.src, Rect::new(30, 30, 30, 30));
/// assert_eq!(center.dst, Rect::new(30, 30, 90, 90));
/// ```
pub fn decompose(
    source_width: u32,
    source_height: u32,
    lines: &CutLines,
    target: TargetSize,
) -> NineSliceLayout {
    let (lines_fitted, lines_adjusted) = fit_lines(lines, source_width, source_height);

    let src_cols = spans(lines_fitted.vertical1, lines_fitted.vertical2, source_width);
    let src_rows = spans(lines_fitted.horizontal1, lines_fitted.horizontal2, source_height);

    let dst_cols = stretch(&src_cols, target.width);
    let dst_rows = stretch(&src_rows, target.height);

    let cells = CellPosition::ALL.map(|position| {
        let (col, row) = (position.column(), position.row());
        Cell {
            position,
            kind: position.kind(),
            src: Rect::new(src_cols[col].0, src_rows[row].0, src_cols[col].1, src_rows[row].1),
            dst: Rect::new(dst_cols[col].0, dst_rows[row].0, dst_cols[col].1, dst_rows[row].1),
        }
    });

    NineSliceLayout {
        source: [source_width, source_height],
        target,
        lines: lines_fitted,
        lines_adjusted,
        cells,
    }
}

/// `(offset, length)` of the three source spans along one axis.
fn spans(first: u32, second: u32, extent: u32) -> [(u32, u32); 3] {
    [(0, first), (first, second - first), (second, extent - second)]
}

/// Map source spans onto a destination extent: outer spans keep their size,
/// the middle one takes what is left (never negative).
fn stretch(src: &[(u32, u32); 3], extent: u32) -> [(u32, u32); 3] {
    let (lead, trail) = (src[0].1, src[2].1);
    let middle = extent.saturating_sub(lead.saturating_add(trail));
    [(0, lead), (lead, middle), (lead + middle, trail)]
}
