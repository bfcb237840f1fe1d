//! Slice-line editor: default placement, hit-testing and clamped line moves
//!
//! Holds the four cut lines over a loaded source image and keeps them ordered
//! while the user drags them around.
//!
//! # Clamping
//!
//! Each move clamps the line against its neighbor with a minimum gap
//! (`min_margin`, 10px by default):
//!
//! | Line | Range |
//! |------|-------|
//! | `v1` | `[m, v2 - m]` |
//! | `v2` | `[v1 + m, width - m]` |
//! | `h1` | `[m, h2 - m]` |
//! | `h2` | `[h1 + m, height - m]` |
//!
//! When the span available to a line is narrower than `2 * min_margin` (small
//! images), the margin shrinks to half that span, but never below 1px, so a
//! well-ordered value stays well-ordered after any move.

use crate::models::{CutLines, LineId};

/// Hit-test radius in pixels
pub const DEFAULT_TOLERANCE: f64 = 15.0;

/// Minimum gap kept between a line and its neighbor or the image edge
pub const DEFAULT_MIN_MARGIN: u32 = 10;

impl CutLines {
    /// Default lines at one third and two thirds of each dimension (rounded down).
    ///
    /// Images under 3px along an axis get collapsed lines on that axis; the
    /// compositor treats the resulting empty cells as no-op draws.
    ///
    /// # Examples
    ///
    /// ```
    /// use nineslice::models::CutLines;
    ///
    /// let lines = CutLines::thirds(90, 90);
    /// assert_eq!(lines, CutLines::new(30, 60, 30, 60));
    /// ```
    pub fn thirds(width: u32, height: u32) -> Self {
        CutLines {
            vertical1: width / 3,
            vertical2: (width as u64 * 2 / 3) as u32,
            horizontal1: height / 3,
            horizontal2: (height as u64 * 2 / 3) as u32,
        }
    }

    /// Move one line to `coordinate`, clamped against its neighbor.
    ///
    /// Only the named line changes. `coordinate` may be anywhere, including
    /// negative or past the image edge.
    pub fn moved(
        self,
        id: LineId,
        coordinate: i64,
        width: u32,
        height: u32,
        min_margin: u32,
    ) -> CutLines {
        let (w, h) = (width as i64, height as i64);
        let (v1, v2) = (self.vertical1 as i64, self.vertical2 as i64);
        let (h1, h2) = (self.horizontal1 as i64, self.horizontal2 as i64);

        let value = match id {
            LineId::Vertical1 => {
                let m = margin_for_span(v2, min_margin);
                clamp_coordinate(coordinate, m, v2 - m)
            }
            LineId::Vertical2 => {
                let m = margin_for_span(w - v1, min_margin);
                clamp_coordinate(coordinate, v1 + m, w - m)
            }
            LineId::Horizontal1 => {
                let m = margin_for_span(h2, min_margin);
                clamp_coordinate(coordinate, m, h2 - m)
            }
            LineId::Horizontal2 => {
                let m = margin_for_span(h - h1, min_margin);
                clamp_coordinate(coordinate, h1 + m, h - m)
            }
        };

        self.with(id, value)
    }
}

/// Margin to use when a line can move within `span` pixels.
fn margin_for_span(span: i64, min_margin: u32) -> i64 {
    (min_margin as i64).min(span / 2).max(1)
}

/// `max(lo, min(value, hi))`: the lower bound wins if the range is inverted.
fn clamp_coordinate(value: i64, lo: i64, hi: i64) -> u32 {
    let clamped = value.min(hi).max(lo).max(0);
    u32::try_from(clamped).unwrap_or(u32::MAX)
}

/// Find the line under a pointer, in image-local pixel coordinates.
///
/// Vertical lines are tested against `x`, horizontal lines against `y`. A line
/// matches when its distance is strictly below `tolerance`; lines are checked
/// in the fixed order `v1`, `v2`, `h1`, `h2` and the first match is returned.
pub fn locate_pointer_target(lines: &CutLines, x: f64, y: f64, tolerance: f64) -> Option<LineId> {
    LineId::ALL.into_iter().find(|&id| {
        let pointer = if id.is_vertical() { x } else { y };
        (pointer - lines.get(id) as f64).abs() < tolerance
    })
}

/// Editor tuning, normally taken from the `[editor]` config section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorSettings {
    /// Hit-test radius in pixels
    pub tolerance: f64,
    /// Minimum gap between neighboring lines
    pub min_margin: u32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self { tolerance: DEFAULT_TOLERANCE, min_margin: DEFAULT_MIN_MARGIN }
    }
}

/// Interactive state holder for the cut lines of one source image.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceEditor {
    width: u32,
    height: u32,
    lines: CutLines,
    settings: EditorSettings,
}

impl SliceEditor {
    /// Create an editor for a `width` x `height` source with default thirds.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_settings(width, height, EditorSettings::default())
    }

    pub fn with_settings(width: u32, height: u32, settings: EditorSettings) -> Self {
        let lines = CutLines::thirds(width, height);
        log::debug!("editor: {}x{} source, default lines {}", width, height, lines);
        Self { width, height, lines, settings }
    }

    pub fn lines(&self) -> CutLines {
        self.lines
    }

    pub fn source_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Replace the lines wholesale (e.g. loaded from a file).
    ///
    /// Values are kept as given; use [`CutLines::violations`] to report
    /// problems. The compositor tolerates out-of-order lines.
    pub fn set_lines(&mut self, lines: CutLines) {
        self.lines = lines;
    }

    /// Restore the default thirds.
    pub fn reset(&mut self) {
        self.lines = CutLines::thirds(self.width, self.height);
    }

    /// Line under the pointer, using the configured tolerance.
    pub fn locate(&self, x: f64, y: f64) -> Option<LineId> {
        locate_pointer_target(&self.lines, x, y, self.settings.tolerance)
    }

    /// Move one line and return the updated lines.
    pub fn move_line(&mut self, id: LineId, coordinate: i64) -> CutLines {
        let updated =
            self.lines.moved(id, coordinate, self.width, self.height, self.settings.min_margin);
        log::trace!("editor: {} -> {} (requested {})", id, updated.get(id), coordinate);
        self.lines = updated;
        updated
    }

    /// True when the current lines satisfy the strict ordering invariant.
    pub fn is_well_ordered(&self) -> bool {
        self.lines.is_well_ordered(self.width, self.height)
    }
}
