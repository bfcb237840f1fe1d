//! Pointer drag handling for the slice-line editor
//!
//! Drag tracking is transient input state: `Idle -> Dragging(line) -> Idle`.
//! It lives here, separate from the cut lines held by [`SliceEditor`].

use crate::editor::SliceEditor;
use crate::models::{CutLines, LineId};

/// Current drag state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    /// No line grabbed
    #[default]
    Idle,
    /// A line is grabbed and follows pointer moves
    Dragging(LineId),
}

/// Translates pointer events into single-line moves on a [`SliceEditor`].
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Pointer pressed: grab the line under the pointer, if any.
    pub fn pointer_down(&mut self, editor: &SliceEditor, x: f64, y: f64) -> Option<LineId> {
        let target = editor.locate(x, y);
        if let Some(id) = target {
            log::debug!("drag: grabbed {} at ({:.1}, {:.1})", id, x, y);
            self.state = DragState::Dragging(id);
        }
        target
    }

    /// Pointer moved: while dragging, move the grabbed line.
    ///
    /// Vertical lines follow `x`, horizontal lines follow `y`, rounded to the
    /// nearest pixel. Returns the updated lines, or `None` when idle.
    pub fn pointer_move(&mut self, editor: &mut SliceEditor, x: f64, y: f64) -> Option<CutLines> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging(id) => {
                let pointer = if id.is_vertical() { x } else { y };
                Some(editor.move_line(id, to_pixel(pointer)))
            }
        }
    }

    /// Pointer released: drop the grabbed line and return it.
    pub fn pointer_up(&mut self) -> Option<LineId> {
        match std::mem::take(&mut self.state) {
            DragState::Idle => None,
            DragState::Dragging(id) => {
                log::debug!("drag: released {}", id);
                Some(id)
            }
        }
    }
}

/// Round a pointer coordinate to an integer pixel; NaN maps to 0.
fn to_pixel(value: f64) -> i64 {
    if value.is_nan() {
        0
    } else {
        value.round() as i64
    }
}
