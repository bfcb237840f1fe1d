//! Rectangles, sizes and grid cell identities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Axis-aligned integer rectangle: `[x, y, width, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Exclusive right edge
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True when the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True when both rectangles share at least one pixel.
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@({},{})", self.width, self.height, self.x, self.y)
    }
}

/// Error parsing a `WxH` size string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SizeParseError {
    #[error("Invalid size format '{0}'. Use WxH format (e.g., '300x200')")]
    Format(String),
    #[error("Invalid size '{0}'. Width and height must be positive integers")]
    NotPositive(String),
}

/// Output dimensions for a compositing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Target matching the source image's own dimensions.
    pub fn of_image(image: &image::RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height }
    }
}

impl fmt::Display for TargetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for TargetSize {
    type Err = SizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(['x', 'X']).collect();
        if parts.len() != 2 {
            return Err(SizeParseError::Format(s.to_string()));
        }
        match (parts[0].parse::<u32>(), parts[1].parse::<u32>()) {
            (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok(TargetSize::new(w, h)),
            (Ok(_), Ok(_)) => Err(SizeParseError::NotPositive(s.to_string())),
            _ => Err(SizeParseError::Format(s.to_string())),
        }
    }
}

/// How a grid cell is scaled when compositing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellKind {
    /// Copied unscaled
    Corner,
    /// Top/bottom center: stretched horizontally only
    HorizontalEdge,
    /// Left/right middle: stretched vertically only
    VerticalEdge,
    /// Stretched along both axes
    Center,
}

/// One of the nine grid cells, in reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CellPosition {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl CellPosition {
    /// All cells, left to right then top to bottom.
    pub const ALL: [CellPosition; 9] = [
        CellPosition::TopLeft,
        CellPosition::TopCenter,
        CellPosition::TopRight,
        CellPosition::MiddleLeft,
        CellPosition::MiddleCenter,
        CellPosition::MiddleRight,
        CellPosition::BottomLeft,
        CellPosition::BottomCenter,
        CellPosition::BottomRight,
    ];

    /// Grid column (0 = left, 1 = center, 2 = right)
    pub fn column(self) -> usize {
        self as usize % 3
    }

    /// Grid row (0 = top, 1 = middle, 2 = bottom)
    pub fn row(self) -> usize {
        self as usize / 3
    }

    pub fn kind(self) -> CellKind {
        match (self.row() == 1, self.column() == 1) {
            (false, false) => CellKind::Corner,
            (false, true) => CellKind::HorizontalEdge,
            (true, false) => CellKind::VerticalEdge,
            (true, true) => CellKind::Center,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CellPosition::TopLeft => "top-left",
            CellPosition::TopCenter => "top-center",
            CellPosition::TopRight => "top-right",
            CellPosition::MiddleLeft => "middle-left",
            CellPosition::MiddleCenter => "middle-center",
            CellPosition::MiddleRight => "middle-right",
            CellPosition::BottomLeft => "bottom-left",
            CellPosition::BottomCenter => "bottom-center",
            CellPosition::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for CellPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
