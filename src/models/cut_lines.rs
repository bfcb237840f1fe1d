//! Cut-line types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifies one of the four cut lines.
///
/// The declaration order is the hit-test priority order: when several lines
/// are within tolerance of a pointer, the first one listed here wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineId {
    /// Left vertical line (x coordinate)
    #[serde(rename = "v1")]
    Vertical1,
    /// Right vertical line (x coordinate)
    #[serde(rename = "v2")]
    Vertical2,
    /// Top horizontal line (y coordinate)
    #[serde(rename = "h1")]
    Horizontal1,
    /// Bottom horizontal line (y coordinate)
    #[serde(rename = "h2")]
    Horizontal2,
}

impl LineId {
    /// All lines in hit-test priority order.
    pub const ALL: [LineId; 4] =
        [LineId::Vertical1, LineId::Vertical2, LineId::Horizontal1, LineId::Horizontal2];

    /// Vertical lines hold x coordinates, horizontal lines hold y coordinates.
    pub fn is_vertical(self) -> bool {
        matches!(self, LineId::Vertical1 | LineId::Vertical2)
    }

    /// Short name used on the command line and in JSON (`v1`, `v2`, `h1`, `h2`).
    pub fn short_name(self) -> &'static str {
        match self {
            LineId::Vertical1 => "v1",
            LineId::Vertical2 => "v2",
            LineId::Horizontal1 => "h1",
            LineId::Horizontal2 => "h2",
        }
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for LineId {
    type Err = LinesParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "vertical1" => Ok(LineId::Vertical1),
            "v2" | "vertical2" => Ok(LineId::Vertical2),
            "h1" | "horizontal1" => Ok(LineId::Horizontal1),
            "h2" | "horizontal2" => Ok(LineId::Horizontal2),
            other => Err(LinesParseError::UnknownLine(other.to_string())),
        }
    }
}

/// Error parsing cut lines or a line id from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinesParseError {
    /// Wrong number of comma-separated values
    #[error("expected 4 comma-separated values (v1,v2,h1,h2), got {0}")]
    WrongCount(usize),
    /// A value is not a non-negative integer
    #[error("invalid line coordinate '{0}'")]
    InvalidValue(String),
    /// Unknown line name
    #[error("unknown line '{0}' (expected v1, v2, h1 or h2)")]
    UnknownLine(String),
}

/// The four cut lines partitioning a source image into a 3x3 grid.
///
/// Vertical lines are x coordinates, horizontal lines are y coordinates, both
/// in source pixel space. A well-ordered value satisfies
/// `0 < vertical1 < vertical2 < width` and `0 < horizontal1 < horizontal2 < height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CutLines {
    /// Left vertical line
    pub vertical1: u32,
    /// Right vertical line
    pub vertical2: u32,
    /// Top horizontal line
    pub horizontal1: u32,
    /// Bottom horizontal line
    pub horizontal2: u32,
}

impl CutLines {
    pub fn new(vertical1: u32, vertical2: u32, horizontal1: u32, horizontal2: u32) -> Self {
        Self { vertical1, vertical2, horizontal1, horizontal2 }
    }

    /// Coordinate of a single line.
    pub fn get(&self, id: LineId) -> u32 {
        match id {
            LineId::Vertical1 => self.vertical1,
            LineId::Vertical2 => self.vertical2,
            LineId::Horizontal1 => self.horizontal1,
            LineId::Horizontal2 => self.horizontal2,
        }
    }

    /// Copy with one line replaced, no clamping applied.
    pub fn with(mut self, id: LineId, value: u32) -> Self {
        match id {
            LineId::Vertical1 => self.vertical1 = value,
            LineId::Vertical2 => self.vertical2 = value,
            LineId::Horizontal1 => self.horizontal1 = value,
            LineId::Horizontal2 => self.horizontal2 = value,
        }
        self
    }

    /// Check the strict ordering invariant against a source size.
    pub fn is_well_ordered(&self, width: u32, height: u32) -> bool {
        0 < self.vertical1
            && self.vertical1 < self.vertical2
            && self.vertical2 < width
            && 0 < self.horizontal1
            && self.horizontal1 < self.horizontal2
            && self.horizontal2 < height
    }

    /// Describe every ordering violation against a source size.
    ///
    /// Returns an empty list for well-ordered lines.
    pub fn violations(&self, width: u32, height: u32) -> Vec<String> {
        let mut problems = Vec::new();
        let axes = [
            ("vertical", self.vertical1, self.vertical2, width, "width"),
            ("horizontal", self.horizontal1, self.horizontal2, height, "height"),
        ];
        for (axis, first, second, extent, extent_name) in axes {
            if first == 0 {
                problems.push(format!("{}1 must be greater than 0", axis));
            }
            if first >= second {
                problems.push(format!(
                    "{}1 ({}) must be less than {}2 ({})",
                    axis, first, axis, second
                ));
            }
            if second >= extent {
                problems.push(format!(
                    "{}2 ({}) must be less than the source {} ({})",
                    axis, second, extent_name, extent
                ));
            }
        }
        problems
    }
}

impl fmt::Display for CutLines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.vertical1, self.vertical2, self.horizontal1, self.horizontal2)
    }
}

/// Parses `v1,v2,h1,h2` (whitespace around values is ignored).
impl FromStr for CutLines {
    type Err = LinesParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(LinesParseError::WrongCount(parts.len()));
        }
        let mut values = [0u32; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part.parse().map_err(|_| LinesParseError::InvalidValue(part.to_string()))?;
        }
        Ok(CutLines::new(values[0], values[1], values[2], values[3]))
    }
}
