//! Data models for nine-slice editing (cut lines, sizes, grid cells)

mod cut_lines;
mod geometry;

// Re-export all public types
pub use cut_lines::{CutLines, LineId, LinesParseError};
pub use geometry::{CellKind, CellPosition, Rect, SizeParseError, TargetSize};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cut_lines_roundtrip() {
        let lines = CutLines::new(30, 60, 20, 70);
        let json = serde_json::to_string(&lines).unwrap();
        assert_eq!(json, r#"{"vertical1":30,"vertical2":60,"horizontal1":20,"horizontal2":70}"#);

        let parsed: CutLines = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, lines);
    }

    #[test]
    fn test_target_size_roundtrip() {
        let size = TargetSize::new(300, 200);
        let json = serde_json::to_string(&size).unwrap();
        let parsed: TargetSize = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, size);
    }

    #[test]
    fn test_line_id_serializes_short_name() {
        let json = serde_json::to_string(&LineId::Horizontal2).unwrap();
        assert_eq!(json, "\"h2\"");
    }
}
