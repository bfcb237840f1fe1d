//! Inspect command implementation

use std::path::Path;
use std::process::ExitCode;

use super::{open_source, parse_size, resolve_lines, LinesArgs, EXIT_ERROR, EXIT_SUCCESS};
use crate::layout::{decompose, NineSliceLayout};
use crate::models::{CellKind, TargetSize};

/// Run the inspect command
pub fn run_inspect(
    input: &Path,
    lines_args: &LinesArgs,
    size: Option<&str>,
    json: bool,
) -> ExitCode {
    let source = match open_source(input) {
        Ok(source) => source,
        Err(code) => return code,
    };
    let (width, height) = source.dimensions();
    let (lines, origin) = match resolve_lines(lines_args, input, width, height) {
        Ok(resolved) => resolved,
        Err(code) => return code,
    };
    let target = match size.map(parse_size).transpose() {
        Ok(target) => target.unwrap_or_else(|| TargetSize::of_image(&source)),
        Err(code) => return code,
    };

    let layout = decompose(width, height, &lines, target);

    if json {
        match serde_json::to_string_pretty(&layout) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        print!("{}", format_layout(&layout, &origin));
    }
    ExitCode::from(EXIT_SUCCESS)
}

fn format_layout(layout: &NineSliceLayout, origin: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("Source: {}x{}\n", layout.source[0], layout.source[1]));
    out.push_str(&format!("Target: {}\n", layout.target));
    out.push_str(&format!(
        "Lines:  v1={} v2={} h1={} h2={} ({}{})\n",
        layout.lines.vertical1,
        layout.lines.vertical2,
        layout.lines.horizontal1,
        layout.lines.horizontal2,
        origin,
        if layout.lines_adjusted { ", clamped" } else { "" }
    ));
    out.push_str(&format!(
        "Fixed:  {}x{}{}\n",
        layout.fixed_width(),
        layout.fixed_height(),
        if layout.is_degenerate() { " (larger than target, output clipped)" } else { "" }
    ));
    out.push_str("Cells:\n");
    for cell in &layout.cells {
        out.push_str(&format!(
            "  {:<14} {:<16} {:>16} -> {}\n",
            cell.position.name(),
            kind_name(cell.kind),
            cell.src.to_string(),
            cell.dst
        ));
    }
    out
}

fn kind_name(kind: CellKind) -> &'static str {
    match kind {
        CellKind::Corner => "corner",
        CellKind::HorizontalEdge => "horizontal-edge",
        CellKind::VerticalEdge => "vertical-edge",
        CellKind::Center => "center",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CutLines;

    #[test]
    fn test_format_layout_lists_all_cells() {
        let layout = decompose(90, 90, &CutLines::new(30, 60, 30, 60), TargetSize::new(150, 120));
        let text = format_layout(&layout, "default thirds");

        assert!(text.contains("Source: 90x90"));
        assert!(text.contains("Target: 150x120"));
        assert!(text.contains("(default thirds)"));
        assert!(text.contains("Fixed:  60x60\n"));
        assert_eq!(text.lines().filter(|l| l.starts_with("  ")).count(), 9);
        assert!(text.contains("middle-center"));
        assert!(text.contains("30x30@(30,30) -> 90x60@(30,30)"));
    }

    #[test]
    fn test_format_layout_marks_degenerate_target() {
        let layout = decompose(90, 90, &CutLines::new(30, 60, 30, 60), TargetSize::new(59, 90));
        let text = format_layout(&layout, "--lines");
        assert!(text.contains("output clipped"));
    }
}
