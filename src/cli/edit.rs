//! Edit command implementation
//!
//! Replays line moves and pointer drags against a [`SliceEditor`] so the
//! interactive clamping rules can be used from scripts.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{
    load_settings, open_source, resolve_lines, LinesArgs, EXIT_ERROR, EXIT_INVALID_ARGS,
    EXIT_SUCCESS,
};
use crate::config::loader::CliOverrides;
use crate::editor::SliceEditor;
use crate::layout::fit_lines;
use crate::models::{CutLines, LineId};
use crate::output::save_png;
use crate::overlay::{render_overlay, OverlayStyle};
use crate::pointer::DragController;
use crate::sidecar::save_lines;

type Point = (f64, f64);

/// One applied edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EditStep {
    Move { line: LineId, requested: i64, from: u32, to: u32 },
    Drag { line: LineId, pointer: [f64; 2], from: u32, to: u32 },
    /// Drag started where no line was within tolerance
    Miss { pointer: [f64; 2] },
}

impl fmt::Display for EditStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditStep::Move { line, requested, from, to } => {
                write!(f, "move {}: {} -> {}", line, from, to)?;
                if *requested != *to as i64 {
                    write!(f, " (requested {}, clamped)", requested)?;
                }
                Ok(())
            }
            EditStep::Drag { line, from, to, .. } => write!(f, "drag {}: {} -> {}", line, from, to),
            EditStep::Miss { pointer } => {
                write!(f, "drag at ({}, {}): no line under pointer", pointer[0], pointer[1])
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct EditReport {
    lines: CutLines,
    well_ordered: bool,
    steps: Vec<EditStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    saved: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    overlay: Option<PathBuf>,
}

/// Run the edit command
pub fn run_edit(
    input: &Path,
    lines_args: &LinesArgs,
    moves: &[String],
    drags: &[String],
    reset: bool,
    save: bool,
    overlay: Option<&Path>,
    json: bool,
    config_path: Option<&Path>,
    overrides: &CliOverrides,
) -> ExitCode {
    let config = match load_settings(config_path, overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let settings = config.editor.settings();
    if !settings.tolerance.is_finite() || settings.tolerance <= 0.0 {
        eprintln!("Error: Tolerance must be a positive number, got {}", settings.tolerance);
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let parsed_moves: Result<Vec<_>, _> = moves.iter().map(|m| parse_move(m)).collect();
    let parsed_drags: Result<Vec<_>, _> = drags.iter().map(|d| parse_drag(d)).collect();
    let (parsed_moves, parsed_drags) = match (parsed_moves, parsed_drags) {
        (Ok(m), Ok(d)) => (m, d),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let source = match open_source(input) {
        Ok(source) => source,
        Err(code) => return code,
    };
    let (width, height) = source.dimensions();
    let mut editor = SliceEditor::with_settings(width, height, settings);
    if !reset {
        match resolve_lines(lines_args, input, width, height) {
            Ok((lines, origin)) => {
                log::debug!("edit: starting from {} ({})", lines, origin);
                if let Some(fitted) = start_from(&mut editor, lines) {
                    eprintln!(
                        "Warning: cut lines {} do not fit the {}x{} source, clamped to {}",
                        lines, width, height, fitted
                    );
                }
            }
            Err(code) => return code,
        }
    }

    let steps = apply_edits(&mut editor, &parsed_moves, &parsed_drags);
    let lines = editor.lines();
    let mut report = EditReport {
        lines,
        well_ordered: editor.is_well_ordered(),
        steps,
        saved: None,
        overlay: None,
    };

    if save {
        let path = lines_args.file_for(input);
        if let Err(e) = save_lines(&path, &lines) {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
        report.saved = Some(path);
    }

    if let Some(path) = overlay {
        let image = render_overlay(&source, &lines, &OverlayStyle::default());
        if let Err(e) = save_png(&image, path) {
            eprintln!("Error: Failed to save {}: {}", path.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
        report.overlay = Some(path.to_path_buf());
    }

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    } else {
        print_report(&report);
    }

    ExitCode::from(EXIT_SUCCESS)
}

fn print_report(report: &EditReport) {
    for step in &report.steps {
        match step {
            EditStep::Miss { .. } => eprintln!("Warning: {}", step),
            _ => println!("{}", step),
        }
    }
    println!("Lines: {}", report.lines);
    if !report.well_ordered {
        eprintln!("Warning: lines are not strictly ordered inside the source");
    }
    if let Some(ref path) = report.saved {
        println!("Saved: {}", path.display());
    }
    if let Some(ref path) = report.overlay {
        println!("Saved: {}", path.display());
    }
}

/// Load `lines` into the editor, clamped into the source first.
///
/// Returns the clamped lines when they differ from `lines`.
fn start_from(editor: &mut SliceEditor, lines: CutLines) -> Option<CutLines> {
    let (width, height) = editor.source_size();
    let (fitted, adjusted) = fit_lines(&lines, width, height);
    editor.set_lines(fitted);
    adjusted.then_some(fitted)
}

/// Apply moves, then drags, each in order.
fn apply_edits(
    editor: &mut SliceEditor,
    moves: &[(LineId, i64)],
    drags: &[(Point, Point)],
) -> Vec<EditStep> {
    let mut steps = Vec::with_capacity(moves.len() + drags.len());

    for &(line, requested) in moves {
        let from = editor.lines().get(line);
        let to = editor.move_line(line, requested).get(line);
        steps.push(EditStep::Move { line, requested, from, to });
    }

    let mut controller = DragController::new();
    for &((start_x, start_y), (end_x, end_y)) in drags {
        let Some(line) = controller.pointer_down(editor, start_x, start_y) else {
            steps.push(EditStep::Miss { pointer: [start_x, start_y] });
            continue;
        };
        let from = editor.lines().get(line);
        controller.pointer_move(editor, end_x, end_y);
        controller.pointer_up();
        let to = editor.lines().get(line);
        steps.push(EditStep::Drag { line, pointer: [end_x, end_y], from, to });
    }

    steps
}

/// Parse `LINE=COORD`, e.g. `v1=200`.
fn parse_move(text: &str) -> Result<(LineId, i64), String> {
    let (line, coordinate) = text
        .split_once('=')
        .ok_or_else(|| format!("Invalid --move '{}'. Use LINE=COORD (e.g., 'v1=200')", text))?;
    let line = line.parse::<LineId>().map_err(|e| format!("Invalid --move '{}': {}", text, e))?;
    let coordinate = coordinate
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("Invalid --move '{}': '{}' is not an integer", text, coordinate))?;
    Ok((line, coordinate))
}

/// Parse `X,Y:X,Y`, e.g. `30,45:12,45`.
fn parse_drag(text: &str) -> Result<(Point, Point), String> {
    let invalid = || format!("Invalid --drag '{}'. Use X,Y:X,Y (e.g., '30,45:12,45')", text);
    let (start, end) = text.split_once(':').ok_or_else(invalid)?;
    let start = parse_point(start).ok_or_else(invalid)?;
    let end = parse_point(end).ok_or_else(invalid)?;
    Ok((start, end))
}

fn parse_point(text: &str) -> Option<Point> {
    let (x, y) = text.split_once(',')?;
    let x = x.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    let y = y.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_move() {
        assert_eq!(parse_move("v1=200"), Ok((LineId::Vertical1, 200)));
        assert_eq!(parse_move("horizontal2=-5"), Ok((LineId::Horizontal2, -5)));
        assert!(parse_move("v1").is_err());
        assert!(parse_move("v3=10").is_err());
        assert!(parse_move("v1=abc").is_err());
    }

    #[test]
    fn test_parse_drag() {
        assert_eq!(parse_drag("30,45:12.5,45"), Ok(((30.0, 45.0), (12.5, 45.0))));
        assert!(parse_drag("30,45").is_err());
        assert!(parse_drag("30:12,45").is_err());
        assert!(parse_drag("a,b:c,d").is_err());
        assert!(parse_drag("NaN,1:2,3").is_err());
    }

    #[test]
    fn test_apply_move_clamps() {
        let mut editor = SliceEditor::new(90, 90);
        let steps = apply_edits(&mut editor, &[(LineId::Vertical1, 200)], &[]);

        assert_eq!(
            steps,
            vec![EditStep::Move { line: LineId::Vertical1, requested: 200, from: 30, to: 50 }]
        );
        assert_eq!(editor.lines(), CutLines::new(50, 60, 30, 60));
        assert_eq!(steps[0].to_string(), "move v1: 30 -> 50 (requested 200, clamped)");
    }

    #[test]
    fn test_apply_drag_grabs_nearest_line() {
        let mut editor = SliceEditor::new(90, 90);
        let steps = apply_edits(&mut editor, &[], &[((32.0, 45.0), (20.0, 80.0))]);

        assert_eq!(
            steps,
            vec![EditStep::Drag {
                line: LineId::Vertical1,
                pointer: [20.0, 80.0],
                from: 30,
                to: 20,
            }]
        );
        assert_eq!(editor.lines().vertical1, 20);
    }

    #[test]
    fn test_out_of_range_start_is_clamped_before_moves() {
        let mut editor = SliceEditor::new(90, 90);
        let fitted = start_from(&mut editor, CutLines::new(5, 200, 5, 60));
        assert_eq!(fitted, Some(CutLines::new(5, 90, 5, 60)));

        apply_edits(&mut editor, &[(LineId::Vertical1, 150)], &[]);
        assert_eq!(editor.lines(), CutLines::new(80, 90, 5, 60));
    }

    #[test]
    fn test_in_range_start_is_kept() {
        let mut editor = SliceEditor::new(90, 90);
        assert_eq!(start_from(&mut editor, CutLines::new(20, 70, 25, 65)), None);
        assert_eq!(editor.lines(), CutLines::new(20, 70, 25, 65));
    }

    #[test]
    fn test_apply_drag_miss() {
        let mut editor = SliceEditor::new(300, 300);
        let steps = apply_edits(&mut editor, &[], &[((150.0, 150.0), (10.0, 10.0))]);

        assert!(matches!(steps[0], EditStep::Miss { .. }));
        assert_eq!(editor.lines(), CutLines::thirds(300, 300));
    }

    #[test]
    fn test_moves_apply_before_drags() {
        let mut editor = SliceEditor::new(90, 90);
        // After v2 moves to 80, a drag starting at x=80 grabs v2
        let steps =
            apply_edits(&mut editor, &[(LineId::Vertical2, 80)], &[((80.0, 0.0), (70.0, 0.0))]);

        assert_eq!(steps.len(), 2);
        assert_eq!(editor.lines().vertical2, 70);
    }

    #[test]
    fn test_report_json_shape() {
        let report = EditReport {
            lines: CutLines::new(50, 60, 30, 60),
            well_ordered: true,
            steps: vec![EditStep::Move {
                line: LineId::Vertical1,
                requested: 200,
                from: 30,
                to: 50,
            }],
            saved: None,
            overlay: None,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["lines"]["vertical1"], 50);
        assert_eq!(value["steps"][0]["kind"], "move");
        assert_eq!(value["steps"][0]["line"], "v1");
        assert!(value.get("saved").is_none());
    }
}
