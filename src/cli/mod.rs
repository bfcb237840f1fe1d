//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod edit;
mod inspect;
mod render;

use clap::{Args, Parser, Subcommand};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::compositor::ResampleFilter;
use crate::config::loader::{
    find_config, load_config, merge_cli_overrides, resolve_path, CliOverrides,
};
use crate::config::NsliceConfig;
use crate::models::{CutLines, TargetSize};
use crate::sidecar::{load_lines, sidecar_path};
use crate::source::{find_image_files, load_source, SourceError};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// nslice - Nine-slice editor and compositor
#[derive(Parser)]
#[command(name = "nslice")]
#[command(about = "Nine-slice editor and compositor: resize bordered images, keep the corners")]
#[command(version)]
pub struct Cli {
    /// Print debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of searching for nslice.toml
    /// (read by render, overlay and edit; inspect uses no settings)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the cut lines come from.
///
/// Precedence: `--lines`, then `--lines-file`, then `<input>.slice.json` if it
/// exists, then the default thirds.
#[derive(Args, Debug, Clone, Default)]
pub struct LinesArgs {
    /// Cut lines as v1,v2,h1,h2 (pixels)
    #[arg(long, value_name = "V1,V2,H1,H2")]
    pub lines: Option<String>,

    /// JSON cut-line file (default: <input>.slice.json when present)
    #[arg(long, value_name = "FILE")]
    pub lines_file: Option<PathBuf>,
}

impl LinesArgs {
    /// Cut-line file for `input`: the explicit one or the default sidecar.
    pub fn file_for(&self, input: &Path) -> PathBuf {
        self.lines_file.clone().unwrap_or_else(|| sidecar_path(input))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Composite nine-slice images to a target size and save them as PNG
    Render {
        /// Source images
        inputs: Vec<PathBuf>,

        /// Also render every image found in this directory (recursively)
        #[arg(long, value_name = "DIR")]
        dir: Option<PathBuf>,

        /// Output file or directory.
        /// If omitted: {input-dir}/{stem}_{W}x{H}.png
        /// If file (single input): output.png
        /// If file (multiple): output_{stem}_{W}x{H}.png
        /// If directory (ends with /): dir/{stem}_{W}x{H}.png
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target size (e.g., "300x200"); defaults to the source size
        #[arg(long, value_name = "WxH")]
        size: Option<String>,

        #[command(flatten)]
        lines: LinesArgs,

        /// Resampling filter for stretched cells
        #[arg(long, value_enum)]
        filter: Option<ResampleFilter>,

        /// Resample cells on a single thread
        #[arg(long)]
        no_parallel: bool,

        /// Directory for generated files (overrides [output] dir)
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        /// Strict mode: treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Re-render whenever the source or its cut-line file changes
        #[arg(long)]
        watch: bool,
    },

    /// Draw the cut lines and drag handles over the source image
    Overlay {
        /// Source image
        input: PathBuf,

        #[command(flatten)]
        lines: LinesArgs,

        /// Output file (default: {output-dir or input-dir}/{stem}_overlay.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the nine source and destination cells for a target size
    Inspect {
        /// Source image
        input: PathBuf,

        #[command(flatten)]
        lines: LinesArgs,

        /// Target size (e.g., "300x200"); defaults to the source size
        #[arg(long, value_name = "WxH")]
        size: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move cut lines the way the interactive editor does
    ///
    /// Moves are applied first, then drags, each in the order given. Every
    /// step is clamped so the lines stay ordered.
    Edit {
        /// Source image
        input: PathBuf,

        #[command(flatten)]
        lines: LinesArgs,

        /// Set a line to a coordinate (e.g., --move v1=200)
        #[arg(long = "move", value_name = "LINE=COORD")]
        moves: Vec<String>,

        /// Drag from one point to another (e.g., --drag 30,45:12,45)
        #[arg(long = "drag", value_name = "X,Y:X,Y")]
        drags: Vec<String>,

        /// Hit-test radius for --drag in pixels (overrides [editor] tolerance)
        #[arg(long)]
        tolerance: Option<f64>,

        /// Minimum gap between lines (overrides [editor] min_margin)
        #[arg(long)]
        min_margin: Option<u32>,

        /// Reset to the default thirds before applying moves
        #[arg(long)]
        reset: bool,

        /// Write the result to the cut-line file
        #[arg(long)]
        save: bool,

        /// Also write an overlay preview of the result
        #[arg(long, value_name = "FILE")]
        overlay: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Render {
            inputs,
            dir,
            output,
            size,
            lines,
            filter,
            no_parallel,
            out_dir,
            strict,
            watch,
        } => {
            let overrides = CliOverrides {
                filter,
                parallel: no_parallel.then_some(false),
                out_dir,
                ..Default::default()
            };
            render::run_render(
                &inputs,
                dir.as_deref(),
                output.as_deref(),
                size.as_deref(),
                &lines,
                strict,
                watch,
                config_path,
                &overrides,
            )
        }
        Commands::Overlay { input, lines, output } => {
            render::run_overlay(&input, &lines, output.as_deref(), config_path)
        }
        Commands::Inspect { input, lines, size, json } => {
            inspect::run_inspect(&input, &lines, size.as_deref(), json)
        }
        Commands::Edit {
            input,
            lines,
            moves,
            drags,
            tolerance,
            min_margin,
            reset,
            save,
            overlay,
            json,
        } => {
            let overrides = CliOverrides { tolerance, min_margin, ..Default::default() };
            edit::run_edit(
                &input,
                &lines,
                &moves,
                &drags,
                reset,
                save,
                overlay.as_deref(),
                json,
                config_path,
                &overrides,
            )
        }
    }
}

/// Install the `env_logger` backend; `--verbose` raises the default to debug.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_level);
    // A logger may already be installed when run() is called more than once
    let _ = env_logger::Builder::from_env(env).format_timestamp(None).try_init();
}

/// Load nslice.toml (explicit path or discovered) and apply CLI overrides.
///
/// A relative `[output] dir` is taken relative to the config file; CLI paths
/// stay relative to the working directory.
pub(crate) fn load_settings(
    config_path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<NsliceConfig, ExitCode> {
    let path = config_path.map(Path::to_path_buf).or_else(find_config);
    let mut config = load_config(path.as_deref()).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_ERROR)
    })?;
    if let (Some(path), Some(dir)) = (&path, &config.output.dir) {
        config.output.dir = Some(resolve_path(path, dir));
    }
    merge_cli_overrides(&mut config, overrides);
    Ok(config)
}

/// Decode a source image, rejecting non-images as invalid input.
pub(crate) fn open_source(path: &Path) -> Result<RgbaImage, ExitCode> {
    load_source(path).map_err(|e| {
        eprintln!("Error: {}", e);
        match e {
            SourceError::NotAnImage(_) | SourceError::Decode { .. } | SourceError::Empty(_) => {
                ExitCode::from(EXIT_INVALID_ARGS)
            }
            _ => ExitCode::from(EXIT_ERROR),
        }
    })
}

/// Parse a `--size` argument.
pub(crate) fn parse_size(text: &str) -> Result<TargetSize, ExitCode> {
    text.parse::<TargetSize>().map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_INVALID_ARGS)
    })
}

/// Resolve the cut lines for `input` and describe where they came from.
pub(crate) fn resolve_lines(
    args: &LinesArgs,
    input: &Path,
    width: u32,
    height: u32,
) -> Result<(CutLines, String), ExitCode> {
    if let Some(ref text) = args.lines {
        return match text.parse::<CutLines>() {
            Ok(lines) => Ok((lines, "--lines".to_string())),
            Err(e) => {
                eprintln!("Error: Invalid --lines '{}': {}", text, e);
                Err(ExitCode::from(EXIT_INVALID_ARGS))
            }
        };
    }

    let path = args.file_for(input);
    if args.lines_file.is_none() && !path.exists() {
        return Ok((CutLines::thirds(width, height), "default thirds".to_string()));
    }
    match load_lines(&path) {
        Ok(lines) => Ok((lines, path.display().to_string())),
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(ExitCode::from(EXIT_ERROR))
        }
    }
}

/// Expand the positional inputs plus an optional directory scan.
pub(crate) fn collect_inputs(
    inputs: &[PathBuf],
    dir: Option<&Path>,
) -> Result<Vec<PathBuf>, ExitCode> {
    let mut files = inputs.to_vec();
    if let Some(dir) = dir {
        if !dir.is_dir() {
            eprintln!("Error: Directory not found: {}", dir.display());
            return Err(ExitCode::from(EXIT_INVALID_ARGS));
        }
        let found = find_image_files(dir);
        if found.is_empty() {
            eprintln!("Warning: No images found in {}", dir.display());
        }
        files.extend(found.into_iter().filter(|f| !files_contain(inputs, f)));
    }
    Ok(files)
}

fn files_contain(files: &[PathBuf], candidate: &Path) -> bool {
    files.iter().any(|f| f == candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_cli_parses_render() {
        let cli = Cli::try_parse_from([
            "nslice", "render", "a.png", "b.png", "--size", "300x200", "--lines", "1,2,3,4",
            "--filter", "nearest", "--strict",
        ])
        .unwrap();
        match cli.command {
            Commands::Render { inputs, size, lines, filter, strict, watch, .. } => {
                assert_eq!(inputs, vec![PathBuf::from("a.png"), PathBuf::from("b.png")]);
                assert_eq!(size.as_deref(), Some("300x200"));
                assert_eq!(lines.lines.as_deref(), Some("1,2,3,4"));
                assert_eq!(filter, Some(ResampleFilter::Nearest));
                assert!(strict);
                assert!(!watch);
            }
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn test_cli_parses_repeated_edit_steps() {
        let cli = Cli::try_parse_from([
            "nslice", "edit", "a.png", "--move", "v1=200", "--move", "h2=5", "--drag",
            "30,45:12,45", "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Edit { moves, drags, .. } => {
                assert_eq!(moves, vec!["v1=200", "h2=5"]);
                assert_eq!(drags, vec!["30,45:12,45"]);
            }
            _ => panic!("expected edit"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_filter() {
        assert!(Cli::try_parse_from(["nslice", "render", "a.png", "--filter", "bicubic"]).is_err());
    }

    #[test]
    fn test_lines_file_for_defaults_to_sidecar() {
        let args = LinesArgs::default();
        assert_eq!(args.file_for(Path::new("ui/a.png")), PathBuf::from("ui/a.png.slice.json"));

        let args =
            LinesArgs { lines_file: Some(PathBuf::from("custom.json")), ..Default::default() };
        assert_eq!(args.file_for(Path::new("ui/a.png")), PathBuf::from("custom.json"));
    }

    #[test]
    fn test_resolve_lines_precedence() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("panel.png");

        let (lines, origin) = resolve_lines(&LinesArgs::default(), &input, 90, 60).unwrap();
        assert_eq!(lines, CutLines::new(30, 60, 20, 40));
        assert_eq!(origin, "default thirds");

        crate::sidecar::save_lines(&sidecar_path(&input), &CutLines::new(5, 80, 5, 50)).unwrap();
        let (lines, _) = resolve_lines(&LinesArgs::default(), &input, 90, 60).unwrap();
        assert_eq!(lines, CutLines::new(5, 80, 5, 50));

        let inline = LinesArgs { lines: Some("10,20,10,20".to_string()), ..Default::default() };
        let (lines, origin) = resolve_lines(&inline, &input, 90, 60).unwrap();
        assert_eq!(lines, CutLines::new(10, 20, 10, 20));
        assert_eq!(origin, "--lines");
    }

    #[test]
    fn test_resolve_lines_missing_explicit_file_fails() {
        let args = LinesArgs {
            lines_file: Some(PathBuf::from("/nonexistent/lines.json")),
            ..Default::default()
        };
        assert!(resolve_lines(&args, Path::new("a.png"), 90, 90).is_err());
    }

    #[test]
    fn test_collect_inputs_scans_directory() {
        let temp = TempDir::new().unwrap();
        let image = RgbaImage::from_pixel(3, 3, Rgba([1, 2, 3, 255]));
        image.save(temp.path().join("a.png")).unwrap();
        image.save(temp.path().join("b.png")).unwrap();
        fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        let explicit = vec![temp.path().join("a.png")];
        let files = collect_inputs(&explicit, Some(temp.path())).unwrap();
        assert_eq!(files, vec![temp.path().join("a.png"), temp.path().join("b.png")]);
    }

    #[test]
    fn test_collect_inputs_missing_directory() {
        assert!(collect_inputs(&[], Some(Path::new("/nonexistent/dir"))).is_err());
    }
}
