//! Render and overlay command implementations

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{
    collect_inputs, load_settings, open_source, parse_size, resolve_lines, LinesArgs, EXIT_ERROR,
    EXIT_INVALID_ARGS, EXIT_SUCCESS,
};
use crate::compositor::{composite_with, CompositeOptions};
use crate::config::loader::CliOverrides;
use crate::config::NsliceConfig;
use crate::models::TargetSize;
use crate::output::{generate_output_path, save_png, source_stem};
use crate::overlay::{render_overlay, OverlayStyle};
use crate::watch::{watch_and_render, WatchOptions};

/// Run the render command
pub fn run_render(
    inputs: &[PathBuf],
    dir: Option<&Path>,
    output: Option<&Path>,
    size: Option<&str>,
    lines: &LinesArgs,
    strict: bool,
    watch: bool,
    config_path: Option<&Path>,
    overrides: &CliOverrides,
) -> ExitCode {
    let config = match load_settings(config_path, overrides) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let target = match size.map(parse_size).transpose() {
        Ok(target) => target,
        Err(code) => return code,
    };
    let files = match collect_inputs(inputs, dir) {
        Ok(files) => files,
        Err(code) => return code,
    };
    if files.is_empty() {
        eprintln!("Error: No input images (pass files or --dir)");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    if watch {
        if files.len() != 1 {
            eprintln!("Error: --watch takes exactly one input image, got {}", files.len());
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
        return run_watch(&files[0], output, target, lines, &config);
    }

    let options = config.render.options();
    let out_dir = config.output.dir.as_deref();
    let is_single = files.len() == 1;
    let mut failed = 0;

    for input in &files {
        let request = RenderRequest { input, target, output, out_dir, is_single, strict };
        if let Err(code) = render_one(&request, lines, &options) {
            if is_single {
                return code;
            }
            failed += 1;
        }
    }

    if failed > 0 {
        eprintln!("Error: {} of {} image(s) failed", failed, files.len());
        return ExitCode::from(EXIT_ERROR);
    }
    ExitCode::from(EXIT_SUCCESS)
}

struct RenderRequest<'a> {
    input: &'a Path,
    target: Option<TargetSize>,
    output: Option<&'a Path>,
    out_dir: Option<&'a Path>,
    is_single: bool,
    strict: bool,
}

fn render_one(
    request: &RenderRequest<'_>,
    lines_args: &LinesArgs,
    options: &CompositeOptions,
) -> Result<(), ExitCode> {
    let input = request.input;
    let source = open_source(input)?;
    let (width, height) = source.dimensions();
    let (lines, origin) = resolve_lines(lines_args, input, width, height)?;
    let target = request.target.unwrap_or_else(|| TargetSize::of_image(&source));
    log::debug!("render: {} lines {} ({}) -> {}", input.display(), lines, origin, target);

    let (image, warnings) = composite_with(&source, &lines, target, options);
    for warning in &warnings {
        eprintln!("Warning: {}: {}", input.display(), warning.message);
    }
    if request.strict && !warnings.is_empty() {
        eprintln!(
            "Error: {} warning(s) in strict mode, nothing written for {}",
            warnings.len(),
            input.display()
        );
        return Err(ExitCode::from(EXIT_ERROR));
    }

    let path =
        generate_output_path(input, target, request.output, request.out_dir, request.is_single);
    if let Err(e) = save_png(&image, &path) {
        eprintln!("Error: Failed to save {}: {}", path.display(), e);
        return Err(ExitCode::from(EXIT_ERROR));
    }
    println!("Saved: {}", path.display());
    Ok(())
}

fn run_watch(
    input: &Path,
    output: Option<&Path>,
    target: Option<TargetSize>,
    lines_args: &LinesArgs,
    config: &NsliceConfig,
) -> ExitCode {
    // Fails fast on a non-image before any watcher is set up
    let source = match open_source(input) {
        Ok(source) => source,
        Err(code) => return code,
    };
    let target = target.unwrap_or_else(|| TargetSize::of_image(&source));

    let lines = match lines_args.lines {
        Some(_) => match resolve_lines(lines_args, input, source.width(), source.height()) {
            Ok((lines, _)) => Some(lines),
            Err(code) => return code,
        },
        None => None,
    };
    let lines_file = lines_args.file_for(input);
    if lines_args.lines_file.is_some() && !lines_file.exists() {
        eprintln!("Error: Cut-line file not found: {}", lines_file.display());
        return ExitCode::from(EXIT_ERROR);
    }

    let options = WatchOptions {
        input: input.to_path_buf(),
        lines,
        lines_file: Some(lines_file),
        target,
        output: generate_output_path(input, target, output, config.output.dir.as_deref(), true),
        settings: config.editor.settings(),
        composite: config.render.options(),
        config: config.watch.clone(),
    };

    println!("Starting watch mode...");
    println!("Press Ctrl+C to stop");
    println!();

    match watch_and_render(options) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Watch error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Run the overlay command
///
/// Without `-o`, the overlay goes to the configured `[output] dir`, or next to
/// the source.
pub fn run_overlay(
    input: &Path,
    lines_args: &LinesArgs,
    output: Option<&Path>,
    config_path: Option<&Path>,
) -> ExitCode {
    let config = match load_settings(config_path, &CliOverrides::default()) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let source = match open_source(input) {
        Ok(source) => source,
        Err(code) => return code,
    };
    let (lines, origin) = match resolve_lines(lines_args, input, source.width(), source.height()) {
        Ok(resolved) => resolved,
        Err(code) => return code,
    };
    for violation in lines.violations(source.width(), source.height()) {
        eprintln!("Warning: cut lines: {}", violation);
    }

    let image = render_overlay(&source, &lines, &OverlayStyle::default());
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => {
            let file_name = format!("{}_overlay.png", source_stem(input));
            match config.output.dir.as_deref().or_else(|| input.parent()) {
                Some(dir) => dir.join(file_name),
                None => PathBuf::from(file_name),
            }
        }
    };

    if let Err(e) = save_png(&image, &path) {
        eprintln!("Error: Failed to save {}: {}", path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }
    println!("Saved: {} (lines {} from {})", path.display(), lines, origin);
    ExitCode::from(EXIT_SUCCESS)
}
