//! Watch mode for re-rendering on file changes
//!
//! Watches one source image (and its cut-line file) with debouncing for the
//! `nslice render --watch` command.

use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::compositor::CompositeOptions;
use crate::config::schema::WatchConfig;
use crate::editor::EditorSettings;
use crate::models::{CutLines, TargetSize};
use crate::output::write_file_atomic;
use crate::session::PreviewSession;
use crate::sidecar::load_lines;
use crate::source::load_source;

/// Error during watch mode
#[derive(Debug, Error)]
pub enum WatchError {
    /// Failed to initialize file watcher
    #[error("Failed to initialize file watcher: {0}")]
    WatcherInit(#[source] notify::Error),
    /// Failed to add watch path
    #[error("Failed to watch path: {0}")]
    WatchPath(#[source] notify::Error),
    /// Channel receive error
    #[error("Watch channel error: {0}")]
    Channel(String),
    /// Source image not found
    #[error("Source image not found: {}", .0.display())]
    SourceNotFound(PathBuf),
}

/// Options for watch mode
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Source image to watch
    pub input: PathBuf,
    /// Fixed cut lines; when set, `lines_file` is ignored
    pub lines: Option<CutLines>,
    /// Cut-line file reloaded on every pass (falls back to thirds if missing)
    pub lines_file: Option<PathBuf>,
    /// Output size
    pub target: TargetSize,
    /// Where the rendered PNG is written
    pub output: PathBuf,
    pub settings: EditorSettings,
    pub composite: CompositeOptions,
    /// Watch configuration (debounce, clear screen)
    pub config: WatchConfig,
}

/// Result of a single render pass
#[derive(Debug, Default)]
pub struct RenderPass {
    /// Lines the image was rendered with
    pub lines: Option<CutLines>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub duration: Duration,
}

impl RenderPass {
    /// Check if the pass wrote an image
    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Clear the terminal screen
fn clear_screen() {
    // ANSI escape code to clear screen and move cursor to top-left
    print!("\x1B[2J\x1B[1;1H");
}

/// Format duration for display
fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

/// Get current timestamp for logging
fn timestamp() -> String {
    use std::time::SystemTime;
    let now = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
    let secs = now.as_secs() % 86400;
    let hours = (secs / 3600) % 24;
    let minutes = (secs / 60) % 60;
    let seconds = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Load the source and lines from disk, composite, and write the output.
///
/// Called on startup and after each relevant change. Failures are collected
/// in the returned pass rather than stopping the watch loop.
pub fn render_pass(options: &WatchOptions) -> RenderPass {
    let start = Instant::now();
    let mut pass = RenderPass::default();
    if let Err(message) = render_into(options, &mut pass) {
        pass.errors.push(message);
    }
    pass.duration = start.elapsed();
    pass
}

fn render_into(options: &WatchOptions, pass: &mut RenderPass) -> Result<(), String> {
    let source = load_source(&options.input).map_err(|e| e.to_string())?;

    let lines = match (&options.lines, &options.lines_file) {
        (Some(lines), _) => *lines,
        (None, Some(path)) if path.exists() => load_lines(path).map_err(|e| e.to_string())?,
        _ => CutLines::thirds(source.width(), source.height()),
    };
    let mut session = PreviewSession::with_options(source, options.settings, options.composite);
    session.editor_mut().set_lines(lines);
    session.set_target(options.target);
    session.request_render().map_err(|e| e.to_string())?;
    let preview = session.wait().map_err(|e| e.to_string())?;

    pass.warnings.extend(preview.warnings.iter().map(|w| w.message.clone()));
    write_file_atomic(&options.output, &preview.png)
        .map_err(|e| format!("Failed to write '{}': {}", options.output.display(), e))?;
    pass.lines = Some(preview.lines);
    Ok(())
}

/// Directories to watch: the parents of the input and of the cut-line file.
fn watch_dirs(options: &WatchOptions) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    let files = std::iter::once(&options.input).chain(options.lines_file.iter());
    for file in files {
        let dir = match file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}

/// Check if a changed path is one of the watched files
fn is_relevant_change(path: &Path, watched: &[&Path]) -> bool {
    match path.file_name() {
        Some(name) => watched.iter().any(|w| w.file_name() == Some(name)),
        None => false,
    }
}

/// Watch the source image and cut-line file, re-rendering on change.
///
/// This function blocks and runs until interrupted (Ctrl+C).
///
/// # Returns
/// * `Err(WatchError)` if watch setup fails or the event channel closes
pub fn watch_and_render(options: WatchOptions) -> Result<(), WatchError> {
    if !options.input.exists() {
        return Err(WatchError::SourceNotFound(options.input.clone()));
    }

    let (tx, rx) = channel();
    let debounce_duration = Duration::from_millis(options.config.debounce_ms as u64);
    let mut debouncer = new_debouncer(debounce_duration, tx).map_err(WatchError::WatcherInit)?;

    for dir in watch_dirs(&options) {
        log::debug!("watch: watching {}", dir.display());
        debouncer
            .watcher()
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(WatchError::WatchPath)?;
    }

    let mut watched: Vec<&Path> = vec![options.input.as_path()];
    if options.lines.is_none() {
        if let Some(ref lines_file) = options.lines_file {
            watched.push(lines_file.as_path());
        }
    }

    if options.config.clear_screen {
        clear_screen();
    }
    println!("[{}] Rendering...", timestamp());
    print_render_pass(&render_pass(&options), &options.output);
    println!("[{}] Watching {} for changes...", timestamp(), options.input.display());

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant_changes: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        matches!(e.kind, DebouncedEventKind::Any)
                            && is_relevant_change(&e.path, &watched)
                    })
                    .collect();

                if relevant_changes.is_empty() {
                    continue;
                }
                for event in &relevant_changes {
                    if let Some(name) = event.path.file_name() {
                        println!("[{}] Changed: {}", timestamp(), name.to_string_lossy());
                    }
                }

                if options.config.clear_screen {
                    clear_screen();
                }
                println!("[{}] Rendering...", timestamp());
                print_render_pass(&render_pass(&options), &options.output);
                println!("[{}] Watching {} for changes...", timestamp(), options.input.display());
            }
            Ok(Err(error)) => {
                // Watch error (non-fatal) - log but continue watching
                eprintln!("[{}] Watch error: {:?}", timestamp(), error);
                eprintln!("[{}] Continuing to watch...", timestamp());
            }
            Err(e) => {
                return Err(WatchError::Channel(e.to_string()));
            }
        }
    }
}

fn print_render_pass(pass: &RenderPass, output: &Path) {
    match (pass.success(), pass.lines) {
        (true, Some(lines)) => println!(
            "[{}] Rendered {} ({}) - lines {}",
            timestamp(),
            output.display(),
            format_duration(pass.duration),
            lines
        ),
        _ => {
            println!("[{}] Render failed ({})", timestamp(), format_duration(pass.duration));
            for error in &pass.errors {
                eprintln!("[{}] Error: {}", timestamp(), error);
            }
        }
    }

    for warning in &pass.warnings {
        eprintln!("[{}] Warning: {}", timestamp(), warning);
    }
}
