//! Configuration loading and discovery for `nslice.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::NsliceConfig;
use crate::compositor::ResampleFilter;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file name searched for in the working directory and its parents
pub const CONFIG_FILE_NAME: &str = "nslice.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse nslice.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<String>),
}

fn format_validation_errors(errors: &[String]) -> String {
    errors.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n")
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override hit-test tolerance
    pub tolerance: Option<f64>,
    /// Override minimum line gap
    pub min_margin: Option<u32>,
    /// Override resampling filter
    pub filter: Option<ResampleFilter>,
    /// Override parallel resampling
    pub parallel: Option<bool>,
    /// Override output directory
    pub out_dir: Option<PathBuf>,
}

/// Find nslice.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for nslice.toml
/// 2. Check XDG_CONFIG_HOME/nineslice/nslice.toml (or ~/.config/nineslice/nslice.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find nslice.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("nineslice").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find nslice.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from an nslice.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("ui/nslice.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<NsliceConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            log::debug!("config: loading {}", p.display());
            load_config_file(&p)
        }
        None => Ok(NsliceConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<NsliceConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: NsliceConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut NsliceConfig, overrides: &CliOverrides) {
    if let Some(tolerance) = overrides.tolerance {
        config.editor.tolerance = tolerance;
    }
    if let Some(min_margin) = overrides.min_margin {
        config.editor.min_margin = min_margin;
    }
    if let Some(filter) = overrides.filter {
        config.render.filter = filter;
    }
    if let Some(parallel) = overrides.parallel {
        config.render.parallel = parallel;
    }
    if let Some(ref out_dir) = overrides.out_dir {
        config.output.dir = Some(out_dir.clone());
    }
}

/// Resolve a path relative to the directory holding the config file.
///
/// If the path is absolute, returns it unchanged.
pub fn resolve_path(config_path: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match config_path.parent() {
        Some(root) => root.join(path),
        None => path.to_path_buf(),
    }
}
