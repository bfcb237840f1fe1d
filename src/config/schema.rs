//! Configuration schema types for `nslice.toml`
//!
//! Every section is optional; missing values fall back to the defaults below.
//!
//! ```toml
//! [editor]
//! tolerance = 15.0
//! min_margin = 10
//!
//! [render]
//! filter = "triangle"
//! parallel = true
//!
//! [output]
//! dir = "build/ui"
//!
//! [watch]
//! debounce_ms = 100
//! clear_screen = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::compositor::{CompositeOptions, ResampleFilter};
use crate::editor::{EditorSettings, DEFAULT_MIN_MARGIN, DEFAULT_TOLERANCE};

/// Slice-line editor settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditorConfig {
    /// Hit-test radius in pixels
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Minimum gap kept between neighboring cut lines
    #[serde(default = "default_min_margin")]
    pub min_margin: u32,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_min_margin() -> u32 {
    DEFAULT_MIN_MARGIN
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self { tolerance: default_tolerance(), min_margin: default_min_margin() }
    }
}

impl EditorConfig {
    pub fn settings(&self) -> EditorSettings {
        EditorSettings { tolerance: self.tolerance, min_margin: self.min_margin }
    }
}

/// Compositing settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenderConfig {
    /// Resampling filter for stretched cells
    #[serde(default)]
    pub filter: ResampleFilter,
    /// Resample cells in parallel
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { filter: ResampleFilter::default(), parallel: true }
    }
}

impl RenderConfig {
    pub fn options(&self) -> CompositeOptions {
        CompositeOptions { filter: self.filter, parallel: self.parallel }
    }
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    /// Directory for rendered images (default: next to the source)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dir: Option<PathBuf>,
}

/// Watch mode configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchConfig {
    /// Debounce delay in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u32,
    /// Clear terminal between renders
    #[serde(default)]
    pub clear_screen: bool,
}

fn default_debounce_ms() -> u32 {
    100
}

fn default_true() -> bool {
    true
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: default_debounce_ms(), clear_screen: false }
    }
}

/// Complete nslice.toml configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NsliceConfig {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "editor.tolerance")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "nslice.toml: '{}' {}", self.field, self.message)
    }
}

impl NsliceConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if !self.editor.tolerance.is_finite() || self.editor.tolerance <= 0.0 {
            errors.push(ConfigValidationError {
                field: "editor.tolerance".to_string(),
                message: "must be a positive number".to_string(),
            });
        }

        if self.watch.debounce_ms == 0 {
            errors.push(ConfigValidationError {
                field: "watch.debounce_ms".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: NsliceConfig = toml::from_str("").unwrap();
        assert_eq!(config, NsliceConfig::default());
        assert_eq!(config.editor.tolerance, 15.0);
        assert_eq!(config.editor.min_margin, 10);
        assert_eq!(config.render.filter, ResampleFilter::Triangle);
        assert!(config.render.parallel);
        assert_eq!(config.output.dir, None);
        assert_eq!(config.watch.debounce_ms, 100);
    }

    #[test]
    fn test_full_config() {
        let toml_str = r#"
[editor]
tolerance = 8.5
min_margin = 4

[render]
filter = "catmull-rom"
parallel = false

[output]
dir = "build/ui"

[watch]
debounce_ms = 250
clear_screen = true
"#;
        let config: NsliceConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.editor.settings(), EditorSettings { tolerance: 8.5, min_margin: 4 });
        assert_eq!(
            config.render.options(),
            CompositeOptions { filter: ResampleFilter::CatmullRom, parallel: false }
        );
        assert_eq!(config.output.dir, Some(PathBuf::from("build/ui")));
        assert!(config.watch.clear_screen);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_unknown_filter_rejected() {
        let result: Result<NsliceConfig, _> = toml::from_str("[render]\nfilter = \"bicubic\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = NsliceConfig::default();
        config.editor.tolerance = 0.0;
        config.watch.debounce_ms = 0;

        let errors = config.validate();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "editor.tolerance");
        assert_eq!(
            errors[1].to_string(),
            "nslice.toml: 'watch.debounce_ms' must be a positive integer"
        );
    }
}
