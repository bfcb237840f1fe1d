//! Cut-line files stored next to source images
//!
//! A sidecar is a small JSON document holding the four cut lines for one
//! source image, by default `<image>.slice.json`:
//!
//! ```json
//! {"vertical1": 30, "vertical2": 60, "horizontal1": 30, "horizontal2": 60}
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::CutLines;

/// Suffix appended to the image file name
pub const SIDECAR_SUFFIX: &str = ".slice.json";

/// Error reading or writing a cut-line file
#[derive(Debug, Error)]
pub enum SidecarError {
    #[error("Cannot access cut-line file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid cut-line file '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Default sidecar path for a source image: `panel.png` -> `panel.png.slice.json`.
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    let mut name = image_path.as_os_str().to_os_string();
    name.push(SIDECAR_SUFFIX);
    PathBuf::from(name)
}

/// Read cut lines from a JSON file.
pub fn load_lines(path: &Path) -> Result<CutLines, SidecarError> {
    let contents = fs::read_to_string(path)
        .map_err(|source| SidecarError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_str(&contents)
        .map_err(|source| SidecarError::Json { path: path.to_path_buf(), source })
}

/// Write cut lines as pretty-printed JSON.
pub fn save_lines(path: &Path, lines: &CutLines) -> Result<(), SidecarError> {
    let json = serde_json::to_string_pretty(lines)
        .map_err(|source| SidecarError::Json { path: path.to_path_buf(), source })?;
    fs::write(path, json + "\n")
        .map_err(|source| SidecarError::Io { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sidecar_path() {
        assert_eq!(
            sidecar_path(Path::new("ui/panel.png")),
            PathBuf::from("ui/panel.png.slice.json")
        );
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("panel.png.slice.json");
        let lines = CutLines::new(12, 40, 8, 30);

        save_lines(&path, &lines).unwrap();
        assert_eq!(load_lines(&path).unwrap(), lines);
    }

    #[test]
    fn test_load_rejects_bad_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.slice.json");
        fs::write(&path, r#"{"vertical1": 1}"#).unwrap();

        assert!(matches!(load_lines(&path), Err(SidecarError::Json { .. })));
    }

    #[test]
    fn test_load_missing() {
        let result = load_lines(Path::new("/nonexistent/x.slice.json"));
        assert!(matches!(result, Err(SidecarError::Io { .. })));
    }
}
