//! Display configuration file
//!
//! The configuration is the serialized [`ViewState`]. Missing fields take
//! their defaults, so a partial file such as `{"dark_mode": false}` is valid.

use std::path::{Path, PathBuf};

use crate::constants::files::CONFIG_FILE;
use crate::error::{PlotError, Result};
use crate::state::ViewState;

/// Read display options from `path`
pub fn load_config(path: &Path) -> Result<ViewState> {
    let contents = std::fs::read_to_string(path)?;
    let view: ViewState = serde_json::from_str(&contents)
        .map_err(|e| PlotError::Config(format!("{}: {}", path.display(), e)))?;
    if view.plot_height <= 0.0 || view.preview_rows == 0 || view.histogram_bins == 0 {
        return Err(PlotError::Config(format!(
            "{}: plot_height, preview_rows and histogram_bins must be positive",
            path.display()
        )));
    }
    Ok(view)
}

pub fn save_config(path: &Path, view: &ViewState) -> Result<()> {
    let json = serde_json::to_string_pretty(view)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), "saved display configuration");
    Ok(())
}

/// Configuration file to use: the explicit one, or the default file name
/// in the working directory when it exists
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(CONFIG_FILE);
            default.is_file().then_some(default)
        }
    }
}

/// Display options for startup. An unreadable configuration is logged and
/// replaced by defaults.
pub fn startup_view(explicit: Option<&Path>) -> ViewState {
    let Some(path) = resolve_config_path(explicit) else {
        return ViewState::default();
    };
    match load_config(&path) {
        Ok(view) => {
            tracing::info!(path = %path.display(), "loaded display configuration");
            view
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring configuration file");
            ViewState::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"dark_mode": false, "histogram_bins": 8}"#).unwrap();

        let view = load_config(&path).unwrap();
        assert!(!view.dark_mode);
        assert_eq!(view.histogram_bins, 8);
        assert_eq!(view.preview_rows, ViewState::default().preview_rows);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let view = ViewState {
            show_grid: false,
            plot_height: 200.0,
            ..ViewState::default()
        };

        save_config(&path, &view).unwrap();
        assert_eq!(load_config(&path).unwrap(), view);
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");

        std::fs::write(&path, r#"{"preview_rows": 0}"#).unwrap();
        assert!(matches!(load_config(&path), Err(PlotError::Config(_))));

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(load_config(&path), Err(PlotError::Config(_))));

        // Startup never fails on a bad file
        assert_eq!(startup_view(Some(&path)), ViewState::default());
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = Path::new("/tmp/custom.json");
        assert_eq!(resolve_config_path(Some(path)), Some(path.to_path_buf()));
    }
}
