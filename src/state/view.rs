//! View and display options

use crate::constants::data::DEFAULT_PREVIEW_ROWS;
use crate::constants::plot::{DEFAULT_HISTOGRAM_BINS, DEFAULT_PLOT_HEIGHT};
use serde::{Deserialize, Serialize};

/// Display options shared by every plot view
///
/// This is also the shape of the JSON configuration file, so every field
/// falls back to its default when missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    /// Dark mode theme toggle
    pub dark_mode: bool,

    /// Grid visibility
    pub show_grid: bool,

    /// Legend visibility
    pub show_legend: bool,

    /// Data preview panel visibility
    pub show_data_table: bool,

    /// Show help panel
    #[serde(skip)]
    pub show_help: bool,

    /// Height of each plot view
    pub plot_height: f32,

    /// Number of histogram bins
    pub histogram_bins: usize,

    /// Rows shown in the data preview
    pub preview_rows: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            dark_mode: true,
            show_grid: true,
            show_legend: true,
            show_data_table: false,
            show_help: false,
            plot_height: DEFAULT_PLOT_HEIGHT,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl ViewState {
    /// Toggle dark mode
    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }
}
