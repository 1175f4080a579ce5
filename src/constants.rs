//! Application-wide constants and default values
//!
//! This module centralizes all magic numbers and default values used throughout
//! the application, making them easier to maintain and configure.

/// Plotting and visualization defaults
pub mod plot {
    /// Default number of histogram bins
    pub const DEFAULT_HISTOGRAM_BINS: usize = 20;

    /// Default height of one plot view in points
    pub const DEFAULT_PLOT_HEIGHT: f32 = 320.0;

    /// Width of a single bar relative to category spacing
    pub const BAR_WIDTH: f64 = 0.8;

    /// Plot type selected in the "new plot" form
    pub const DEFAULT_PLOT_TYPE: &str = "scatter";
}

/// Data pipeline and preview defaults
pub mod data {
    /// Rows used for CSV schema inference
    pub const CSV_INFER_SCHEMA_ROWS: usize = 100;

    /// Rows shown in the data preview table
    pub const DEFAULT_PREVIEW_ROWS: usize = 50;
}

/// UI layout defaults
pub mod layout {
    /// Right panel (data preview) default width
    pub const DATA_PANEL_WIDTH: f32 = 400.0;

    /// Table header row height
    pub const TABLE_HEADER_HEIGHT: f32 = 20.0;

    /// Table body row height
    pub const TABLE_ROW_HEIGHT: f32 = 18.0;

    /// Column width for dimension selects
    pub const DIMENSION_SELECT_WIDTH: f32 = 140.0;
}

/// Persisted state and configuration files
pub mod files {
    /// Current state file format version
    pub const STATE_VERSION: u32 = 1;

    /// Default state file name offered by the save dialog
    pub const DEFAULT_STATE_FILE: &str = "viewer_state.json";

    /// Configuration file name looked up in the working directory
    pub const CONFIG_FILE: &str = "viz-oxide.json";
}
