//! Error types for VizOxide
//!
//! One typed error for every fallible path: state files, pipeline execution,
//! reducer actions and figure construction.

use std::any::Any;

use thiserror::Error;

/// Main error type for VizOxide operations
#[derive(Error, Debug)]
pub enum PlotError {
    /// File I/O error
    #[error("Failed to access file: {0}")]
    FileIo(#[from] std::io::Error),

    /// Polars data processing error
    #[error("Data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unsupported data source format
    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    /// State file written by an incompatible version
    #[error("Unsupported state file version {found} (expected {expected})")]
    StateVersion { found: u32, expected: u32 },

    /// Column not found in data
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Plot type missing from the registry
    #[error("Unknown plot type '{plot_type}'")]
    UnknownPlotType { plot_type: String },

    /// A builder needs an argument the plot does not set
    #[error("{plot_type} plot requires the '{arg}' argument")]
    MissingArgument { plot_type: String, arg: String },

    /// A plot option holds a value it does not understand
    #[error("Invalid value '{value}' for option '{option}'")]
    InvalidOption { option: String, value: String },

    /// Reducer action addressed a plot that does not exist
    #[error("Plot index {index} out of range (plots: {len})")]
    PlotIndex { index: usize, len: usize },

    /// The pipeline worker thread is gone
    #[error("Background worker stopped")]
    WorkerStopped,

    /// Empty dataset error
    #[error("Dataset is empty or has no rows")]
    EmptyDataset,

    /// Generic error with custom message
    #[error("{0}")]
    Custom(String),
}

/// Result type alias for VizOxide operations
pub type Result<T> = std::result::Result<T, PlotError>;

/// UI-friendly error message formatting
impl PlotError {
    /// Get a user-friendly error message suitable for displaying in UI
    pub fn user_message(&self) -> String {
        match self {
            PlotError::FileIo(e) => format!("File error: {}", e),
            PlotError::Polars(e) => format!("Data error: {}", e),
            PlotError::Json(e) => format!("JSON error: {}", e),
            PlotError::Config(msg) => format!("Config error: {}", msg),
            PlotError::UnsupportedFormat { extension } => {
                format!("Unsupported file format: '.{}'", extension)
            }
            PlotError::StateVersion { found, .. } => {
                format!("State file version {} is not supported", found)
            }
            PlotError::ColumnNotFound { column } => {
                format!("Column '{}' not found", column)
            }
            PlotError::UnknownPlotType { plot_type } => {
                format!("Unknown plot type '{}'", plot_type)
            }
            PlotError::MissingArgument { plot_type, arg } => {
                format!("Select a column for '{}' to draw a {} plot", arg, plot_type)
            }
            PlotError::InvalidOption { option, value } => {
                format!("'{}' is not a valid {}", value, option)
            }
            PlotError::PlotIndex { index, len } => {
                format!("Plot {} does not exist ({} plots)", index, len)
            }
            PlotError::WorkerStopped => "The data pipeline stopped unexpectedly".to_string(),
            PlotError::EmptyDataset => "Dataset is empty".to_string(),
            PlotError::Custom(msg) => msg.clone(),
        }
    }
}

/// Text carried by a caught panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PlotError::ColumnNotFound {
            column: "amount".to_string(),
        };
        assert_eq!(err.user_message(), "Column 'amount' not found");

        let err = PlotError::PlotIndex { index: 3, len: 1 };
        assert_eq!(err.to_string(), "Plot index 3 out of range (plots: 1)");
        assert_eq!(err.user_message(), "Plot 3 does not exist (1 plots)");
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let plot_err: PlotError = io_err.into();
        assert!(matches!(plot_err, PlotError::FileIo(_)));

        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let plot_err: PlotError = json_err.into();
        assert!(plot_err.user_message().starts_with("JSON error"));
    }

    #[test]
    fn test_panic_message() {
        let payload = std::panic::catch_unwind(|| panic!("bad {}", 42)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "bad 42");

        let payload = std::panic::catch_unwind(|| std::panic::panic_any(7_u8)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
