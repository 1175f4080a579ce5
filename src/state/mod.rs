//! Application state management
//!
//! The visualization state (`VizState`) is plain data changed only through the
//! reducer. Display options and transient UI interaction live next to it in
//! `view` and `ui`.

mod plot;
mod reducer;
mod ui;
mod view;

pub use plot::{ColArgs, PlotState};
pub use reducer::{VizAction, assign_ids, reduce};
pub use ui::UiState;
pub use view::ViewState;

use crate::data::DfHandle;
use serde::{Deserialize, Serialize};

/// Aggregate root for the visualization subsystem
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VizState {
    /// Frame every plot renders against; never persisted
    #[serde(skip)]
    pub df: Option<DfHandle>,

    /// Plot definitions in render order
    #[serde(default)]
    pub plots: Vec<PlotState>,
}

impl VizState {
    pub fn with_plots(plots: Vec<PlotState>) -> Self {
        Self { df: None, plots }
    }

    /// Check if a frame is available
    pub fn has_data(&self) -> bool {
        self.df.is_some()
    }

    /// Column names of the current frame
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .as_ref()
            .map(DfHandle::column_names)
            .unwrap_or_default()
    }

    /// Get the number of rows in the current frame
    pub fn row_count(&self) -> usize {
        self.df.as_ref().map(DfHandle::height).unwrap_or(0)
    }
}
