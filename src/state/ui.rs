//! UI interaction state

use crate::constants::plot::DEFAULT_PLOT_TYPE;

/// Inputs of the "new plot" form
#[derive(Debug, Clone)]
pub struct NewPlotForm {
    pub name: String,
    pub plot_type: String,
}

impl Default for NewPlotForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            plot_type: DEFAULT_PLOT_TYPE.to_string(),
        }
    }
}

impl NewPlotForm {
    /// Name to use when the user left the field empty, e.g. "bar-2"
    pub fn fallback_name(&self, plot_count: usize) -> String {
        format!("{}-{}", self.plot_type, plot_count)
    }

    /// Entered name or the fallback
    pub fn resolved_name(&self, plot_count: usize) -> String {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            self.fallback_name(plot_count)
        } else {
            trimmed.to_string()
        }
    }
}

/// UI state for the toolbar form and status line
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// "New plot" form inputs
    pub new_plot: NewPlotForm,

    /// Error message to display in UI (toast/status bar)
    pub error_message: Option<String>,

    /// Data preview text filter
    pub row_filter: String,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an error message
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    /// Clear the current error message
    pub fn clear_error(&mut self) {
        self.error_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_plot_name() {
        let mut form = NewPlotForm::default();
        assert_eq!(form.resolved_name(2), "scatter-2");

        form.name = "  Revenue ".to_string();
        assert_eq!(form.resolved_name(2), "Revenue");
    }

    #[test]
    fn test_error_lifecycle() {
        let mut ui = UiState::new();
        assert!(ui.error_message.is_none());
        ui.set_error("boom");
        assert_eq!(ui.error_message.as_deref(), Some("boom"));
        ui.clear_error();
        assert!(ui.error_message.is_none());
    }
}
