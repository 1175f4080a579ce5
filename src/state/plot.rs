//! Plot definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from plotting argument ("x", "y", "color") to column name
pub type ColArgs = BTreeMap<String, String>;

/// One user-defined chart
///
/// A value object: edits go through the `with_*` methods, which return a new
/// `PlotState` and leave `self` untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlotState {
    /// Stable key for the UI, assigned when the plot is added
    #[serde(default)]
    id: u64,

    /// Display title
    name: String,

    /// Key into the plot registry, empty when unset
    #[serde(default)]
    plot_type: String,

    #[serde(default)]
    col_args: ColArgs,
}

impl PlotState {
    pub fn new(name: impl Into<String>, plot_type: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            plot_type: plot_type.into(),
            col_args: ColArgs::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plot_type(&self) -> &str {
        &self.plot_type
    }

    pub fn col_args(&self) -> &ColArgs {
        &self.col_args
    }

    /// Column bound to `arg`, if any
    pub fn col_arg(&self, arg: &str) -> Option<&str> {
        self.col_args.get(arg).map(String::as_str)
    }

    pub fn with_id(&self, id: u64) -> Self {
        Self { id, ..self.clone() }
    }

    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn with_plot_type(&self, plot_type: impl Into<String>) -> Self {
        Self {
            plot_type: plot_type.into(),
            ..self.clone()
        }
    }

    /// Bind `arg` to `column`, or unbind it when `column` is `None`
    pub fn with_col_arg(&self, arg: impl Into<String>, column: Option<String>) -> Self {
        let mut col_args = self.col_args.clone();
        let arg = arg.into();
        match column {
            Some(column) => {
                col_args.insert(arg, column);
            }
            None => {
                col_args.remove(&arg);
            }
        }
        Self {
            col_args,
            ..self.clone()
        }
    }

    /// Builder-style binding used when constructing plots in code
    pub fn arg(self, arg: impl Into<String>, column: impl Into<String>) -> Self {
        self.with_col_arg(arg, Some(column.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edits_return_new_values() {
        let original = PlotState::new("Sales", "bar").arg("x", "region");
        let edited = original.with_col_arg("y", Some("amount".to_string()));

        assert_eq!(original.col_args().len(), 1);
        assert_eq!(edited.col_arg("y"), Some("amount"));
        assert_eq!(edited.name(), "Sales");

        let cleared = edited.with_col_arg("x", None);
        assert_eq!(cleared.col_arg("x"), None);
        assert_eq!(edited.col_arg("x"), Some("region"));
    }

    #[test]
    fn test_json_defaults() {
        let plot: PlotState = serde_json::from_str(r#"{"name": "Empty"}"#).unwrap();
        assert_eq!(plot.id(), 0);
        assert_eq!(plot.plot_type(), "");
        assert!(plot.col_args().is_empty());
    }
}
