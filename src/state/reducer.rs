//! Viz reducer: `(VizState, VizAction) -> VizState`

use std::collections::HashSet;

use super::{PlotState, VizState};
use crate::data::DfHandle;
use crate::error::{PlotError, Result};

/// State transitions for the visualization state
#[derive(Debug, Clone, PartialEq)]
pub enum VizAction {
    /// A new frame was produced (or cleared) by the data pipeline
    SetDataFrame(Option<DfHandle>),

    /// Append a plot; its id is assigned here
    AddPlot(PlotState),

    RemovePlot {
        index: usize,
    },

    /// Change the plot type. Column bindings are kept; arguments the new
    /// type does not accept are ignored when the figure is built.
    SetPlotType {
        index: usize,
        plot_type: String,
    },

    /// Bind (`Some`) or unbind (`None`) one plotting argument
    SetColArg {
        index: usize,
        arg: String,
        value: Option<String>,
    },

    SetName {
        index: usize,
        name: String,
    },

    /// Move the plot at `from` so it ends up at `to`
    MovePlot {
        from: usize,
        to: usize,
    },
}

fn check_index(plots: &[PlotState], index: usize) -> Result<()> {
    if index < plots.len() {
        Ok(())
    } else {
        Err(PlotError::PlotIndex {
            index,
            len: plots.len(),
        })
    }
}

fn replace_plot<F>(state: &VizState, index: usize, edit: F) -> Result<VizState>
where
    F: FnOnce(&PlotState) -> PlotState,
{
    check_index(&state.plots, index)?;
    let mut plots = state.plots.clone();
    plots[index] = edit(&state.plots[index]);
    Ok(VizState {
        df: state.df.clone(),
        plots,
    })
}

/// Give every plot a usable id: the first plot holding a nonzero id keeps it,
/// zero and repeated ids continue from the largest id seen.
pub fn assign_ids(plots: Vec<PlotState>) -> Vec<PlotState> {
    let mut next = plots.iter().map(PlotState::id).max().unwrap_or(0) + 1;
    let mut seen = HashSet::new();
    plots
        .into_iter()
        .map(|plot| {
            if plot.id() != 0 && seen.insert(plot.id()) {
                return plot;
            }
            let plot = plot.with_id(next);
            seen.insert(next);
            next += 1;
            plot
        })
        .collect()
}

/// Pure reducer. Never mutates `state`; out-of-range plot indices are errors.
pub fn reduce(state: &VizState, action: VizAction) -> Result<VizState> {
    match action {
        VizAction::SetDataFrame(df) => Ok(VizState {
            df,
            plots: state.plots.clone(),
        }),
        VizAction::AddPlot(plot) => {
            let id = state.plots.iter().map(PlotState::id).max().map_or(1, |max| max + 1);
            let mut plots = state.plots.clone();
            plots.push(plot.with_id(id));
            Ok(VizState {
                df: state.df.clone(),
                plots,
            })
        }
        VizAction::RemovePlot { index } => {
            check_index(&state.plots, index)?;
            let mut plots = state.plots.clone();
            plots.remove(index);
            Ok(VizState {
                df: state.df.clone(),
                plots,
            })
        }
        VizAction::SetPlotType { index, plot_type } => {
            replace_plot(state, index, |p| p.with_plot_type(plot_type))
        }
        VizAction::SetColArg { index, arg, value } => {
            replace_plot(state, index, |p| p.with_col_arg(arg, value))
        }
        VizAction::SetName { index, name } => replace_plot(state, index, |p| p.with_name(name)),
        VizAction::MovePlot { from, to } => {
            check_index(&state.plots, from)?;
            check_index(&state.plots, to)?;
            let mut plots = state.plots.clone();
            let plot = plots.remove(from);
            plots.insert(to, plot);
            Ok(VizState {
                df: state.df.clone(),
                plots,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn handle() -> DfHandle {
        DfHandle::new(df!("x" => [1.0, 2.0]).unwrap())
    }

    fn two_plots() -> VizState {
        let state = VizState::default();
        let state = reduce(&state, VizAction::AddPlot(PlotState::new("a", "scatter"))).unwrap();
        reduce(&state, VizAction::AddPlot(PlotState::new("b", "bar"))).unwrap()
    }

    #[test]
    fn test_reduce_is_pure() {
        let state = two_plots();
        let snapshot = state.clone();
        let d = handle();

        let first = reduce(&state, VizAction::SetDataFrame(Some(d.clone()))).unwrap();
        let second = reduce(&state, VizAction::SetDataFrame(Some(d))).unwrap();

        assert_eq!(state, snapshot, "Input state must not change");
        assert_eq!(first, second);
    }

    #[test]
    fn test_set_dataframe_keeps_plots() {
        let state = two_plots();
        let d = handle();

        let next = reduce(&state, VizAction::SetDataFrame(Some(d.clone()))).unwrap();
        assert_eq!(next.plots, state.plots);
        assert_eq!(next.df, Some(d));

        let cleared = reduce(&next, VizAction::SetDataFrame(None)).unwrap();
        assert!(cleared.df.is_none());
        assert_eq!(cleared.plots, state.plots);
    }

    #[test]
    fn test_add_assigns_unique_ids() {
        let state = two_plots();
        assert_eq!(state.plots[0].id(), 1);
        assert_eq!(state.plots[1].id(), 2);

        let state = reduce(&state, VizAction::RemovePlot { index: 0 }).unwrap();
        let state = reduce(&state, VizAction::AddPlot(PlotState::new("c", "line"))).unwrap();
        assert_eq!(state.plots[1].id(), 3);
    }

    #[test]
    fn test_assign_ids_fills_missing_and_duplicates() {
        let plots = vec![
            PlotState::new("a", "scatter"),
            PlotState::new("b", "line").with_id(3),
            PlotState::new("c", "bar").with_id(3),
            PlotState::new("d", "area"),
        ];
        let ids: Vec<u64> = assign_ids(plots).iter().map(PlotState::id).collect();
        assert_eq!(ids, vec![4, 3, 5, 6]);

        let kept = vec![PlotState::new("a", "bar").with_id(2), PlotState::new("b", "bar").with_id(7)];
        assert_eq!(assign_ids(kept.clone()), kept);
    }

    #[test]
    fn test_edit_actions() {
        let state = two_plots();
        let state = reduce(
            &state,
            VizAction::SetColArg {
                index: 0,
                arg: "x".to_string(),
                value: Some("colA".to_string()),
            },
        )
        .unwrap();
        let state = reduce(
            &state,
            VizAction::SetPlotType {
                index: 0,
                plot_type: "line".to_string(),
            },
        )
        .unwrap();
        let state = reduce(
            &state,
            VizAction::SetName {
                index: 1,
                name: "renamed".to_string(),
            },
        )
        .unwrap();

        assert_eq!(state.plots[0].plot_type(), "line");
        assert_eq!(state.plots[0].col_arg("x"), Some("colA"));
        assert_eq!(state.plots[1].name(), "renamed");
    }

    #[test]
    fn test_move_plot() {
        let state = two_plots();
        let state = reduce(&state, VizAction::AddPlot(PlotState::new("c", "line"))).unwrap();
        let moved = reduce(&state, VizAction::MovePlot { from: 2, to: 0 }).unwrap();

        let names: Vec<&str> = moved.plots.iter().map(PlotState::name).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_out_of_range_is_loud() {
        let state = two_plots();
        let err = reduce(&state, VizAction::RemovePlot { index: 5 }).unwrap_err();
        assert!(matches!(err, PlotError::PlotIndex { index: 5, len: 2 }));

        assert!(reduce(&state, VizAction::MovePlot { from: 0, to: 2 }).is_err());
    }
}
