//! Figure derivation with memoization
//!
//! `derive_figure` turns a plot definition and the current frame into a
//! [`FigureOutcome`]. Builder failures (errors and panics alike) become
//! `FigureOutcome::Error` and never reach the caller as a failure.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use super::figure::Figure;
use super::registry::PlotRegistry;
use crate::data::DfHandle;
use crate::error::{PlotError, panic_message};
use crate::hooks::Memo;
use crate::state::{ColArgs, PlotState};

/// Result of trying to build a chart
#[derive(Debug, Clone, PartialEq)]
pub enum FigureOutcome {
    /// Nothing to draw yet: no frame, no arguments or no plot type
    NoFigure,
    Figure(Arc<Figure>),
    /// Message of the failure that stopped construction
    Error(String),
}

/// Build the figure for `plot` against `df`
pub fn derive_figure(registry: &PlotRegistry, plot: &PlotState, df: Option<&DfHandle>) -> FigureOutcome {
    profiling::scope!("derive_figure");

    let Some(df) = df else {
        return FigureOutcome::NoFigure;
    };
    if plot.col_args().is_empty() || plot.plot_type().is_empty() {
        return FigureOutcome::NoFigure;
    }

    let Some(spec) = registry.get(plot.plot_type()) else {
        let err = PlotError::UnknownPlotType {
            plot_type: plot.plot_type().to_string(),
        };
        return FigureOutcome::Error(err.to_string());
    };

    let args = spec.filter_args(plot.col_args());
    let build = &spec.build;
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| build(df.get(), plot.name(), &args)));

    match outcome {
        Ok(Ok(figure)) => FigureOutcome::Figure(Arc::new(figure)),
        Ok(Err(err)) => {
            tracing::debug!(plot = plot.name(), error = %err, "figure construction failed");
            FigureOutcome::Error(err.to_string())
        }
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            tracing::warn!(plot = plot.name(), error = %msg, "figure builder panicked");
            FigureOutcome::Error(msg)
        }
    }
}

/// Inputs that determine a figure. The plot id is not part of the key.
#[derive(Debug, Clone, PartialEq)]
struct FigureKey {
    name: String,
    plot_type: String,
    col_args: ColArgs,
    df: Option<DfHandle>,
}

impl FigureKey {
    fn new(plot: &PlotState, df: Option<&DfHandle>) -> Self {
        Self {
            name: plot.name().to_string(),
            plot_type: plot.plot_type().to_string(),
            col_args: plot.col_args().clone(),
            df: df.cloned(),
        }
    }
}

/// Memoized figure for one plot view
///
/// Re-derives only when the plot definition or the frame handle changes.
/// With auto preview off, the last figure stays on screen until an update is
/// requested.
pub struct FigureCell {
    memo: Memo<FigureKey, FigureOutcome>,
    auto_preview: bool,
    update_requested: bool,
    outdated: bool,
}

impl Default for FigureCell {
    fn default() -> Self {
        Self {
            memo: Memo::new(),
            auto_preview: true,
            update_requested: false,
            outdated: false,
        }
    }
}

impl FigureCell {
    pub fn derive(&mut self, registry: &PlotRegistry, plot: &PlotState, df: Option<&DfHandle>) -> &FigureOutcome {
        let key = FigureKey::new(plot, df);
        let hold = !self.auto_preview && !std::mem::take(&mut self.update_requested);
        self.outdated = hold && self.memo.cached_key().is_some_and(|cached| *cached != key);
        self.memo
            .get_or_hold(&key, hold, |_| derive_figure(registry, plot, df))
    }

    pub fn auto_preview(&self) -> bool {
        self.auto_preview
    }

    pub fn set_auto_preview(&mut self, enabled: bool) {
        self.auto_preview = enabled;
    }

    /// Rebuild on the next `derive` even with auto preview off
    pub fn request_update(&mut self) {
        self.update_requested = true;
    }

    /// The shown figure was built from older inputs
    pub fn is_outdated(&self) -> bool {
        self.outdated
    }

    /// Forget the figure; the next `derive` rebuilds it
    pub fn invalidate(&mut self) {
        self.memo.invalidate();
    }

    /// Number of times the figure was actually rebuilt
    #[cfg(test)]
    pub fn derivations(&self) -> usize {
        self.memo.computations()
    }
}
