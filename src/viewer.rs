//! Viewer orchestration
//!
//! Wires the data provider, the viz store and one memoized figure cell per
//! plot. The UI calls [`Viewer::tick`] once per frame and renders whatever
//! [`Viewer::plot_views`] returns.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use crate::actions::{ActionsStore, DataFrameProvider, ExecSnapshot, ExecStatus};
use crate::data::{ActionsState, DfHandle};
use crate::error::Result;
use crate::hooks::Effect;
use crate::persist;
use crate::plot::{Figure, FigureCell, FigureOutcome, PlotRegistry};
use crate::state::{PlotState, VizAction, VizState, assign_ids, reduce};
use crate::store::Store;

/// Lifecycle of one mounted viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerPhase {
    Uninitialized,
    Loading { path: PathBuf },
    Ready,
    Failed(String),
}

/// What a plot view shows
#[derive(Debug, Clone, PartialEq)]
pub enum PlotContent {
    Chart(Arc<Figure>),
    Error(String),
    /// Nothing derivable yet
    Empty,
}

/// One entry of the rendered plot list
#[derive(Debug, Clone, PartialEq)]
pub struct PlotView {
    pub id: u64,
    pub index: usize,
    pub name: String,
    pub plot_type: String,
    pub content: PlotContent,
    /// Figure follows every edit; otherwise it waits for `update_preview`
    pub auto_preview: bool,
    /// Inputs changed since the shown figure was built
    pub outdated: bool,
}

pub struct Viewer<P: DataFrameProvider = ActionsStore> {
    provider: P,
    viz: Store<VizState, VizAction>,
    registry: PlotRegistry,
    cells: HashMap<u64, FigureCell>,
    /// Provider snapshots not yet applied to the viz store
    pending: Rc<RefCell<Vec<ExecSnapshot>>>,
    df_effect: Effect<Option<DfHandle>>,
    phase: ViewerPhase,
    current_file: Option<PathBuf>,
}

impl Viewer<ActionsStore> {
    pub fn new() -> Self {
        Self::with_provider(ActionsStore::new(), PlotRegistry::builtin())
    }
}

impl Default for Viewer<ActionsStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: DataFrameProvider> Viewer<P> {
    pub fn with_provider(mut provider: P, registry: PlotRegistry) -> Self {
        let pending: Rc<RefCell<Vec<ExecSnapshot>>> = Rc::default();
        let sink = Rc::clone(&pending);
        provider.subscribe(Box::new(move |snapshot: &ExecSnapshot| {
            sink.borrow_mut().push(snapshot.clone());
        }));

        Self {
            provider,
            viz: Store::new(VizState::default(), reduce),
            registry,
            cells: HashMap::new(),
            pending,
            df_effect: Effect::new(),
            phase: ViewerPhase::Uninitialized,
            current_file: None,
        }
    }

    pub fn phase(&self) -> &ViewerPhase {
        &self.phase
    }

    pub fn viz_state(&self) -> &VizState {
        self.viz.state()
    }

    pub fn actions(&self) -> &ActionsState {
        self.provider.actions()
    }

    #[cfg(test)]
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn registry(&self) -> &PlotRegistry {
        &self.registry
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    pub fn status(&self) -> ExecStatus {
        self.provider.status()
    }

    /// Status indicator: the pipeline is producing a new frame
    pub fn is_running(&self) -> bool {
        self.provider.status().is_running()
    }

    /// Column names of the frame plots render against
    pub fn columns(&self) -> Vec<String> {
        self.viz.state().column_names()
    }

    /// Load a state file, replacing both the pipeline and the plots
    ///
    /// On failure the previous states stay in place, the phase becomes
    /// `Failed` and the error is returned to the caller.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        self.phase = ViewerPhase::Loading {
            path: path.to_path_buf(),
        };

        match persist::load_state(path) {
            Ok((actions, viz)) => {
                self.replace_states(actions, viz);
                self.current_file = Some(path.to_path_buf());
                self.phase = ViewerPhase::Ready;
                Ok(())
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to load viewer state");
                self.phase = ViewerPhase::Failed(e.user_message());
                Err(e)
            }
        }
    }

    /// Save the current pipeline and plots to `path`
    pub fn save(&mut self, path: &Path) -> Result<()> {
        persist::save_state(path, self.provider.actions(), self.viz.state())?;
        self.current_file = Some(path.to_path_buf());
        Ok(())
    }

    /// Replace both states wholesale. Nothing from the previous states is
    /// merged, and frames still being produced for them are never applied.
    pub fn replace_states(&mut self, actions: ActionsState, viz: VizState) {
        self.pending.borrow_mut().clear();
        self.cells.clear();
        self.df_effect.reset();
        self.viz.replace(VizState::with_plots(assign_ids(viz.plots)));
        self.provider.load_actions(actions);
        self.apply_pending();
        self.phase = ViewerPhase::Ready;
    }

    /// Per-frame update: collect provider changes and dispatch a new frame
    /// into the viz store when the handle changed. Returns true if anything
    /// happened.
    pub fn tick(&mut self) -> bool {
        profiling::scope!("viewer_tick");
        let polled = self.provider.poll();
        let dispatched = self.apply_pending();
        polled || dispatched
    }

    fn apply_pending(&mut self) -> bool {
        let snapshots: Vec<ExecSnapshot> = self.pending.borrow_mut().drain(..).collect();
        let mut dispatched = false;
        for snapshot in snapshots {
            let viz = &mut self.viz;
            dispatched |= self.df_effect.run_if_changed(&snapshot.df, |df| {
                tracing::debug!(handle = ?df, "data frame changed");
                if let Err(e) = viz.dispatch(VizAction::SetDataFrame(df.clone())) {
                    tracing::error!(error = %e, "failed to apply new data frame");
                }
            });
        }
        dispatched
    }

    /// Apply a user edit to the plots
    pub fn dispatch(&mut self, action: VizAction) -> Result<()> {
        self.viz.dispatch(action)?;
        let live: Vec<u64> = self.viz.state().plots.iter().map(PlotState::id).collect();
        self.cells.retain(|id, _| live.contains(id));
        Ok(())
    }

    pub fn add_plot(&mut self, name: impl Into<String>, plot_type: impl Into<String>) -> Result<()> {
        self.dispatch(VizAction::AddPlot(PlotState::new(name, plot_type)))
    }

    /// Replace the pipeline keeping the plots
    pub fn set_actions(&mut self, actions: ActionsState) {
        self.provider.load_actions(actions);
        self.apply_pending();
    }

    /// Change the histogram bin count; every figure is rebuilt
    pub fn set_histogram_bins(&mut self, bins: usize) {
        self.registry.set_histogram_bins(bins);
        for cell in self.cells.values_mut() {
            cell.invalidate();
        }
    }

    /// Toggle live figure updates for plot `id`
    pub fn set_auto_preview(&mut self, id: u64, enabled: bool) {
        self.cells.entry(id).or_default().set_auto_preview(enabled);
    }

    /// Rebuild the figure of plot `id` on the next `plot_views`
    pub fn update_preview(&mut self, id: u64) {
        if let Some(cell) = self.cells.get_mut(&id) {
            cell.request_update();
        }
    }

    /// One view per plot, in plot order, with memoized figures
    pub fn plot_views(&mut self) -> Vec<PlotView> {
        profiling::scope!("plot_views");
        let Self {
            viz,
            registry,
            cells,
            ..
        } = self;
        let state = viz.state();

        state
            .plots
            .iter()
            .enumerate()
            .map(|(index, plot)| {
                let cell = cells.entry(plot.id()).or_default();
                let content = match cell.derive(registry, plot, state.df.as_ref()) {
                    FigureOutcome::Figure(fig) => PlotContent::Chart(Arc::clone(fig)),
                    FigureOutcome::Error(msg) => PlotContent::Error(msg.clone()),
                    FigureOutcome::NoFigure => PlotContent::Empty,
                };
                PlotView {
                    id: plot.id(),
                    index,
                    name: plot.name().to_string(),
                    plot_type: plot.plot_type().to_string(),
                    content,
                    auto_preview: cell.auto_preview(),
                    outdated: cell.is_outdated(),
                }
            })
            .collect()
    }

    /// How many times the figure for plot `id` has been built
    #[cfg(test)]
    pub fn figure_derivations(&self, id: u64) -> usize {
        self.cells.get(&id).map_or(0, FigureCell::derivations)
    }
}
