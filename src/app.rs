//! Application shell: eframe app, panels, shortcuts and file dialogs

use std::path::{Path, PathBuf};
use std::time::Duration;

use eframe::App;
use eframe::egui::{self, CentralPanel, SidePanel, TopBottomPanel};

use crate::actions::{ActionsStore, ExecStatus};
use crate::config;
use crate::constants::files::DEFAULT_STATE_FILE;
use crate::constants::layout::DATA_PANEL_WIDTH;
use crate::data::{ActionsState, DfHandle};
use crate::error::PlotError;
use crate::hooks::Memo;
use crate::plot::PlotRegistry;
use crate::state::{UiState, ViewState, VizAction};
use crate::ui;
use crate::viewer::{Viewer, ViewerPhase};

/// Repaint interval while the data pipeline is running
const RUNNING_REPAINT: Duration = Duration::from_millis(50);

pub struct VizOxide {
    pub viewer: Viewer,
    pub view: ViewState,
    pub ui: UiState,
    /// Data preview rows for (frame, row limit)
    pub preview: Memo<(Option<DfHandle>, usize), Vec<Vec<String>>>,
    config_path: Option<PathBuf>,
}

impl VizOxide {
    pub fn new(view: ViewState, config_path: Option<PathBuf>) -> Self {
        let registry = PlotRegistry::with_histogram_bins(view.histogram_bins);
        Self {
            viewer: Viewer::with_provider(ActionsStore::new(), registry),
            view,
            ui: UiState::new(),
            preview: Memo::new(),
            config_path,
        }
    }

    /// Replace pipeline and plots with the contents of a state file
    pub fn open_state(&mut self, path: PathBuf) {
        match self.viewer.load(&path) {
            Ok(()) => self.ui.clear_error(),
            Err(e) => self.ui.set_error(e.user_message()),
        }
    }

    /// Use a CSV or Parquet file as the data source, keeping the plots
    pub fn open_data(&mut self, path: PathBuf) {
        tracing::info!(path = %path.display(), "opening data source");
        self.viewer.set_actions(ActionsState::from_source(path));
        self.ui.clear_error();
    }

    /// Dropped files: state files replace everything, data files only the source
    pub fn open_dropped(&mut self, path: PathBuf) {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match extension.as_str() {
            "json" => self.open_state(path),
            "csv" | "parquet" => self.open_data(path),
            _ => self.ui.set_error(PlotError::UnsupportedFormat { extension }.user_message()),
        }
    }

    pub fn save_state(&mut self, path: &Path) {
        match self.viewer.save(path) {
            Ok(()) => self.ui.clear_error(),
            Err(e) => self.ui.set_error(e.user_message()),
        }
    }

    pub fn save_state_dialog(&mut self) {
        let file_name = self
            .viewer
            .current_file()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or(DEFAULT_STATE_FILE)
            .to_string();
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("State", &["json"])
            .set_file_name(file_name)
            .save_file()
        {
            self.save_state(&path);
        }
    }

    /// Save display options to the configuration file, asking for a path if
    /// none was given on the command line
    pub fn save_config(&mut self) {
        let path = match self.config_path.clone() {
            Some(path) => path,
            None => match rfd::FileDialog::new()
                .add_filter("JSON", &["json"])
                .set_file_name(crate::constants::files::CONFIG_FILE)
                .save_file()
            {
                Some(path) => path,
                None => return,
            },
        };
        match config::save_config(&path, &self.view) {
            Ok(()) => self.config_path = Some(path),
            Err(e) => self.ui.set_error(e.user_message()),
        }
    }

    pub fn add_plot_from_form(&mut self) {
        let name = self.ui.new_plot.resolved_name(self.viewer.viz_state().plots.len() + 1);
        match self.viewer.add_plot(name, self.ui.new_plot.plot_type.clone()) {
            Ok(()) => self.ui.new_plot.name.clear(),
            Err(e) => self.ui.set_error(e.user_message()),
        }
    }

    /// Dispatch a plot edit, surfacing failures in the status bar
    pub fn apply(&mut self, action: VizAction) {
        if let Err(e) = self.viewer.dispatch(action) {
            tracing::warn!(error = %e, "plot edit rejected");
            self.ui.set_error(e.user_message());
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (open, save) = ctx.input(|i| {
            (
                i.modifiers.command && i.key_pressed(egui::Key::O),
                i.modifiers.command && i.key_pressed(egui::Key::S),
            )
        });
        if open {
            if let Some(path) = rfd::FileDialog::new().add_filter("State", &["json"]).pick_file() {
                self.open_state(path);
            }
        }
        if save {
            match self.viewer.current_file().map(Path::to_path_buf) {
                Some(path) => self.save_state(&path),
                None => self.save_state_dialog(),
            }
        }

        // Single-key toggles would fire while typing in a text field
        if ctx.wants_keyboard_input() {
            return;
        }
        ctx.input(|i| {
            if i.modifiers.command {
                return;
            }
            if i.key_pressed(egui::Key::G) {
                self.view.show_grid = !self.view.show_grid;
            }
            if i.key_pressed(egui::Key::L) {
                self.view.show_legend = !self.view.show_legend;
            }
            if i.key_pressed(egui::Key::D) {
                self.view.show_data_table = !self.view.show_data_table;
            }
            if i.key_pressed(egui::Key::T) {
                self.view.toggle_dark_mode();
            }
            if i.key_pressed(egui::Key::H) || i.key_pressed(egui::Key::F1) {
                self.view.show_help = !self.view.show_help;
            }
            if i.key_pressed(egui::Key::Escape) {
                self.view.show_help = false;
            }
        });
    }

    fn render_status_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            match self.viewer.phase() {
                ViewerPhase::Uninitialized => {
                    ui.weak("No state file");
                }
                ViewerPhase::Loading { path } => {
                    ui.label(format!("Loading {}…", path.display()));
                }
                ViewerPhase::Ready => {}
                ViewerPhase::Failed(msg) => {
                    ui.colored_label(ui.visuals().error_fg_color, format!("Load failed: {}", msg));
                }
            }
            if let Some(source) = self.viewer.actions().source.as_ref() {
                let name = source.file_name().and_then(|n| n.to_str()).unwrap_or("data");
                ui.label(format!("Source: {}", name))
                    .on_hover_text(source.display().to_string());
            }
            ui.separator();

            let state = self.viewer.viz_state();
            ui.label(format!(
                "Rows: {} | Cols: {} | Plots: {}",
                state.row_count(),
                state.column_names().len(),
                state.plots.len()
            ));

            match self.viewer.status() {
                ExecStatus::Running => {
                    ui.separator();
                    ui.label("Running…");
                }
                ExecStatus::Failed(msg) => {
                    ui.separator();
                    ui.colored_label(ui.visuals().error_fg_color, format!("Pipeline: {}", msg));
                }
                ExecStatus::Idle | ExecStatus::Done => {}
            }

            if let Some(msg) = self.ui.error_message.clone() {
                ui.separator();
                ui.colored_label(ui.visuals().error_fg_color, format!("⚠ {}", msg));
                if ui.small_button("✖").clicked() {
                    self.ui.clear_error();
                }
            }
        });
    }
}

impl App for VizOxide {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        profiling::finish_frame!();
        self.viewer.tick();

        if self.view.dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }

        self.handle_shortcuts(ctx);

        TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::render_toolbar(self, ctx, ui);
        });
        TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.render_status_bar(ui);
        });
        if self.view.show_data_table {
            SidePanel::right("data_table")
                .default_width(DATA_PANEL_WIDTH)
                .show(ctx, |ui| {
                    ui::render_data_table_panel(self, ui);
                });
        }
        CentralPanel::default().show(ctx, |ui| {
            ui::render_plot_views(self, ui);
        });

        ui::render_help_dialog(self, ctx);

        if self.viewer.is_running() {
            ctx.request_repaint_after(RUNNING_REPAINT);
        }
    }
}
