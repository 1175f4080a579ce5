//! Top toolbar: file actions, plot creation and view toggles

use eframe::egui::{self, ComboBox};

use crate::app::VizOxide;
use crate::constants::files::DEFAULT_STATE_FILE;

/// Render the toolbar: files, the new-plot form, display toggles and status
pub fn render_toolbar(app: &mut VizOxide, ctx: &egui::Context, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        // File operations
        if ui.button("📂").on_hover_text("Open state file (Ctrl+O)").clicked() {
            if let Some(path) = rfd::FileDialog::new().add_filter("State", &["json"]).pick_file() {
                app.open_state(path);
            }
        }
        if ui.button("📊").on_hover_text("Open data file").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("Data Files", &["csv", "parquet"])
                .pick_file()
            {
                app.open_data(path);
            }
        }
        if ui.button("💾").on_hover_text("Save state (Ctrl+S)").clicked() {
            app.save_state_dialog();
        }

        if let Some(file) = app.viewer.current_file() {
            ui.label(format!(
                "📄 {}",
                file.file_name().and_then(|n| n.to_str()).unwrap_or(DEFAULT_STATE_FILE)
            ))
            .on_hover_text(file.display().to_string());
        }

        if app.viewer.is_running() {
            ui.spinner().on_hover_text("Running data pipeline");
        }

        ui.separator();

        // New plot form
        let hint = app.ui.new_plot.fallback_name(app.viewer.viz_state().plots.len() + 1);
        ui.add(
            egui::TextEdit::singleline(&mut app.ui.new_plot.name)
                .hint_text(hint)
                .desired_width(120.0),
        );
        let plot_type = app.ui.new_plot.plot_type.clone();
        ComboBox::from_id_salt("new_plot_type")
            .selected_text(app.viewer.registry().label(&plot_type))
            .show_ui(ui, |ui| {
                for spec in app.viewer.registry().specs() {
                    ui.selectable_value(&mut app.ui.new_plot.plot_type, spec.name.clone(), &spec.label);
                }
            });
        if ui.button("➕ Add plot").clicked() {
            app.add_plot_from_form();
        }

        ui.separator();

        // Display toggles
        ui.toggle_value(&mut app.view.show_grid, "⊞").on_hover_text("Grid (G)");
        ui.toggle_value(&mut app.view.show_legend, "🏷").on_hover_text("Legend (L)");
        ui.toggle_value(&mut app.view.show_data_table, "📋").on_hover_text("Data preview (D)");
        let bins = app.view.histogram_bins;
        ui.add(egui::DragValue::new(&mut app.view.histogram_bins).range(1..=200).prefix("bins: "))
            .on_hover_text("Histogram bins");
        if bins != app.view.histogram_bins {
            app.viewer.set_histogram_bins(app.view.histogram_bins);
        }
        if ui
            .button(if app.view.dark_mode { "🌙" } else { "☀" })
            .on_hover_text("Toggle theme (T)")
            .clicked()
        {
            app.view.toggle_dark_mode();
        }
        if ui.button("⚙").on_hover_text("Save display settings").clicked() {
            app.save_config();
        }
        if ui.button("❓").on_hover_text("Help (F1)").clicked() {
            app.view.show_help = !app.view.show_help;
        }
    });

    // Handle drag and drop: state files replace everything, data files
    // replace only the pipeline
    let dropped = ctx.input(|i| i.raw.dropped_files.first().and_then(|f| f.path.clone()));
    if let Some(path) = dropped {
        app.open_dropped(path);
    }
}
