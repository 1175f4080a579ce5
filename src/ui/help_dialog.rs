//! Keyboard shortcut reference window

use crate::app::VizOxide;

pub fn render_help_dialog(app: &mut VizOxide, ctx: &eframe::egui::Context) {
    if app.view.show_help {
        eframe::egui::Window::new("⌨ Keyboard Shortcuts")
            .anchor(eframe::egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .collapsible(false)
            .show(ctx, |ui| {
                ui.heading("Files");
                ui.label("Ctrl+O - Open state file");
                ui.label("Ctrl+S - Save state file");
                ui.label("Drop a .json file - Open state");
                ui.label("Drop a .csv / .parquet file - Use as data source");

                ui.separator();
                ui.heading("Display");
                ui.label("G - Toggle grid");
                ui.label("L - Toggle legend");
                ui.label("D - Toggle data preview");
                ui.label("T - Toggle dark/light theme");
                ui.label("H / F1 - Toggle help");
                ui.label("ESC - Close help");

                ui.separator();
                ui.heading("Plots");
                ui.label("Right-click a plot name - Rename");
                ui.label("Scroll - Zoom in/out");
                ui.label("Drag - Pan view");
                ui.label("Double-click - Reset view");

                ui.separator();
                if ui.button("Close").clicked() {
                    app.view.show_help = false;
                }
            });
    }
}
