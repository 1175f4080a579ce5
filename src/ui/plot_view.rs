//! Per-plot panels: header controls, dimension and option selects, chart

use chrono::{DateTime, Utc};
use eframe::egui::{self, Color32, ComboBox};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, Points};

use crate::app::VizOxide;
use crate::constants::layout::DIMENSION_SELECT_WIDTH;
use crate::plot::options::{OptionKind, option_spec};
use crate::plot::{Figure, FigureKind, arg_label};
use crate::state::{ViewState, VizAction};
use crate::viewer::{PlotContent, PlotView};

const NO_COLUMN: &str = "—";

pub fn series_color(index: usize) -> Color32 {
    let colors = [
        Color32::from_rgb(31, 119, 180),  // Blue
        Color32::from_rgb(255, 127, 14), // Orange
        Color32::from_rgb(44, 160, 44),  // Green
        Color32::from_rgb(214, 39, 40),  // Red
        Color32::from_rgb(148, 103, 189), // Purple
        Color32::from_rgb(140, 86, 75),  // Brown
        Color32::from_rgb(227, 119, 194), // Pink
        Color32::from_rgb(127, 127, 127), // Gray
        Color32::from_rgb(188, 189, 34), // Yellow
        Color32::from_rgb(23, 190, 207), // Cyan
    ];
    colors[index % colors.len()]
}

/// Axis text for a Unix timestamp in seconds
pub fn format_timestamp(value: f64) -> String {
    let secs = value.floor() as i64;
    let nanos = ((value.fract() * 1_000_000_000.0) as u32).min(999_999_999);
    match DateTime::<Utc>::from_timestamp(secs, nanos) {
        Some(dt) => dt.format("%Y-%m-%d\n%H:%M:%S").to_string(),
        None => format!("{:.2}", value),
    }
}

/// Tick text for a categorical axis; blank between categories
pub fn category_tick(categories: &[String], value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    categories.get(rounded as usize).cloned().unwrap_or_default()
}

fn format_number(value: f64) -> String {
    if value.abs() < 0.01 && value != 0.0 {
        format!("{:.2e}", value)
    } else if value.abs() >= 1000.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Tick text on a log10 axis shows the data value
fn format_log_tick(value: f64) -> String {
    format_number(10f64.powf(value))
}

/// How tick values on one axis are printed
#[derive(Clone)]
enum AxisText {
    Number,
    Log,
    Timestamp,
    Categories(Vec<String>),
}

impl AxisText {
    /// Axis along which the x column is laid out
    fn argument(figure: &Figure) -> Self {
        if figure.x_is_timestamp {
            AxisText::Timestamp
        } else if !figure.categories.is_empty() {
            AxisText::Categories(figure.categories.clone())
        } else if figure.log_x {
            AxisText::Log
        } else {
            AxisText::Number
        }
    }

    fn value(figure: &Figure) -> Self {
        if figure.log_y { AxisText::Log } else { AxisText::Number }
    }

    fn format(&self, value: f64) -> String {
        match self {
            AxisText::Number => format_number(value),
            AxisText::Log => format_log_tick(value),
            AxisText::Timestamp => format_timestamp(value),
            AxisText::Categories(categories) => category_tick(categories, value),
        }
    }
}

/// Edits collected while drawing, applied once the frame is laid out
enum PlotEdit {
    Viz(VizAction),
    AutoPreview { id: u64, enabled: bool },
    UpdatePreview { id: u64 },
}

/// Render every plot in order. Edits are collected and dispatched after
/// drawing so the viewer is not borrowed while the UI runs.
pub fn render_plot_views(app: &mut VizOxide, ui: &mut egui::Ui) {
    profiling::scope!("render_plot_views");

    let views = app.viewer.plot_views();
    if views.is_empty() {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.heading("No plots");
            ui.label("Add a plot from the toolbar or open a state file");
        });
        return;
    }

    let mut edits: Vec<PlotEdit> = Vec::new();
    let plot_count = views.len();

    egui::ScrollArea::vertical().show(ui, |ui| {
        for view in &views {
            ui.group(|ui| {
                render_header(app, ui, view, plot_count, &mut edits);
                render_dimensions(app, ui, view, &mut edits);
                render_options(app, ui, view, &mut edits);
                render_preview_controls(ui, view, &mut edits);
                ui.separator();
                render_content(app, ui, view);
            });
            ui.add_space(6.0);
        }
    });

    for edit in edits {
        match edit {
            PlotEdit::Viz(action) => app.apply(action),
            PlotEdit::AutoPreview { id, enabled } => app.viewer.set_auto_preview(id, enabled),
            PlotEdit::UpdatePreview { id } => app.viewer.update_preview(id),
        }
    }
}

fn render_header(
    app: &VizOxide,
    ui: &mut egui::Ui,
    view: &PlotView,
    plot_count: usize,
    edits: &mut Vec<PlotEdit>,
) {
    let registry = app.viewer.registry();
    ui.horizontal(|ui| {
        ui.strong(&view.name)
            .on_hover_text("Right-click to rename")
            .context_menu(|ui| {
                let mut name = view.name.clone();
                if ui.text_edit_singleline(&mut name).changed() {
                    edits.push(PlotEdit::Viz(VizAction::SetName {
                        index: view.index,
                        name,
                    }));
                }
            });

        ComboBox::from_id_salt(("plot_type", view.id))
            .selected_text(registry.label(&view.plot_type))
            .show_ui(ui, |ui| {
                for spec in registry.specs() {
                    let selected = spec.name == view.plot_type;
                    if ui.selectable_label(selected, &spec.label).clicked() && !selected {
                        edits.push(PlotEdit::Viz(VizAction::SetPlotType {
                            index: view.index,
                            plot_type: spec.name.clone(),
                        }));
                    }
                }
            });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("🗑").on_hover_text("Remove plot").clicked() {
                edits.push(PlotEdit::Viz(VizAction::RemovePlot { index: view.index }));
            }
            if view.index + 1 < plot_count && ui.button("⬇").on_hover_text("Move down").clicked() {
                edits.push(PlotEdit::Viz(VizAction::MovePlot {
                    from: view.index,
                    to: view.index + 1,
                }));
            }
            if view.index > 0 && ui.button("⬆").on_hover_text("Move up").clicked() {
                edits.push(PlotEdit::Viz(VizAction::MovePlot {
                    from: view.index,
                    to: view.index - 1,
                }));
            }
        });
    });
}

fn render_dimensions(app: &VizOxide, ui: &mut egui::Ui, view: &PlotView, edits: &mut Vec<PlotEdit>) {
    let Some(spec) = app.viewer.registry().get(&view.plot_type) else {
        return;
    };
    let Some(plot) = app.viewer.viz_state().plots.get(view.index) else {
        return;
    };
    let columns = app.viewer.columns();

    ui.horizontal_wrapped(|ui| {
        for arg in &spec.col_args {
            let current = plot.col_arg(arg);
            ui.label(arg_label(arg));
            ComboBox::from_id_salt(("col_arg", view.id, arg.as_str()))
                .selected_text(current.unwrap_or(NO_COLUMN))
                .width(DIMENSION_SELECT_WIDTH)
                .show_ui(ui, |ui| {
                    if ui.selectable_label(current.is_none(), NO_COLUMN).clicked() && current.is_some() {
                        edits.push(PlotEdit::Viz(VizAction::SetColArg {
                            index: view.index,
                            arg: arg.clone(),
                            value: None,
                        }));
                    }
                    for column in &columns {
                        let selected = current == Some(column.as_str());
                        if ui.selectable_label(selected, column).clicked() && !selected {
                            edits.push(PlotEdit::Viz(VizAction::SetColArg {
                                index: view.index,
                                arg: arg.clone(),
                                value: Some(column.clone()),
                            }));
                        }
                    }
                });
        }
    });
}

fn render_options(app: &VizOxide, ui: &mut egui::Ui, view: &PlotView, edits: &mut Vec<PlotEdit>) {
    let Some(spec) = app.viewer.registry().get(&view.plot_type) else {
        return;
    };
    let Some(plot) = app.viewer.viz_state().plots.get(view.index) else {
        return;
    };
    if spec.options.is_empty() {
        return;
    }

    ui.horizontal_wrapped(|ui| {
        for option in spec.options.iter().filter_map(|name| option_spec(name)) {
            let current = plot.col_arg(option.name);
            let set = |value: Option<&str>| {
                PlotEdit::Viz(VizAction::SetColArg {
                    index: view.index,
                    arg: option.name.to_string(),
                    value: value.map(str::to_string),
                })
            };
            match option.kind {
                OptionKind::Toggle => {
                    let mut checked = current == Some("true");
                    if ui.checkbox(&mut checked, option.label).changed() {
                        edits.push(set(checked.then_some("true")));
                    }
                }
                OptionKind::Choice(choices) => {
                    ui.label(option.label);
                    let selected_label = choices
                        .iter()
                        .find(|(value, _)| Some(*value) == current)
                        .or(choices.first())
                        .map_or("", |(_, label)| *label);
                    ComboBox::from_id_salt(("option", view.id, option.name))
                        .selected_text(selected_label)
                        .show_ui(ui, |ui| {
                            for (value, label) in choices {
                                let selected = current == Some(*value);
                                if ui.selectable_label(selected, *label).clicked() && !selected {
                                    edits.push(set(Some(*value)));
                                }
                            }
                        });
                }
            }
        }
    });
}

fn render_preview_controls(ui: &mut egui::Ui, view: &PlotView, edits: &mut Vec<PlotEdit>) {
    ui.horizontal(|ui| {
        let mut auto = view.auto_preview;
        if ui.checkbox(&mut auto, "Auto preview").changed() {
            edits.push(PlotEdit::AutoPreview {
                id: view.id,
                enabled: auto,
            });
        }
        if !view.auto_preview
            && ui
                .add_enabled(view.outdated, egui::Button::new("🔄 Update preview"))
                .clicked()
        {
            edits.push(PlotEdit::UpdatePreview { id: view.id });
        }
    });
}

fn render_content(app: &VizOxide, ui: &mut egui::Ui, view: &PlotView) {
    match &view.content {
        PlotContent::Chart(figure) => render_figure(ui, figure, &app.view, view.id),
        PlotContent::Error(msg) => {
            ui.colored_label(ui.visuals().error_fg_color, format!("⚠ {}", msg));
        }
        PlotContent::Empty => {
            let hint = if app.viewer.viz_state().has_data() {
                "Select columns to draw this plot"
            } else {
                "No data loaded"
            };
            ui.weak(hint);
        }
    }
}

/// Draw one figure with egui_plot
pub fn render_figure(ui: &mut egui::Ui, figure: &Figure, view: &ViewState, id: u64) {
    profiling::scope!("render_figure");

    // Horizontal bars put the category column on the vertical axis
    let (mut x_label, mut y_label) = (figure.x_label.clone(), figure.y_label.clone());
    let (mut x_text, mut y_text) = (AxisText::argument(figure), AxisText::value(figure));
    if figure.horizontal {
        std::mem::swap(&mut x_label, &mut y_label);
        std::mem::swap(&mut x_text, &mut y_text);
    }

    let mut plot = Plot::new(("figure", id))
        .show_grid(view.show_grid)
        .height(view.plot_height)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark, _range| x_text.format(mark.value))
        .y_axis_formatter(move |mark, _range| y_text.format(mark.value));

    if view.show_legend && figure.traces.len() > 1 {
        plot = plot.legend(Legend::default().position(egui_plot::Corner::RightTop));
    }

    plot.show(ui, |plot_ui| {
        for (i, trace) in figure.traces.iter().enumerate() {
            let color = series_color(i);
            match figure.kind {
                FigureKind::Scatter => {
                    plot_ui.points(Points::new(trace.name.clone(), trace.points.clone()).radius(3.0).color(color));
                }
                FigureKind::Line => {
                    plot_ui.line(Line::new(trace.name.clone(), trace.points.clone()).color(color));
                }
                FigureKind::Area => {
                    plot_ui.line(Line::new(trace.name.clone(), trace.points.clone()).color(color).fill(0.0));
                }
                FigureKind::Bar | FigureKind::Histogram => {
                    let bars: Vec<Bar> = trace
                        .points
                        .iter()
                        .map(|&[x, y]| Bar::new(x, y).width(figure.bar_width))
                        .collect();
                    let chart = BarChart::new(trace.name.clone(), bars).color(color);
                    plot_ui.bar_chart(if figure.horizontal { chart.horizontal() } else { chart });
                }
            }
        }
    });
}
