//! Side panel previewing the current data frame

use crate::app::VizOxide;
use crate::constants::layout::{TABLE_HEADER_HEIGHT, TABLE_ROW_HEIGHT};
use crate::data::frame::preview_rows;
use egui_extras::{Column, TableBuilder};

/// Indices of rows with any cell containing `filter` (case-insensitive)
pub fn filter_rows(rows: &[Vec<String>], filter: &str) -> Vec<usize> {
    let needle = filter.trim().to_lowercase();
    rows.iter()
        .enumerate()
        .filter(|(_, row)| needle.is_empty() || row.iter().any(|cell| cell.to_lowercase().contains(&needle)))
        .map(|(i, _)| i)
        .collect()
}

/// Render the data preview panel: the first rows of the current frame
pub fn render_data_table_panel(app: &mut VizOxide, ui: &mut eframe::egui::Ui) {
    profiling::scope!("render_data_table");

    let Some(df) = app.viewer.viz_state().df.clone() else {
        ui.weak("No data loaded");
        return;
    };
    let headers = df.column_names();
    let total_rows = df.height();
    let limit = app.view.preview_rows;

    let rows = app
        .preview
        .get_or_compute(&(Some(df.clone()), limit), |(_, limit)| preview_rows(df.get(), *limit));

    // Filter controls
    ui.horizontal(|ui| {
        ui.label("🔍");
        ui.add(
            eframe::egui::TextEdit::singleline(&mut app.ui.row_filter)
                .hint_text("Filter rows...")
                .desired_width(120.0),
        );
        if ui.small_button("✖").on_hover_text("Clear filter").clicked() {
            app.ui.row_filter.clear();
        }
    });

    let visible = filter_rows(rows, &app.ui.row_filter);
    ui.label(format!(
        "Showing {} of {} rows ({} cols)",
        visible.len(),
        total_rows,
        headers.len()
    ));
    ui.separator();

    TableBuilder::new(ui)
        .striped(true)
        .cell_layout(eframe::egui::Layout::left_to_right(eframe::egui::Align::Center))
        .column(Column::initial(45.0).resizable(false))
        .columns(Column::initial(100.0).resizable(true).clip(true), headers.len())
        .header(TABLE_HEADER_HEIGHT, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            for name in &headers {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(TABLE_ROW_HEIGHT, visible.len(), |mut row| {
                let Some(&row_idx) = visible.get(row.index()) else {
                    return;
                };
                row.col(|ui| {
                    ui.label(format!("{}", row_idx + 1));
                });
                for cell in &rows[row_idx] {
                    row.col(|ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows() -> Vec<Vec<String>> {
        vec![
            vec!["north".to_string(), "10".to_string()],
            vec!["South".to_string(), "20".to_string()],
            vec!["east".to_string(), "15".to_string()],
        ]
    }

    #[test]
    fn test_filter_rows() {
        assert_eq!(filter_rows(&rows(), ""), vec![0, 1, 2]);
        assert_eq!(filter_rows(&rows(), "SOUTH"), vec![1]);
        assert_eq!(filter_rows(&rows(), " 1"), vec![0, 2]);
        assert!(filter_rows(&rows(), "west").is_empty());
    }
}
