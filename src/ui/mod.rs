//! egui panels drawn by the application shell

mod data_table;
mod help_dialog;
mod plot_view;
mod toolbar;

pub use data_table::render_data_table_panel;
pub use help_dialog::render_help_dialog;
pub use plot_view::render_plot_views;
pub use toolbar::render_toolbar;
