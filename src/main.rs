#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

//! VizOxide - interactive plots over a data pipeline

use std::path::PathBuf;

use clap::Parser;
use eframe::egui;
use tracing_subscriber::EnvFilter;

mod actions;
mod app;
mod config;
mod constants;
mod data;
mod error;
mod hooks;
mod persist;
mod plot;
mod state;
mod store;
mod ui;
mod viewer;

use app::VizOxide;

#[derive(Parser, Debug)]
#[command(name = "viz-oxide", version)]
#[command(about = "Interactive plots over a CSV/Parquet data pipeline", long_about = None)]
struct Args {
    /// State file (pipeline and plots) to open
    state: Option<PathBuf>,

    /// Display configuration file (defaults to ./viz-oxide.json when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[cfg(feature = "profile-with-puffin")]
fn start_puffin_server() {
    puffin::set_scopes_on(true);
    match puffin_http::Server::new("127.0.0.1:8585") {
        Ok(server) => {
            tracing::info!("puffin server listening on 127.0.0.1:8585");
            // Keep serving for the lifetime of the process
            std::mem::forget(server);
        }
        Err(e) => tracing::warn!(error = %e, "failed to start puffin server"),
    }
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    #[cfg(feature = "profile-with-puffin")]
    start_puffin_server();

    let view = config::startup_view(args.config.as_deref());
    let mut app = VizOxide::new(view, args.config);
    if let Some(path) = args.state {
        app.open_state(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native("VizOxide", options, Box::new(|_| Ok(Box::new(app))))
}
