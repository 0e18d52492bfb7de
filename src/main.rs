mod app;
mod chart;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::DashboardApp;
use config::AppConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::discover().unwrap_or_else(|e| {
        log::error!("Ignoring configuration: {e:#}");
        AppConfig::default()
    });
    log::debug!("configuration: {config:?}");

    // Optional data file to open at startup.
    let startup_file = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Sustainability Indicators",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(config, startup_file)))),
    )
}
