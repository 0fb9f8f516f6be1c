mod analysis;
mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod task;
mod ui;

use app::EqualizeApp;
use config::AppConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => {
            log::error!("Falling back to default configuration: {e:#}");
            (AppConfig::default(), Some(format!("Error: {e:#}")))
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Equalize – Gender Inequality Explorer",
        options,
        Box::new(move |_cc| Ok(Box::new(EqualizeApp::new(config, config_error)))),
    )
}
