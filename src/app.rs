use std::time::Duration;

use eframe::egui;

use crate::config::AppConfig;
use crate::state::{AppState, Screen};
use crate::ui::{panels, plot, regression, table};

/// Repaint interval while background work is pending.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct EqualizeApp {
    pub state: AppState,
}

impl EqualizeApp {
    /// Start preparing the configured dataset right away.
    pub fn new(config: AppConfig, config_error: Option<String>) -> Self {
        let path = config.dataset_path.clone();
        let mut state = AppState::new(config);
        state.start_loading(path);
        if config_error.is_some() {
            state.status_message = config_error;
        }
        Self { state }
    }
}

impl eframe::App for EqualizeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.state.poll_tasks() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation ----
        egui::SidePanel::left("nav_panel")
            .default_width(180.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: current screen ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.table.is_none() {
                panels::waiting(ui, &self.state);
                return;
            }
            match self.state.screen {
                Screen::Home => panels::home(ui, &self.state),
                Screen::Data => table::data_table(ui, &mut self.state),
                Screen::Plots => plot::plots_screen(ui, &mut self.state),
                Screen::Regression => regression::regression_screen(ui, &mut self.state),
            }
        });
    }
}
