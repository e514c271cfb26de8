mod app;
mod camera;
mod config;
mod data;
mod error;
mod mapping;
mod state;
mod ui;

use app::DrillViewApp;
use config::ViewerConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = ViewerConfig::default();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size),
        ..Default::default()
    };

    let title = config.window_title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| {
            Ok(Box::new(DrillViewApp {
                state: AppState::new(config),
            }))
        }),
    )
}
