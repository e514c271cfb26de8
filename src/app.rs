use eframe::egui;

use crate::state::{AppState, Tab};
use crate::ui::{loading, panels, preview, scene, statistics};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct DrillViewApp {
    pub state: AppState,
}

impl eframe::App for DrillViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title + tabs ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: session summary ----
        egui::SidePanel::left("session_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: active tab ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.active_tab {
            Tab::Loading => loading::loading_tab(ui, &mut self.state),
            Tab::Preview => preview::preview_tab(ui, &mut self.state),
            Tab::Statistics => statistics::statistics_tab(ui, &mut self.state),
            Tab::Scene => scene::scene_tab(ui, &mut self.state),
        });
    }
}
