use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::DatasetKind;
use crate::data::loader::{FileSource, check_extension};
use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title row and the tab selector.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Drill-Hole Explorer");
    egui::menu::bar(ui, |ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.active_tab, tab, tab.label());
        }

        ui.separator();

        let n_loaded = state.loaded().count();
        ui.label(format!("{n_loaded}/4 datasets loaded"));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – session summary and refresh
// ---------------------------------------------------------------------------

pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Session");
    ui.separator();

    for kind in DatasetKind::ALL {
        let text = match state.dataset(kind) {
            Some(ds) => {
                let (rows, cols) = ds.shape();
                format!("{}: {rows} × {cols}", kind.title())
            }
            None => format!("{}: –", kind.title()),
        };
        ui.label(text);
    }

    ui.separator();
    ui.strong("Last load");
    match &state.last_load {
        Some(last) => {
            ui.label(format!("{} → {}", last.file_name, last.kind.name()));
            ui.label(format!("{} rows × {} columns", last.shape.0, last.shape.1));
            let origin = if last.cached { "from cache" } else { "parsed" };
            ui.label(format!("{origin} in {:.1} ms", last.elapsed.as_secs_f64() * 1000.0));
        }
        None => {
            ui.label("Nothing loaded yet.");
        }
    }
    if !state.cache().is_empty() {
        ui.weak(format!(
            "{} files held in cache, {} parses this session",
            state.cache().len(),
            state.cache().parse_count()
        ));
    }

    ui.separator();
    if ui.button("Refresh view").clicked() {
        state.refresh();
        ui.ctx().request_repaint();
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState, kind: DatasetKind) {
    let file = rfd::FileDialog::new()
        .set_title(format!("Open {} data", kind.name()))
        .add_filter("CSV", &["csv"])
        .add_filter("Other supported files", &["parquet", "pq", "json"])
        .pick_file();

    let Some(path) = file else {
        return;
    };

    let result = check_extension(&path.to_string_lossy())
        .and_then(|()| FileSource::read(&path))
        .and_then(|source| state.load(kind, &source));
    if let Err(e) = result {
        log::error!("Failed to load {}: {e:#}", path.display());
        state.report_error(&e);
    }
}
