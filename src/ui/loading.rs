use eframe::egui::{self, Ui};

use crate::data::DatasetKind;
use crate::mapping::{ColumnRole, choices};
use crate::state::AppState;
use crate::ui::panels::open_file_dialog;

/// Loading tab: one picker per dataset, plus the collar column mapper.
pub fn loading_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Load and configure data");
    ui.separator();

    ui.columns(2, |cols: &mut [Ui]| {
        file_picker(&mut cols[0], state, DatasetKind::Collars);
        column_mapper(&mut cols[0], state);
        cols[0].add_space(12.0);
        file_picker(&mut cols[0], state, DatasetKind::Survey);

        file_picker(&mut cols[1], state, DatasetKind::Lithology);
        cols[1].add_space(12.0);
        file_picker(&mut cols[1], state, DatasetKind::Assays);
    });
}

fn file_picker(ui: &mut Ui, state: &mut AppState, kind: DatasetKind) {
    ui.strong(kind.title());
    ui.horizontal(|ui: &mut Ui| {
        if ui.button(format!("{} file…", kind.title())).clicked() {
            open_file_dialog(state, kind);
        }
        if let Some(ds) = state.dataset(kind) {
            ui.label(format!("{} rows loaded", ds.len()));
        }
    });
}

/// One combo box per role, listing exactly the current collars columns.
fn column_mapper(ui: &mut Ui, state: &mut AppState) {
    let Some(collars) = state.dataset(DatasetKind::Collars) else {
        return;
    };
    let columns = choices(collars);

    egui::Grid::new("column_mapper")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            for role in ColumnRole::ALL {
                ui.label(format!("{} column", role.label()));
                let current = state.mapping().get(role).unwrap_or_default().to_string();
                let mut picked: Option<String> = None;
                egui::ComboBox::from_id_salt(("mapping", role))
                    .selected_text(&current)
                    .show_ui(ui, |ui: &mut Ui| {
                        for col in &columns {
                            if ui.selectable_label(current == *col, col).clicked() {
                                picked = Some(col.clone());
                            }
                        }
                    });
                if let Some(col) = picked {
                    if let Err(e) = state.set_mapping(role, &col) {
                        state.report_error(&e.into());
                    }
                }
                ui.end_row();
            }
        });
}
