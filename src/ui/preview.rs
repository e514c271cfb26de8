use eframe::egui::{self, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::DatasetKind;
use crate::data::export::{export_file_name, export_to_path};
use crate::data::model::Dataset;
use crate::state::AppState;

/// Preview tab: head, export and column info for every loaded dataset.
pub fn preview_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Data preview");
    ui.separator();

    if state.loaded().next().is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let head_rows = state.config.preview_rows;
    let mut export_request: Option<DatasetKind> = None;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (kind, ds) in state.loaded() {
                ui.strong(kind.title());
                if ds.is_empty() {
                    ui.weak("(no rows)");
                }
                ui.push_id(kind.name(), |ui: &mut Ui| head_table(ui, ds, head_rows));

                if ui.button(format!("Download {}", export_file_name(kind.name()))).clicked() {
                    export_request = Some(kind);
                }

                egui::CollapsingHeader::new(format!("About {}", kind.name()))
                    .id_salt(("info", kind))
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| dataset_info(ui, kind, ds));

                ui.add_space(12.0);
            }
        });

    if let Some(kind) = export_request {
        save_dialog(state, kind);
    }
}

fn head_table(ui: &mut Ui, ds: &Dataset, n: usize) {
    let columns = ds.columns();
    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .columns(TableColumn::auto().at_least(60.0), columns.len())
            .header(20.0, |mut header| {
                for col in columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(&col.name);
                    });
                }
            })
            .body(|mut body| {
                for row in ds.head(n) {
                    body.row(18.0, |mut tr| {
                        for cell in row {
                            tr.col(|ui: &mut Ui| {
                                if cell.is_null() {
                                    ui.weak("NaN");
                                } else {
                                    ui.label(cell.to_string());
                                }
                            });
                        }
                    });
                }
            });
    });
}

fn dataset_info(ui: &mut Ui, kind: DatasetKind, ds: &Dataset) {
    let (rows, cols) = ds.shape();
    ui.label(format!("Shape: ({rows}, {cols})"));
    let nulls = ds.null_counts();

    egui::Grid::new(("dtypes", kind))
        .striped(true)
        .num_columns(3)
        .show(ui, |ui: &mut Ui| {
            ui.strong("column");
            ui.strong("dtype");
            ui.strong("missing");
            ui.end_row();
            for (name, dtype) in ds.dtypes() {
                ui.label(&name);
                ui.monospace(dtype.to_string());
                ui.label(nulls.get(&name).copied().unwrap_or(0).to_string());
                ui.end_row();
            }
        });
}

fn save_dialog(state: &mut AppState, kind: DatasetKind) {
    let Some(ds) = state.dataset(kind) else {
        return;
    };
    let target = rfd::FileDialog::new()
        .set_title(format!("Export {}", kind.name()))
        .add_filter("CSV", &["csv"])
        .set_file_name(export_file_name(kind.name()))
        .save_file();

    let Some(path) = target else {
        return;
    };
    if let Err(e) = export_to_path(ds, &path) {
        log::error!("Failed to export {}: {e:#}", kind.name());
        state.report_error(&e);
    }
}
