use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Plot};

use crate::data::DatasetKind;
use crate::data::stats::{Describe, Histogram};
use crate::state::AppState;

/// Statistics tab: describe + histogram of one numeric assays column.
pub fn statistics_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Statistical analysis");
    ui.separator();

    if state.dataset(DatasetKind::Assays).is_none() {
        ui.label("Load an assays file to compute statistics.");
        return;
    }

    let numeric = state.numeric_assay_columns();
    if numeric.is_empty() {
        ui.label("The assays data has no numeric column to analyse.");
        return;
    }

    let current = state.stats_column().unwrap_or_default().to_string();
    let mut picked: Option<String> = None;
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Column");
        egui::ComboBox::from_id_salt("stats_column")
            .selected_text(&current)
            .show_ui(ui, |ui: &mut Ui| {
                for col in &numeric {
                    if ui.selectable_label(current == *col, col).clicked() {
                        picked = Some(col.clone());
                    }
                }
            });
    });
    if let Some(col) = picked {
        if let Err(e) = state.set_stats_column(&col) {
            state.report_error(&e.into());
        }
    }

    let (summary, hist) = match state.selected_statistics() {
        Some(Ok(result)) => result,
        Some(Err(e)) => {
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
            return;
        }
        None => return,
    };
    let column = state.stats_column().unwrap_or_default().to_string();

    ui.columns(2, |cols: &mut [Ui]| {
        describe_table(&mut cols[0], &summary);
        histogram_plot(&mut cols[1], &column, &hist);
    });
}

fn describe_table(ui: &mut Ui, summary: &Describe) {
    ui.strong("Descriptive statistics");
    egui::Grid::new("describe")
        .striped(true)
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            for (label, value) in summary.rows() {
                ui.label(label);
                let text = match value {
                    Some(v) if label == "count" => format!("{v}"),
                    Some(v) => format!("{v:.6}"),
                    None => "NaN".to_string(),
                };
                ui.monospace(text);
                ui.end_row();
            }
        });

    if ui.small_button("Copy as JSON").clicked() {
        match serde_json::to_string_pretty(summary) {
            Ok(json) => ui.ctx().copy_text(json),
            Err(e) => log::error!("Failed to serialize statistics: {e}"),
        }
    }
}

fn histogram_plot(ui: &mut Ui, column: &str, hist: &Histogram) {
    ui.strong(format!("Distribution of {column}"));
    ui.weak(format!(
        "{} values in {} bins of width {:.4}",
        hist.total(),
        hist.bin_count(),
        hist.bin_width()
    ));
    if hist.skipped > 0 {
        ui.label(
            RichText::new(format!("{} infinite values not shown", hist.skipped))
                .color(Color32::ORANGE),
        );
    }
    let width = hist.bin_width();
    let bars: Vec<Bar> = hist
        .bars()
        .into_iter()
        .map(|(center, count)| Bar::new(center, count as f64).width(width))
        .collect();

    Plot::new("histogram")
        .x_axis_label(column.to_string())
        .y_axis_label("Frequency")
        .height(360.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(column).color(Color32::LIGHT_BLUE));
        });
}
