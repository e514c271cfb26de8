use std::path::Path;

use anyhow::{Context, Result};

use super::model::Dataset;

/// Serialize a dataset back to CSV: header row, no index column,
/// nulls as empty fields.
pub fn to_csv(dataset: &Dataset) -> Result<String> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(dataset.columns().iter().map(|c| c.name.as_str()))
        .context("writing CSV header")?;
    for i in 0..dataset.len() {
        let row = dataset.row(i);
        writer
            .write_record(row.iter().map(|v| v.to_string()))
            .with_context(|| format!("writing CSV row {i}"))?;
    }
    writer.flush().context("flushing CSV writer")?;
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("finishing CSV output: {e}"))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

/// Default download name for a dataset.
pub fn export_file_name(dataset_name: &str) -> String {
    format!("{dataset_name}.csv")
}

/// Write the CSV export of `dataset` to `path`.
pub fn export_to_path(dataset: &Dataset, path: &Path) -> Result<()> {
    let csv = to_csv(dataset)?;
    std::fs::write(path, csv).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Exported {} rows to {}", dataset.len(), path.display());
    Ok(())
}
