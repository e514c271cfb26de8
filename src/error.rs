use thiserror::Error;

use crate::mapping::ColumnRole;

/// Domain errors surfaced to the UI status line.
///
/// Loader and I/O paths wrap these in `anyhow` with extra context; the
/// mapping, statistics and 3D paths return them directly so callers can
/// match on the variant.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DrillError {
    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("CSV parse error: {0}")]
    Parse(String),

    #[error("Load both Collars and Survey data to enable the 3D view")]
    MissingDatasets,

    #[error("No column mapped for {}", .0.label())]
    MissingMapping(ColumnRole),

    #[error("Column '{column}' is not part of the current collars data")]
    StaleColumn { column: String },

    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),
}
