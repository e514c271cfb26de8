/// Data layer: core types, loading, export and statistics.
///
/// Architecture:
/// ```text
///  .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → Dataset (memoized per file content)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  named columns, inferred dtypes
///   └──────────┘
///     │     │     │
///     ▼     ▼     ▼
///  export stats collars   CSV download · describe/histogram · 3D points
/// ```

pub mod collars;
pub mod export;
pub mod loader;
pub mod model;
pub mod stats;

/// The four dataset slots of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatasetKind {
    Collars,
    Survey,
    Lithology,
    Assays,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::Collars,
        DatasetKind::Survey,
        DatasetKind::Lithology,
        DatasetKind::Assays,
    ];

    /// Lowercase name used for exports.
    pub fn name(self) -> &'static str {
        match self {
            DatasetKind::Collars => "collars",
            DatasetKind::Survey => "survey",
            DatasetKind::Lithology => "lithology",
            DatasetKind::Assays => "assays",
        }
    }

    /// Capitalised name for headings.
    pub fn title(self) -> &'static str {
        match self {
            DatasetKind::Collars => "Collars",
            DatasetKind::Survey => "Survey",
            DatasetKind::Lithology => "Lithology",
            DatasetKind::Assays => "Assays",
        }
    }
}
