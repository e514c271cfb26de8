use std::collections::BTreeMap;
use std::fmt;

use crate::error::DrillError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a dataset column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the common dataframe dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    /// Interpret the value as an `f64` for statistics and plotting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(v) => f.write_str(&format_float(*v)),
            CellValue::Bool(true) => f.write_str("True"),
            CellValue::Bool(false) => f.write_str("False"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// Shortest representation that parses back to the same `f64`.
/// Integral values keep a trailing `.0` so they are not re-read as integers.
pub fn format_float(v: f64) -> String {
    let s = v.to_string();
    if v.is_finite() && !s.contains('.') {
        format!("{s}.0")
    } else {
        s
    }
}

// ---------------------------------------------------------------------------
// DType – the inferred type of a whole column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Int64,
    Float64,
    Bool,
    Object,
}

impl DType {
    pub fn is_numeric(self) -> bool {
        matches!(self, DType::Int64 | DType::Float64)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Int64 => "int64",
            DType::Float64 => "float64",
            DType::Bool => "bool",
            DType::Object => "object",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Column / Dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub dtype: DType,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }
}

/// A rows × named-columns table held in memory for the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Dataset {
    /// Assemble a dataset, checking that every column has the same length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, DrillError> {
        let n_rows = columns.first().map(|c| c.values.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.values.len() != n_rows) {
            return Err(DrillError::Parse(format!(
                "column '{}' has {} values, expected {n_rows}",
                bad.name,
                bad.values.len()
            )));
        }
        Ok(Dataset { columns, n_rows })
    }

    /// (row count, column count)
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }

    pub fn len(&self) -> usize {
        self.n_rows
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&Column, DrillError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DrillError::UnknownColumn(name.to_string()))
    }

    /// Cells of row `i` in column order.
    pub fn row(&self, i: usize) -> Vec<&CellValue> {
        self.columns.iter().map(|c| &c.values[i]).collect()
    }

    /// The first `n` rows (fewer when the dataset is shorter).
    pub fn head(&self, n: usize) -> Vec<Vec<&CellValue>> {
        (0..n.min(self.n_rows)).map(|i| self.row(i)).collect()
    }

    pub fn dtypes(&self) -> Vec<(String, DType)> {
        self.columns.iter().map(|c| (c.name.clone(), c.dtype)).collect()
    }

    pub fn null_counts(&self) -> BTreeMap<String, usize> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.null_count()))
            .collect()
    }

    /// Names of int64 / float64 columns, in column order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.dtype.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Non-null values of a numeric column.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<f64>, DrillError> {
        let col = self.column(name)?;
        if !col.dtype.is_numeric() {
            return Err(DrillError::NotNumeric(name.to_string()));
        }
        Ok(col.values.iter().filter_map(CellValue::as_f64).collect())
    }
}

/// Make header names unique the way dataframe readers do: `X`, `X.1`, `X.2`.
pub fn dedupe_names(names: Vec<String>) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = name.clone();
        while out.contains(&candidate) {
            let n = seen.entry(name.clone()).or_insert(0);
            *n += 1;
            candidate = format!("{name}.{n}");
        }
        out.push(candidate);
    }
    out
}
