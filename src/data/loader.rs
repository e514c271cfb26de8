use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::DatasetKind;
use super::model::{CellValue, Column, DType, Dataset, dedupe_names};
use crate::error::DrillError;

/// Cell texts read as missing values, matching the usual dataframe defaults.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// FileSource – the bytes of one picked file
// ---------------------------------------------------------------------------

/// An input file held in memory: its display name and raw content.
#[derive(Debug, Clone)]
pub struct FileSource {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl FileSource {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, bytes })
    }
}

/// File formats the loader understands, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceFormat {
    Csv,
    Parquet,
    Json,
}

impl SourceFormat {
    fn of(name: &str) -> Result<Self, DrillError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "parquet" | "pq" => Ok(SourceFormat::Parquet),
            "json" => Ok(SourceFormat::Json),
            _ => Err(DrillError::UnsupportedFormat(ext)),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse a file into a [`Dataset`].  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – comma separated with a header row (the primary format)
/// * `.parquet` – any flat Parquet file
/// * `.json`    – `[{ "HOLE_ID": "DH01", "X": 100.0, ... }, ...]`
pub fn load_source(source: &FileSource) -> Result<Dataset> {
    match SourceFormat::of(&source.name)? {
        SourceFormat::Csv => parse_csv(&source.bytes),
        SourceFormat::Parquet => parse_parquet(&source.bytes),
        SourceFormat::Json => parse_json(&source.bytes),
    }
}

// ---------------------------------------------------------------------------
// Memoizing cache
// ---------------------------------------------------------------------------

/// Identity of a file's content: same name and same bytes share one parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SourceKey {
    name: String,
    len: usize,
    digest: u64,
}

impl SourceKey {
    fn of(source: &FileSource) -> Self {
        let mut hasher = DefaultHasher::new();
        source.bytes.hash(&mut hasher);
        Self {
            name: source.name.clone(),
            len: source.bytes.len(),
            digest: hasher.finish(),
        }
    }
}

/// Result of a [`LoaderCache::load`] call.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub dataset: Arc<Dataset>,
    /// True when the dataset came from the cache without parsing.
    pub cached: bool,
    pub elapsed: Duration,
}

/// Session memo of parsed files. Only files currently held by a dataset
/// slot are kept: replacing a slot's file drops the old parse.
#[derive(Debug, Default)]
pub struct LoaderCache {
    entries: HashMap<SourceKey, Arc<Dataset>>,
    slots: BTreeMap<DatasetKind, SourceKey>,
    parses: usize,
}

impl LoaderCache {
    /// Return the cached dataset for identical input, parsing on a miss,
    /// and record `source` as the file behind `slot`.
    /// Failed parses are not remembered and leave the slot unchanged.
    pub fn load(&mut self, slot: DatasetKind, source: &FileSource) -> Result<LoadOutcome> {
        let start = Instant::now();
        let key = SourceKey::of(source);

        let (dataset, cached) = match self.entries.get(&key) {
            Some(dataset) => {
                log::info!("Cache hit for {}", source.name);
                (Arc::clone(dataset), true)
            }
            None => {
                self.parses += 1;
                let dataset = Arc::new(
                    load_source(source).with_context(|| format!("loading {}", source.name))?,
                );
                self.entries.insert(key.clone(), Arc::clone(&dataset));
                (dataset, false)
            }
        };

        if let Some(previous) = self.slots.insert(slot, key) {
            self.evict_unused(&previous);
        }
        Ok(LoadOutcome {
            dataset,
            cached,
            elapsed: start.elapsed(),
        })
    }

    fn evict_unused(&mut self, key: &SourceKey) {
        if self.slots.values().any(|k| k == key) {
            return;
        }
        if self.entries.remove(key).is_some() {
            log::debug!("Evicted cached parse of {}", key.name);
        }
    }

    /// How many times a file was actually parsed.
    pub fn parse_count(&self) -> usize {
        self.parses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Short records are padded with nulls; a record longer than the header is
/// an error.
pub fn parse_csv(bytes: &[u8]) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
        return Err(DrillError::Parse("no columns to parse from file".into()).into());
    }
    let headers = dedupe_names(headers);

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| DrillError::Parse(format!("row {}: {e}", row_no + 1)))?;
        if record.len() > headers.len() {
            return Err(DrillError::Parse(format!(
                "row {}: expected {} fields, saw {}",
                row_no + 1,
                headers.len(),
                record.len()
            ))
            .into());
        }
        for (col_idx, cells) in raw.iter_mut().enumerate() {
            cells.push(record.get(col_idx).and_then(non_na));
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| infer_column(name, cells))
        .collect();
    Ok(Dataset::from_columns(columns)?)
}

fn non_na(s: &str) -> Option<String> {
    if NA_TOKENS.contains(&s) {
        None
    } else {
        Some(s.to_string())
    }
}

/// Infer one column's dtype from its raw cells and convert them.
///
/// * all non-null cells are integers → `int64` (`float64` if any null)
/// * all non-null cells are numbers → `float64`
/// * all non-null cells are booleans → `bool` (`object` if any null)
/// * otherwise → `object`, keeping the original text
/// * no non-null cells → `float64`, or `object` for a header-only file
pub fn infer_column(name: String, cells: Vec<Option<String>>) -> Column {
    let present: Vec<&str> = cells.iter().flatten().map(|s| s.trim()).collect();
    let has_null = present.len() < cells.len();

    if present.is_empty() {
        let dtype = if cells.is_empty() { DType::Object } else { DType::Float64 };
        let values = vec![CellValue::Null; cells.len()];
        return Column { name, dtype, values };
    }

    if present.iter().all(|s| s.parse::<i64>().is_ok()) {
        return if has_null {
            Column {
                name,
                dtype: DType::Float64,
                values: convert_cells(&cells, |s| CellValue::Float(s.parse::<i64>().map(|i| i as f64).unwrap_or(f64::NAN))),
            }
        } else {
            Column {
                name,
                dtype: DType::Int64,
                values: convert_cells(&cells, |s| s.parse::<i64>().map(CellValue::Int).unwrap_or(CellValue::Null)),
            }
        };
    }

    if present.iter().all(|s| s.parse::<f64>().is_ok()) {
        return Column {
            name,
            dtype: DType::Float64,
            values: convert_cells(&cells, |s| s.parse::<f64>().map(CellValue::Float).unwrap_or(CellValue::Null)),
        };
    }

    if !has_null && present.iter().all(|s| parse_bool(s).is_some()) {
        return Column {
            name,
            dtype: DType::Bool,
            values: convert_cells(&cells, |s| parse_bool(s).map(CellValue::Bool).unwrap_or(CellValue::Null)),
        };
    }

    let values = cells
        .into_iter()
        .map(|c| c.map(CellValue::Text).unwrap_or(CellValue::Null))
        .collect();
    Column {
        name,
        dtype: DType::Object,
        values,
    }
}

fn convert_cells(cells: &[Option<String>], f: impl Fn(&str) -> CellValue) -> Vec<CellValue> {
    cells
        .iter()
        .map(|c| match c {
            Some(s) => f(s.trim()),
            None => CellValue::Null,
        })
        .collect()
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "HOLE_ID": "DH01", "X": 100.0, "Y": 200.0, "Z": 50.0 },
///   ...
/// ]
/// ```
/// Column order follows first appearance; keys missing from a record are null.
fn parse_json(bytes: &[u8]) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_slice(bytes).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut names: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }

    let columns = names
        .into_iter()
        .map(|name| {
            let cells = records
                .iter()
                .map(|rec| rec.get(&name).and_then(json_to_text))
                .collect();
            infer_column(name, cells)
        })
        .collect();
    Ok(Dataset::from_columns(columns)?)
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => non_na(s),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file. Integer columns become `int64` (`float64` when
/// they hold nulls), floats `float64`, booleans `bool`; anything else is
/// rendered to text as an `object` column.
fn parse_parquet(data: &[u8]) -> Result<Dataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes::Bytes::copy_from_slice(data))
        .context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let names = dedupe_names(schema.fields().iter().map(|f| f.name().clone()).collect());
    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); names.len()];

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, col) in batch.columns().iter().enumerate() {
            append_arrow_cells(col.as_ref(), &mut cells[col_idx])
                .with_context(|| format!("decoding column '{}'", names[col_idx]))?;
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .zip(schema.fields().iter())
        .map(|((name, values), field)| arrow_column(name, field.data_type(), values))
        .collect();
    Ok(Dataset::from_columns(columns)?)
}

fn append_arrow_cells(col: &dyn Array, out: &mut Vec<CellValue>) -> Result<()> {
    let dt = col.data_type();
    if dt.is_integer() {
        let ints = cast(col, &DataType::Int64)?;
        let ints = ints.as_primitive::<Int64Type>();
        out.extend((0..ints.len()).map(|i| {
            if ints.is_null(i) { CellValue::Null } else { CellValue::Int(ints.value(i)) }
        }));
    } else if dt.is_floating() {
        let floats = cast(col, &DataType::Float64)?;
        let floats = floats.as_primitive::<Float64Type>();
        out.extend((0..floats.len()).map(|i| {
            if floats.is_null(i) || floats.value(i).is_nan() {
                CellValue::Null
            } else {
                CellValue::Float(floats.value(i))
            }
        }));
    } else if matches!(dt, DataType::Boolean) {
        let bools = col.as_boolean();
        out.extend((0..bools.len()).map(|i| {
            if bools.is_null(i) { CellValue::Null } else { CellValue::Bool(bools.value(i)) }
        }));
    } else {
        for i in 0..col.len() {
            if col.is_null(i) {
                out.push(CellValue::Null);
            } else {
                out.push(CellValue::Text(array_value_to_string(col, i)?));
            }
        }
    }
    Ok(())
}

fn arrow_column(name: String, dt: &DataType, values: Vec<CellValue>) -> Column {
    let has_null = values.iter().any(CellValue::is_null);
    if dt.is_integer() {
        if has_null {
            let values = values
                .into_iter()
                .map(|v| match v {
                    CellValue::Int(i) => CellValue::Float(i as f64),
                    other => other,
                })
                .collect();
            return Column { name, dtype: DType::Float64, values };
        }
        return Column { name, dtype: DType::Int64, values };
    }
    let dtype = if dt.is_floating() {
        DType::Float64
    } else if matches!(dt, DataType::Boolean) && !has_null {
        DType::Bool
    } else {
        DType::Object
    };
    Column { name, dtype, values }
}

/// Fail early on files whose extension we cannot read, before any I/O.
pub fn check_extension(name: &str) -> Result<()> {
    SourceFormat::of(name)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc as StdArc;

    use arrow::array::{BooleanArray, Float64Array, Int32Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const COLLARS: &str = "HOLE_ID,X,Y,Z\nDH01,100,200,50\n";

    #[test]
    fn parses_collars_with_inferred_types() {
        let ds = parse_csv(COLLARS.as_bytes()).unwrap();
        assert_eq!(ds.shape(), (1, 4));
        let dtypes = ds.dtypes();
        assert_eq!(dtypes[0], ("HOLE_ID".to_string(), DType::Object));
        assert_eq!(dtypes[1], ("X".to_string(), DType::Int64));
        assert_eq!(ds.column("X").unwrap().values[0], CellValue::Int(100));
    }

    #[test]
    fn integers_with_missing_values_become_floats() {
        let ds = parse_csv(b"a,b\n1,x\n,y\n3,NA\n").unwrap();
        let a = ds.column("a").unwrap();
        assert_eq!(a.dtype, DType::Float64);
        assert_eq!(a.values, vec![CellValue::Float(1.0), CellValue::Null, CellValue::Float(3.0)]);
        assert_eq!(ds.null_counts()["b"], 1);
        assert_eq!(ds.column("b").unwrap().dtype, DType::Object);
    }

    #[test]
    fn mixed_numbers_are_float_and_text_wins_over_numbers() {
        let ds = parse_csv(b"au,code\n0.5,1\n2,A7\n").unwrap();
        assert_eq!(ds.column("au").unwrap().dtype, DType::Float64);
        let code = ds.column("code").unwrap();
        assert_eq!(code.dtype, DType::Object);
        assert_eq!(code.values[0], CellValue::Text("1".into()));
    }

    #[test]
    fn booleans_are_detected() {
        let ds = parse_csv(b"ok\nTrue\nfalse\n").unwrap();
        let ok = ds.column("ok").unwrap();
        assert_eq!(ok.dtype, DType::Bool);
        assert_eq!(ok.values, vec![CellValue::Bool(true), CellValue::Bool(false)]);
    }

    #[test]
    fn header_only_file_has_no_numeric_columns() {
        let ds = parse_csv(b"HOLE_ID,FROM,TO,AU\n").unwrap();
        assert_eq!(ds.shape(), (0, 4));
        assert!(ds.numeric_columns().is_empty());
    }

    #[test]
    fn empty_file_is_a_parse_error() {
        assert!(parse_csv(b"").is_err());
    }

    #[test]
    fn short_rows_are_padded_with_nulls() {
        let ds = parse_csv(b"HOLE_ID,FROM,TO,AU\nDH01,0,1,0.5\nDH01,1,2\n").unwrap();
        assert_eq!(ds.shape(), (2, 4));
        let au = ds.column("AU").unwrap();
        assert_eq!(au.dtype, DType::Float64);
        assert_eq!(au.values, vec![CellValue::Float(0.5), CellValue::Null]);
        assert_eq!(ds.column("TO").unwrap().dtype, DType::Int64);
    }

    #[test]
    fn long_rows_are_a_parse_error() {
        let err = parse_csv(b"a,b\n1,2\n3,4,5\n").unwrap_err();
        assert_eq!(
            err.downcast_ref::<DrillError>(),
            Some(&DrillError::Parse("row 2: expected 2 fields, saw 3".into()))
        );
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let src = FileSource::new("collars.xlsx", COLLARS);
        let err = load_source(&src).unwrap_err();
        assert_eq!(
            err.downcast_ref::<DrillError>(),
            Some(&DrillError::UnsupportedFormat("xlsx".into()))
        );
        assert_eq!(
            check_extension("collars.xlsx").unwrap_err().downcast_ref::<DrillError>(),
            Some(&DrillError::UnsupportedFormat("xlsx".into()))
        );
        assert!(check_extension("collars.CSV").is_ok());
        assert!(check_extension("assays.pq").is_ok());
    }

    #[test]
    fn identical_input_is_parsed_once() {
        let mut cache = LoaderCache::default();
        let src = FileSource::new("collars.csv", COLLARS);

        let first = cache.load(DatasetKind::Collars, &src).unwrap();
        let second = cache.load(DatasetKind::Collars, &src.clone()).unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert!(StdArc::ptr_eq(&first.dataset, &second.dataset));
        assert_eq!(cache.parse_count(), 1);

        cache.load(DatasetKind::Survey, &src).unwrap();
        assert_eq!(cache.parse_count(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn replacing_a_slot_evicts_the_old_parse() {
        let mut cache = LoaderCache::default();
        let v1 = FileSource::new("collars.csv", COLLARS);
        let v2 = FileSource::new("collars.csv", "HOLE_ID,X,Y,Z\nDH02,1,2,3\n");

        cache.load(DatasetKind::Collars, &v1).unwrap();
        cache.load(DatasetKind::Survey, &v1).unwrap();
        cache.load(DatasetKind::Collars, &v2).unwrap();
        assert_eq!(cache.len(), 2);

        cache.load(DatasetKind::Survey, &v2).unwrap();
        assert_eq!(cache.len(), 1);
        assert!(cache.load(DatasetKind::Survey, &v2).unwrap().cached);
        assert!(!cache.load(DatasetKind::Survey, &v1).unwrap().cached);
        assert_eq!(cache.parse_count(), 3);
    }

    #[test]
    fn failed_parses_are_not_cached() {
        let mut cache = LoaderCache::default();
        let good = FileSource::new("collars.csv", COLLARS);
        cache.load(DatasetKind::Collars, &good).unwrap();

        let src = FileSource::new("bad.csv", "a,b\n1,2,3\n");
        assert!(cache.load(DatasetKind::Collars, &src).is_err());
        assert!(cache.load(DatasetKind::Collars, &src).is_err());
        assert_eq!(cache.parse_count(), 3);
        assert_eq!(cache.len(), 1);
        assert!(cache.load(DatasetKind::Collars, &good).unwrap().cached);
    }

    #[test]
    fn empty_cache_reports_empty() {
        let mut cache = LoaderCache::default();
        assert!(cache.is_empty());
        let src = FileSource::new("bad.csv", "a,b\n1,2,3\n");
        assert!(cache.load(DatasetKind::Collars, &src).is_err());
        assert_eq!(cache.parse_count(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn reads_files_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("collars.csv");
        std::fs::write(&path, COLLARS).unwrap();

        let src = FileSource::read(&path).unwrap();
        assert_eq!(src.name, "collars.csv");
        assert_eq!(load_source(&src).unwrap().len(), 1);
    }

    #[test]
    fn json_records_are_loaded() {
        let json = r#"[{"HOLE_ID":"DH01","X":100.5,"Y":200},{"HOLE_ID":"DH02","Y":201}]"#;
        let ds = load_source(&FileSource::new("collars.json", json)).unwrap();
        assert_eq!(ds.column_names(), vec!["HOLE_ID", "X", "Y"]);
        assert_eq!(ds.column("X").unwrap().values[1], CellValue::Null);
        assert_eq!(ds.column("Y").unwrap().dtype, DType::Int64);
    }

    #[test]
    fn parquet_files_are_loaded() {
        let schema = StdArc::new(Schema::new(vec![
            Field::new("HOLE_ID", DataType::Utf8, false),
            Field::new("DEPTH", DataType::Int32, true),
            Field::new("AU", DataType::Float64, false),
            Field::new("QC", DataType::Boolean, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                StdArc::new(StringArray::from(vec!["DH01", "DH02"])),
                StdArc::new(Int32Array::from(vec![Some(10), None])),
                StdArc::new(Float64Array::from(vec![0.5, 1.25])),
                StdArc::new(BooleanArray::from(vec![true, false])),
            ],
        )
        .unwrap();

        let mut buf = Vec::new();
        let mut writer = ArrowWriter::try_new(&mut buf, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_source(&FileSource::new("assays.parquet", buf)).unwrap();
        assert_eq!(ds.shape(), (2, 4));
        let depth = ds.column("DEPTH").unwrap();
        assert_eq!(depth.dtype, DType::Float64);
        assert_eq!(depth.values[0], CellValue::Float(10.0));
        assert_eq!(ds.column("HOLE_ID").unwrap().values[1], CellValue::Text("DH02".into()));
        assert_eq!(ds.column("QC").unwrap().dtype, DType::Bool);
        assert_eq!(ds.numeric_columns(), vec!["DEPTH", "AU"]);
    }
}
