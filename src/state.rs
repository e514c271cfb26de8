use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::config::ViewerConfig;
use crate::data::DatasetKind;
use crate::data::collars::CollarCloud;
use crate::data::loader::{FileSource, LoaderCache};
use crate::data::model::Dataset;
use crate::data::stats::{Describe, Histogram, describe, histogram};
use crate::error::DrillError;
use crate::mapping::{ColumnMapping, ColumnRole};
use crate::camera::OrbitCamera;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Loading,
    Preview,
    Statistics,
    Scene,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Loading, Tab::Preview, Tab::Statistics, Tab::Scene];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Loading => "Loading",
            Tab::Preview => "Preview",
            Tab::Statistics => "Statistics",
            Tab::Scene => "3D Visualization",
        }
    }
}

/// What the most recent load did, shown in the side panel.
#[derive(Debug, Clone)]
pub struct LastLoad {
    pub kind: DatasetKind,
    pub file_name: String,
    pub shape: (usize, usize),
    pub elapsed: Duration,
    pub cached: bool,
}

/// The full session state, independent of rendering.
///
/// Datasets and the column mapping only change through the named setters
/// below; a failed operation leaves them untouched.
pub struct AppState {
    pub config: ViewerConfig,

    /// Loaded datasets (absent until the user loads a file).
    datasets: BTreeMap<DatasetKind, Arc<Dataset>>,

    /// Collars column chosen for each role.
    mapping: ColumnMapping,

    /// Parsed files, reused when the same content is loaded again.
    cache: LoaderCache,

    pub active_tab: Tab,

    /// Assays column shown in the Statistics tab.
    stats_column: Option<String>,

    pub camera: OrbitCamera,

    pub last_load: Option<LastLoad>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl AppState {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            datasets: BTreeMap::new(),
            mapping: ColumnMapping::default(),
            cache: LoaderCache::default(),
            active_tab: Tab::Loading,
            stats_column: None,
            camera: OrbitCamera::default(),
            last_load: None,
            status_message: None,
        }
    }

    pub fn dataset(&self, kind: DatasetKind) -> Option<&Dataset> {
        self.datasets.get(&kind).map(Arc::as_ref)
    }

    /// Loaded datasets in display order.
    pub fn loaded(&self) -> impl Iterator<Item = (DatasetKind, &Dataset)> {
        self.datasets.iter().map(|(k, d)| (*k, d.as_ref()))
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn cache(&self) -> &LoaderCache {
        &self.cache
    }

    /// Parse (or reuse) `source` and store it in the `kind` slot.
    pub fn load(&mut self, kind: DatasetKind, source: &FileSource) -> Result<()> {
        let outcome = self.cache.load(kind, source)?;
        log::info!(
            "Loaded {} as {} ({} rows × {} columns{})",
            source.name,
            kind.name(),
            outcome.dataset.len(),
            outcome.dataset.shape().1,
            if outcome.cached { ", cached" } else { "" }
        );
        self.last_load = Some(LastLoad {
            kind,
            file_name: source.name.clone(),
            shape: outcome.dataset.shape(),
            elapsed: outcome.elapsed,
            cached: outcome.cached,
        });
        self.set_dataset(kind, outcome.dataset);
        Ok(())
    }

    /// Replace the dataset in `kind`, keeping dependent selections valid.
    pub fn set_dataset(&mut self, kind: DatasetKind, dataset: Arc<Dataset>) {
        self.datasets.insert(kind, dataset);
        match kind {
            DatasetKind::Collars => self.reconcile_mapping(),
            DatasetKind::Assays => self.reconcile_stats_column(),
            DatasetKind::Survey | DatasetKind::Lithology => {}
        }
        self.status_message = None;
    }

    /// Map `role` to a column of the current collars dataset.
    pub fn set_mapping(&mut self, role: ColumnRole, column: &str) -> Result<(), DrillError> {
        let Some(collars) = self.datasets.get(&DatasetKind::Collars) else {
            return Err(DrillError::StaleColumn {
                column: column.to_string(),
            });
        };
        self.mapping.set(role, column, collars)
    }

    fn reconcile_mapping(&mut self) {
        match self.datasets.get(&DatasetKind::Collars) {
            Some(collars) => self.mapping.reconcile(collars),
            None => self.mapping.clear(),
        }
    }

    // ---- statistics ----

    /// Numeric columns of assays (empty when assays is not loaded).
    pub fn numeric_assay_columns(&self) -> Vec<String> {
        self.dataset(DatasetKind::Assays)
            .map(Dataset::numeric_columns)
            .unwrap_or_default()
    }

    pub fn stats_column(&self) -> Option<&str> {
        self.stats_column.as_deref()
    }

    /// Select the assays column to analyse. Only numeric columns are accepted.
    pub fn set_stats_column(&mut self, column: &str) -> Result<(), DrillError> {
        let assays = self
            .dataset(DatasetKind::Assays)
            .ok_or_else(|| DrillError::UnknownColumn(column.to_string()))?;
        if !assays.column(column)?.dtype.is_numeric() {
            return Err(DrillError::NotNumeric(column.to_string()));
        }
        self.stats_column = Some(column.to_string());
        Ok(())
    }

    fn reconcile_stats_column(&mut self) {
        let numeric = self.numeric_assay_columns();
        let valid = self
            .stats_column
            .as_ref()
            .is_some_and(|c| numeric.contains(c));
        if !valid {
            self.stats_column = numeric.into_iter().next();
        }
    }

    /// Descriptive statistics and histogram of the selected assays column.
    pub fn selected_statistics(&self) -> Option<Result<(Describe, Histogram), DrillError>> {
        let column = self.stats_column.as_deref()?;
        let assays = self.dataset(DatasetKind::Assays)?;
        Some(
            assays
                .numeric_values(column)
                .map(|values| {
                    let hist = histogram(&values, self.config.max_histogram_bins);
                    (describe(&values), hist)
                }),
        )
    }

    // ---- 3D ----

    pub fn collar_cloud(&self) -> Result<CollarCloud, DrillError> {
        CollarCloud::build(
            self.dataset(DatasetKind::Collars),
            self.dataset(DatasetKind::Survey),
            &self.mapping,
        )
    }

    // ---- shell ----

    /// Restart the render pass: selections are re-validated against the
    /// current datasets and the camera is reset. Datasets and the cache stay.
    pub fn refresh(&mut self) {
        self.reconcile_mapping();
        self.reconcile_stats_column();
        self.camera = OrbitCamera::default();
        self.status_message = None;
        log::info!("Refreshed view ({} datasets loaded)", self.datasets.len());
    }

    /// Record a failure for the status line.
    pub fn report_error(&mut self, err: &anyhow::Error) {
        self.status_message = Some(format!("Error: {err:#}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLARS: &str = "HOLE_ID,X,Y,Z\nDH01,100,200,50\n";
    const SURVEY: &str = "HOLE_ID,DEPTH,AZIMUTH,DIP\nDH01,0,90,-60\nDH01,50,92,-58\n";

    fn loaded(kinds: &[(DatasetKind, &str, &str)]) -> AppState {
        let mut state = AppState::default();
        for (kind, name, text) in kinds {
            state.load(*kind, &FileSource::new(*name, *text)).unwrap();
        }
        state
    }

    #[test]
    fn collars_to_single_point() {
        let mut state = loaded(&[
            (DatasetKind::Collars, "collars.csv", COLLARS),
            (DatasetKind::Survey, "survey.csv", SURVEY),
        ]);
        state.set_mapping(ColumnRole::East, "X").unwrap();
        state.set_mapping(ColumnRole::North, "Y").unwrap();
        state.set_mapping(ColumnRole::Elevation, "Z").unwrap();

        let cloud = state.collar_cloud().unwrap();
        assert_eq!(cloud.name, "Collars");
        assert_eq!(cloud.points.len(), 1);
        assert_eq!(cloud.points[0].position, [100.0, 200.0, 50.0]);
    }

    #[test]
    fn collars_alone_shows_the_warning_state() {
        let state = loaded(&[(DatasetKind::Collars, "collars.csv", COLLARS)]);
        assert_eq!(state.collar_cloud(), Err(DrillError::MissingDatasets));
    }

    #[test]
    fn loading_the_same_file_twice_parses_once() {
        let mut state = AppState::default();
        let src = FileSource::new("collars.csv", COLLARS);
        state.load(DatasetKind::Collars, &src).unwrap();
        state.load(DatasetKind::Collars, &src).unwrap();

        assert_eq!(state.cache().parse_count(), 1);
        assert!(state.last_load.as_ref().unwrap().cached);
    }

    #[test]
    fn text_only_assays_offer_no_statistics_column() {
        let state = loaded(&[(DatasetKind::Assays, "assays.csv", "HOLE_ID,SAMPLE\n")]);
        assert!(state.numeric_assay_columns().is_empty());
        assert_eq!(state.stats_column(), None);
        assert!(state.selected_statistics().is_none());
    }

    #[test]
    fn statistics_default_to_first_numeric_column() {
        let mut state = loaded(&[(
            DatasetKind::Assays,
            "assays.csv",
            "HOLE_ID,FROM,AU\nDH01,0,1\nDH01,1,2\nDH01,2,3\nDH01,3,4\nDH01,4,5\n",
        )]);
        assert_eq!(state.stats_column(), Some("FROM"));

        state.set_stats_column("AU").unwrap();
        let (d, h) = state.selected_statistics().unwrap().unwrap();
        assert_eq!(d.count, 5);
        assert_eq!(d.mean, Some(3.0));
        assert_eq!(d.q50, Some(3.0));
        assert_eq!(h.total(), 5);

        assert_eq!(
            state.set_stats_column("HOLE_ID"),
            Err(DrillError::NotNumeric("HOLE_ID".into()))
        );
        assert_eq!(state.stats_column(), Some("AU"));
    }

    #[test]
    fn infinite_assay_values_are_counted_but_not_binned() {
        let mut state = loaded(&[(
            DatasetKind::Assays,
            "assays.csv",
            "HOLE_ID,AU\nDH01,1\nDH01,2\nDH01,inf\n",
        )]);
        let (d, h) = state.selected_statistics().unwrap().unwrap();
        assert_eq!(d.count, 3);
        assert_eq!(h.total(), 2);
        assert_eq!(h.skipped, 1);

        state.config.max_histogram_bins = 1;
        let (_, h) = state.selected_statistics().unwrap().unwrap();
        assert_eq!(h.bin_count(), 1);
    }

    #[test]
    fn short_assay_rows_load_with_missing_values() {
        let state = loaded(&[(
            DatasetKind::Assays,
            "assays.csv",
            "HOLE_ID,FROM,TO,AU\nDH01,0,1,0.5\nDH01,1,2\n",
        )]);
        let (d, _) = state.selected_statistics().unwrap().unwrap();
        assert_eq!(state.dataset(DatasetKind::Assays).unwrap().shape(), (2, 4));
        assert_eq!(state.stats_column(), Some("FROM"));
        assert_eq!(d.count, 2);
        assert_eq!(state.dataset(DatasetKind::Assays).unwrap().null_counts()["AU"], 1);
    }

    #[test]
    fn stale_mapping_is_rejected_and_failed_load_keeps_state() {
        let mut state = loaded(&[(DatasetKind::Collars, "collars.csv", COLLARS)]);
        assert!(state.set_mapping(ColumnRole::East, "EASTING").is_err());

        let err = state
            .load(DatasetKind::Collars, &FileSource::new("broken.csv", "A,B\n1,2,3\n"))
            .unwrap_err();
        state.report_error(&err);

        assert!(state.status_message.as_deref().unwrap().contains("broken.csv"));
        assert_eq!(state.dataset(DatasetKind::Collars).unwrap().shape(), (1, 4));
        assert_eq!(state.mapping().get(ColumnRole::HoleId).unwrap(), "HOLE_ID");
    }

    #[test]
    fn mapping_without_collars_is_rejected() {
        let mut state = AppState::default();
        assert!(state.set_mapping(ColumnRole::East, "X").is_err());
        assert!(state.mapping().get(ColumnRole::East).is_err());
    }

    #[test]
    fn refresh_keeps_datasets_and_resets_camera() {
        let mut state = loaded(&[(DatasetKind::Survey, "survey.csv", SURVEY)]);
        state.camera.zoom = 3.0;
        state.refresh();
        assert!(state.dataset(DatasetKind::Survey).is_some());
        assert_eq!(state.camera, OrbitCamera::default());
        assert_eq!(state.loaded().count(), 1);
    }
}
