use super::model::{CellValue, Dataset};
use crate::error::DrillError;
use crate::mapping::{ColumnMapping, ColumnRole};

/// Trace name shown in the 3D legend.
pub const TRACE_NAME: &str = "Collars";

/// One drill-hole collar in world coordinates (east, north, elevation).
#[derive(Debug, Clone, PartialEq)]
pub struct CollarPoint {
    pub hole_id: Option<String>,
    pub position: [f64; 3],
}

/// Collar positions extracted through the column mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct CollarCloud {
    pub name: &'static str,
    pub points: Vec<CollarPoint>,
    /// Rows dropped because a coordinate was null.
    pub skipped: usize,
}

impl CollarCloud {
    /// Build the cloud. Both collars and survey must be loaded; survey is
    /// only checked for presence.
    pub fn build(
        collars: Option<&Dataset>,
        survey: Option<&Dataset>,
        mapping: &ColumnMapping,
    ) -> Result<Self, DrillError> {
        let (Some(collars), Some(_survey)) = (collars, survey) else {
            return Err(DrillError::MissingDatasets);
        };

        let east = collars.column(mapping.get(ColumnRole::East)?)?;
        let north = collars.column(mapping.get(ColumnRole::North)?)?;
        let elev = collars.column(mapping.get(ColumnRole::Elevation)?)?;
        for col in [east, north, elev] {
            if !col.dtype.is_numeric() {
                return Err(DrillError::NotNumeric(col.name.clone()));
            }
        }

        let ids = mapping
            .get(ColumnRole::HoleId)
            .ok()
            .and_then(|name| collars.column(name).ok());

        let mut points = Vec::with_capacity(collars.len());
        let mut skipped = 0;
        for i in 0..collars.len() {
            let coords = (
                east.values[i].as_f64(),
                north.values[i].as_f64(),
                elev.values[i].as_f64(),
            );
            let (Some(x), Some(y), Some(z)) = coords else {
                skipped += 1;
                continue;
            };
            let hole_id = ids
                .map(|c| &c.values[i])
                .filter(|v| !matches!(v, CellValue::Null))
                .map(|v| v.to_string());
            points.push(CollarPoint {
                hole_id,
                position: [x, y, z],
            });
        }

        if skipped > 0 {
            log::warn!("Skipped {skipped} collar rows with missing coordinates");
        }

        Ok(CollarCloud {
            name: TRACE_NAME,
            points,
            skipped,
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Per-axis (min, max) over all points, `None` when empty.
    pub fn bounds(&self) -> Option<[(f64, f64); 3]> {
        let first = self.points.first()?.position;
        let mut b = first.map(|v| (v, v));
        for p in &self.points {
            for (axis, v) in p.position.iter().enumerate() {
                b[axis].0 = b[axis].0.min(*v);
                b[axis].1 = b[axis].1.max(*v);
            }
        }
        Some(b)
    }
}
