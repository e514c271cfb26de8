use std::collections::BTreeMap;
use std::fmt;

use crate::data::model::Dataset;
use crate::error::DrillError;

// ---------------------------------------------------------------------------
// Semantic roles of collar columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnRole {
    HoleId,
    East,
    North,
    Elevation,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 4] = [
        ColumnRole::HoleId,
        ColumnRole::East,
        ColumnRole::North,
        ColumnRole::Elevation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ColumnRole::HoleId => "HOLE_ID",
            ColumnRole::East => "EAST",
            ColumnRole::North => "NORTH",
            ColumnRole::Elevation => "ELEVATION",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// ColumnMapping – role → collars column name
// ---------------------------------------------------------------------------

/// Which collars column plays each role. Entries always name a column of
/// the collars dataset they were validated against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    selected: BTreeMap<ColumnRole, String>,
}

impl ColumnMapping {
    pub fn get(&self, role: ColumnRole) -> Result<&str, DrillError> {
        self.selected
            .get(&role)
            .map(String::as_str)
            .ok_or(DrillError::MissingMapping(role))
    }

    /// Select `column` for `role`, rejecting names absent from `collars`.
    pub fn set(&mut self, role: ColumnRole, column: &str, collars: &Dataset) -> Result<(), DrillError> {
        if !collars.has_column(column) {
            log::warn!("Rejected {role} mapping to missing column '{column}'");
            return Err(DrillError::StaleColumn {
                column: column.to_string(),
            });
        }
        self.selected.insert(role, column.to_string());
        Ok(())
    }

    /// Bring the mapping in line with a (new) collars dataset: selections
    /// that still exist are kept, stale or unset roles fall back to the
    /// first column.
    pub fn reconcile(&mut self, collars: &Dataset) {
        let Some(first) = collars.columns().first().map(|c| c.name.clone()) else {
            self.selected.clear();
            return;
        };
        for role in ColumnRole::ALL {
            let keep = self
                .selected
                .get(&role)
                .is_some_and(|col| collars.has_column(col));
            if !keep {
                if let Some(stale) = self.selected.get(&role) {
                    log::warn!("Mapping {role} -> '{stale}' no longer valid, resetting to '{first}'");
                }
                self.selected.insert(role, first.clone());
            }
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }
}

/// The choices offered for every role: the collars columns, in order.
pub fn choices(collars: &Dataset) -> Vec<String> {
    collars.column_names()
}
