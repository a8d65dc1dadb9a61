use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::DataSource;
use crate::core::DataPoint;

/// In-memory data source storing one column per field in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnDataSource {
    columns: IndexMap<String, Vec<f64>>,
}

impl ColumnDataSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds `x`/`y` columns from points.
    #[must_use]
    pub fn from_points(points: &[DataPoint]) -> Self {
        Self::new()
            .with_field(super::fields::X, points.iter().map(|point| point.x).collect())
            .with_field(super::fields::Y, points.iter().map(|point| point.y).collect())
    }

    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.set_field(name, values);
        self
    }

    /// Inserts or replaces a column. Replaced columns keep their position.
    pub fn set_field(&mut self, name: impl Into<String>, values: Vec<f64>) {
        let name = name.into();
        debug!(field = %name, len = values.len(), "set data source field");
        self.columns.insert(name, values);
    }

    pub fn remove_field(&mut self, name: &str) -> Option<Vec<f64>> {
        self.columns.shift_remove(name)
    }

    /// Field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }
}

impl DataSource for ColumnDataSource {
    fn record_count(&self) -> usize {
        self.columns.values().map(Vec::len).max().unwrap_or(0)
    }

    fn field(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }
}
