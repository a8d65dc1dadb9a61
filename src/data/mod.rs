//! Read-only data views consumed by plots.
//!
//! The core never owns plotted data: a render pass borrows a [`DataSource`]
//! and reads its named fields by index.

mod columns;
mod function;

pub use columns::ColumnDataSource;
pub use function::FunctionDataSource;

use crate::error::{PlotError, PlotResult};

/// Conventional field names used by the built-in plots.
pub mod fields {
    pub const X: &str = "x";
    pub const Y: &str = "y";
    pub const BAR_LOCATION: &str = "bar_location";
    pub const BAR_TIP: &str = "bar_tip";
    pub const BAR_BASE: &str = "bar_base";
    pub const HIGH: &str = "high";
    pub const LOW: &str = "low";
    pub const LEFT: &str = "left";
    pub const RIGHT: &str = "right";
    pub const OPEN: &str = "open";
    pub const CLOSE: &str = "close";
}

/// Ordered records exposing numeric values per named field.
pub trait DataSource {
    /// Number of records. Fields shorter than this read as missing past
    /// their end, and NaN or infinite values read as missing.
    fn record_count(&self) -> usize;

    /// Borrowed column for `name`, or `None` when the field does not exist.
    fn field(&self, name: &str) -> Option<&[f64]>;
}

/// Column accessor resolved once per render pass.
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    values: &'a [f64],
}

impl<'a> FieldView<'a> {
    /// Value at `index`, or `None` when it is missing or not finite.
    #[must_use]
    pub fn get(self, index: usize) -> Option<f64> {
        self.values
            .get(index)
            .copied()
            .filter(|value| value.is_finite())
    }

    #[must_use]
    pub fn values(self) -> &'a [f64] {
        self.values
    }
}

/// Resolves a field, failing with [`PlotError::MissingField`] when absent.
pub fn require_field<'a>(source: &'a dyn DataSource, name: &str) -> PlotResult<FieldView<'a>> {
    source
        .field(name)
        .map(|values| FieldView { values })
        .ok_or_else(|| PlotError::MissingField {
            field: name.to_owned(),
        })
}

/// Resolves an optional field; absence is not an error.
#[must_use]
pub fn optional_field<'a>(source: &'a dyn DataSource, name: &str) -> Option<FieldView<'a>> {
    source.field(name).map(|values| FieldView { values })
}
