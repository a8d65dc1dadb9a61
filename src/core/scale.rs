use serde::{Deserialize, Serialize};

use crate::core::PlotRange;
use crate::error::{PlotError, PlotResult};

/// Transform applied between data units and normalized plot units on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    /// Affine mapping.
    #[default]
    Linear,
    /// Uniform spacing in base-10 log units (range must be strictly positive).
    Log,
    /// `sign(v) * log10(|v| + 1)`; defined for every finite value.
    LogModulus,
}

impl ScaleType {
    /// Maps a data value into the transformed domain.
    #[must_use]
    pub fn forward(self, value: f64) -> f64 {
        match self {
            Self::Linear => value,
            Self::Log => value.log10(),
            Self::LogModulus => value.signum() * (value.abs() + 1.0).log10(),
        }
    }

    /// Maps a transformed-domain value back into data units.
    #[must_use]
    pub fn inverse(self, transformed: f64) -> f64 {
        match self {
            Self::Linear => transformed,
            Self::Log => 10f64.powf(transformed),
            Self::LogModulus => transformed.signum() * (10f64.powf(transformed.abs()) - 1.0),
        }
    }

    pub fn validate_range(self, range: PlotRange) -> PlotResult<()> {
        if self == Self::Log && range.min() <= 0.0 {
            return Err(PlotError::InvalidData(format!(
                "log scale requires a strictly positive range, got [{}, {}]",
                range.min(),
                range.max()
            )));
        }
        Ok(())
    }

    /// Maps an in-range data value to `[0, 1]`.
    ///
    /// A degenerate range maps everything to `0.5`.
    #[must_use]
    pub fn normalize(self, range: PlotRange, value: f64) -> f64 {
        let start = self.forward(range.min());
        let end = self.forward(range.max());
        let span = end - start;
        if span == 0.0 {
            return 0.5;
        }
        (self.forward(value) - start) / span
    }

    /// Maps a normalized value back into data units.
    #[must_use]
    pub fn denormalize(self, range: PlotRange, normalized: f64) -> f64 {
        if range.is_degenerate() {
            return range.min();
        }
        let start = self.forward(range.min());
        let end = self.forward(range.max());
        let value = self.inverse(start + normalized * (end - start));
        // Pin the edges so round trips land exactly on the bounds.
        if normalized == 0.0 {
            range.min()
        } else if normalized == 1.0 {
            range.max()
        } else {
            value
        }
    }

    /// Returns the range covering `[start, end]` in the transformed domain.
    pub fn range_from_transformed(self, start: f64, end: f64) -> PlotResult<PlotRange> {
        PlotRange::new(self.inverse(start), self.inverse(end))
    }
}
