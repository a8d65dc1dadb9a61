use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};

/// Position of a value relative to a [`PlotRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeComparison {
    Below,
    Within,
    Above,
}

/// Closed interval `[min, max]` in data units.
///
/// Ranges are immutable; zooming or panning produces a new range that replaces
/// the old one wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotRange {
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct RawPlotRange {
    min: f64,
    max: f64,
}

impl<'de> Deserialize<'de> for PlotRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawPlotRange::deserialize(deserializer)?;
        Self::new(raw.min, raw.max).map_err(serde::de::Error::custom)
    }
}

impl PlotRange {
    /// Creates a range, failing when `min > max`, a bound is not finite, or
    /// the length `max - min` overflows.
    pub fn new(min: f64, max: f64) -> PlotResult<Self> {
        if !min.is_finite() || !max.is_finite() || min > max || !(max - min).is_finite() {
            return Err(PlotError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Smallest range covering every finite value, or `None` when there is none
    /// or its length overflows.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut extent: Option<(f64, f64)> = None;
        for value in values.into_iter().filter(|value| value.is_finite()) {
            extent = Some(match extent {
                Some((min, max)) => (min.min(value), max.max(value)),
                None => (value, value),
            });
        }
        extent.and_then(|(min, max)| Self::new(min, max).ok())
    }

    #[must_use]
    pub const fn min(self) -> f64 {
        self.min
    }

    #[must_use]
    pub const fn max(self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn midpoint(self) -> f64 {
        self.min + self.length() * 0.5
    }

    #[must_use]
    pub fn is_degenerate(self) -> bool {
        self.min == self.max
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    #[must_use]
    pub fn contains_range(self, other: Self) -> bool {
        other.min >= self.min && other.max <= self.max
    }

    /// Compares `value` against the range. NaN reports `Above`.
    #[must_use]
    pub fn compare(self, value: f64) -> RangeComparison {
        if value < self.min {
            RangeComparison::Below
        } else if value <= self.max {
            RangeComparison::Within
        } else {
            RangeComparison::Above
        }
    }

    #[must_use]
    pub fn clamp(self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Smallest range covering both; fails when the combined length overflows.
    pub fn union(self, other: Self) -> PlotResult<Self> {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    #[must_use]
    pub fn intersection(self, other: Self) -> Option<Self> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min <= max).then_some(Self { min, max })
    }

    /// Scales the length by `factor` around the midpoint.
    pub fn expanded_by(self, factor: f64) -> PlotResult<Self> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(PlotError::InvalidData(
                "range expansion factor must be finite and >= 0".to_owned(),
            ));
        }
        let half = self.length() * factor * 0.5;
        let mid = self.midpoint();
        Self::new(mid - half, mid + half)
    }

    pub fn shifted_by(self, delta: f64) -> PlotResult<Self> {
        Self::new(self.min + delta, self.max + delta)
    }

    /// Pads both ends by a fraction of the current length.
    pub fn padded(self, lower_ratio: f64, upper_ratio: f64) -> PlotResult<Self> {
        if !lower_ratio.is_finite()
            || !upper_ratio.is_finite()
            || lower_ratio < 0.0
            || upper_ratio < 0.0
        {
            return Err(PlotError::InvalidData(
                "range padding ratios must be finite and >= 0".to_owned(),
            ));
        }
        let span = self.length();
        Self::new(self.min - span * lower_ratio, self.max + span * upper_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::{PlotRange, RangeComparison};

    #[test]
    fn from_values_ignores_nan() {
        let range = PlotRange::from_values([3.0, f64::NAN, -1.0, 7.5]).expect("extent");
        assert_eq!((range.min(), range.max()), (-1.0, 7.5));
        assert!(PlotRange::from_values([f64::NAN]).is_none());
    }

    #[test]
    fn compare_reports_position() {
        let range = PlotRange::new(0.0, 10.0).expect("range");
        assert_eq!(range.compare(-0.1), RangeComparison::Below);
        assert_eq!(range.compare(10.0), RangeComparison::Within);
        assert_eq!(range.compare(f64::NAN), RangeComparison::Above);
    }

    #[test]
    fn disjoint_ranges_have_no_intersection() {
        let left = PlotRange::new(0.0, 1.0).expect("left");
        let right = PlotRange::new(2.0, 3.0).expect("right");
        assert!(left.intersection(right).is_none());
        assert_eq!(
            left.union(right).expect("union"),
            PlotRange::new(0.0, 3.0).expect("range")
        );
    }

    #[test]
    fn overflowing_length_is_rejected() {
        assert!(matches!(
            PlotRange::new(-1e308, 1e308),
            Err(crate::error::PlotError::InvalidRange { .. })
        ));
        assert!(PlotRange::new(-1e308, 0.0).is_ok());
        assert!(PlotRange::from_values([-1e308, 1e308]).is_none());

        let left = PlotRange::new(-1e308, 0.0).expect("left");
        let right = PlotRange::new(0.0, 1e308).expect("right");
        assert!(left.union(right).is_err());
    }
}
