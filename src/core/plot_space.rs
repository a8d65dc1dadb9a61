use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::{Axis, DataPoint, NormalizedPoint, PlotRange, ScaleType};
use crate::error::{PlotError, PlotResult};

/// Behavior applied when a mapped value falls outside the configured range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClampMode {
    /// Out-of-range values are pinned to the nearest bound.
    #[default]
    Clamp,
    /// Out-of-range values fail with [`PlotError::OutOfRange`].
    Reject,
}

/// Tuning for fitting a plot space around data extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitTuning {
    /// Fraction of the fitted span added below the lowest value.
    pub lower_padding_ratio: f64,
    /// Fraction of the fitted span added above the highest value.
    pub upper_padding_ratio: f64,
    /// Minimum transformed span used when the data is flat.
    pub min_span_absolute: f64,
}

impl Default for FitTuning {
    fn default() -> Self {
        Self {
            lower_padding_ratio: 0.05,
            upper_padding_ratio: 0.05,
            min_span_absolute: 1.0,
        }
    }
}

impl FitTuning {
    fn validate(self) -> PlotResult<Self> {
        if !self.lower_padding_ratio.is_finite()
            || !self.upper_padding_ratio.is_finite()
            || self.lower_padding_ratio < 0.0
            || self.upper_padding_ratio < 0.0
        {
            return Err(PlotError::InvalidData(
                "fit padding ratios must be finite and >= 0".to_owned(),
            ));
        }
        if !self.min_span_absolute.is_finite() || self.min_span_absolute <= 0.0 {
            return Err(PlotError::InvalidData(
                "fit min span must be finite and > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Visible range, scale and optional global constraint for one axis.
///
/// Deserialization applies the same checks as [`PlotSpace::from_axes`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisSpace {
    range: PlotRange,
    scale: ScaleType,
    global_range: Option<PlotRange>,
}

#[derive(Deserialize)]
struct RawAxisSpace {
    range: PlotRange,
    #[serde(default)]
    scale: ScaleType,
    #[serde(default)]
    global_range: Option<PlotRange>,
}

impl<'de> Deserialize<'de> for AxisSpace {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawAxisSpace::deserialize(deserializer)?;
        Self {
            range: raw.range,
            scale: raw.scale,
            global_range: raw.global_range,
        }
        .validated()
        .map_err(serde::de::Error::custom)
    }
}

impl AxisSpace {
    #[must_use]
    pub const fn new(range: PlotRange) -> Self {
        Self {
            range,
            scale: ScaleType::Linear,
            global_range: None,
        }
    }

    pub fn with_scale(range: PlotRange, scale: ScaleType) -> PlotResult<Self> {
        scale.validate_range(range)?;
        Ok(Self {
            range,
            scale,
            global_range: None,
        })
    }

    #[must_use]
    pub const fn with_global_range(mut self, global_range: Option<PlotRange>) -> Self {
        self.global_range = global_range;
        self
    }

    #[must_use]
    pub const fn range(&self) -> PlotRange {
        self.range
    }

    #[must_use]
    pub const fn scale(&self) -> ScaleType {
        self.scale
    }

    #[must_use]
    pub const fn global_range(&self) -> Option<PlotRange> {
        self.global_range
    }

    /// Fits `range` inside the global constraint, shifting it when it is
    /// shorter and replacing it when it is longer.
    fn constrain(&self, range: PlotRange) -> PlotResult<PlotRange> {
        let Some(global) = self.global_range else {
            return Ok(range);
        };
        if range.length() >= global.length() {
            return Ok(global);
        }
        if range.min() < global.min() {
            return range.shifted_by(global.min() - range.min());
        }
        if range.max() > global.max() {
            return range.shifted_by(global.max() - range.max());
        }
        Ok(range)
    }

    /// Checks the scale against both ranges and pulls the visible range
    /// inside the global one.
    fn validated(mut self) -> PlotResult<Self> {
        if let Some(global) = self.global_range {
            self.scale.validate_range(global)?;
        }
        self.range = self.resolve(self.range)?;
        Ok(self)
    }

    fn resolve(&self, range: PlotRange) -> PlotResult<PlotRange> {
        let constrained = self.constrain(range)?;
        self.scale.validate_range(constrained)?;
        Ok(constrained)
    }

    fn normalize(&self, axis: Axis, value: f64, clamp_mode: ClampMode) -> PlotResult<f64> {
        if !value.is_finite() {
            return Err(PlotError::InvalidData(format!(
                "{axis} value must be finite"
            )));
        }
        let value = if self.range.contains(value) {
            value
        } else {
            match clamp_mode {
                ClampMode::Clamp => {
                    trace!(%axis, value, "clamping value into plot range");
                    self.range.clamp(value)
                }
                ClampMode::Reject => {
                    return Err(PlotError::OutOfRange {
                        axis,
                        value,
                        min: self.range.min(),
                        max: self.range.max(),
                    });
                }
            }
        };
        Ok(self.scale.normalize(self.range, value))
    }

    fn denormalize(&self, axis: Axis, normalized: f64, clamp_mode: ClampMode) -> PlotResult<f64> {
        if !normalized.is_finite() {
            return Err(PlotError::InvalidData(format!(
                "normalized {axis} coordinate must be finite"
            )));
        }
        let normalized = if (0.0..=1.0).contains(&normalized) {
            normalized
        } else {
            match clamp_mode {
                ClampMode::Clamp => normalized.clamp(0.0, 1.0),
                ClampMode::Reject => {
                    return Err(PlotError::OutOfRange {
                        axis,
                        value: normalized,
                        min: 0.0,
                        max: 1.0,
                    });
                }
            }
        };
        Ok(self.scale.denormalize(self.range, normalized))
    }

    fn transformed_bounds(&self) -> (f64, f64) {
        (
            self.scale.forward(self.range.min()),
            self.scale.forward(self.range.max()),
        )
    }
}

/// Coordinate transform between data units and normalized plot coordinates.
///
/// Every mutation validates the complete new state before committing it, so a
/// failed call leaves the space exactly as it was. The space performs no
/// internal locking: a space must not be mutated while a render pass borrows it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotSpace {
    x: AxisSpace,
    y: AxisSpace,
    clamp_mode: ClampMode,
}

#[derive(Deserialize)]
struct RawPlotSpace {
    x: AxisSpace,
    y: AxisSpace,
    #[serde(default)]
    clamp_mode: ClampMode,
}

impl<'de> Deserialize<'de> for PlotSpace {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawPlotSpace::deserialize(deserializer)?;
        Self::from_axes(raw.x, raw.y, raw.clamp_mode).map_err(serde::de::Error::custom)
    }
}

impl PlotSpace {
    /// Creates a linear space in clamping mode.
    #[must_use]
    pub const fn new(x_range: PlotRange, y_range: PlotRange) -> Self {
        Self {
            x: AxisSpace::new(x_range),
            y: AxisSpace::new(y_range),
            clamp_mode: ClampMode::Clamp,
        }
    }

    pub fn from_axes(x: AxisSpace, y: AxisSpace, clamp_mode: ClampMode) -> PlotResult<Self> {
        Ok(Self {
            x: x.validated()?,
            y: y.validated()?,
            clamp_mode,
        })
    }

    #[must_use]
    pub const fn with_clamp_mode(mut self, clamp_mode: ClampMode) -> Self {
        self.clamp_mode = clamp_mode;
        self
    }

    pub fn with_scale_type(mut self, axis: Axis, scale: ScaleType) -> PlotResult<Self> {
        self.set_scale_type(axis, scale)?;
        Ok(self)
    }

    #[must_use]
    pub const fn axis(&self, axis: Axis) -> &AxisSpace {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut AxisSpace {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }

    #[must_use]
    pub const fn range(&self, axis: Axis) -> PlotRange {
        self.axis(axis).range
    }

    #[must_use]
    pub const fn scale_type(&self, axis: Axis) -> ScaleType {
        self.axis(axis).scale
    }

    #[must_use]
    pub const fn clamp_mode(&self) -> ClampMode {
        self.clamp_mode
    }

    pub fn set_clamp_mode(&mut self, clamp_mode: ClampMode) {
        self.clamp_mode = clamp_mode;
    }

    #[must_use]
    pub fn contains(&self, point: DataPoint) -> bool {
        self.x.range.contains(point.x) && self.y.range.contains(point.y)
    }

    /// Maps a data point into normalized plot coordinates.
    pub fn map_to_plot_space(&self, point: DataPoint) -> PlotResult<NormalizedPoint> {
        Ok(NormalizedPoint::new(
            self.x.normalize(Axis::X, point.x, self.clamp_mode)?,
            self.y.normalize(Axis::Y, point.y, self.clamp_mode)?,
        ))
    }

    /// Maps one coordinate of one axis into normalized plot units.
    pub fn map_value_to_plot_space(&self, axis: Axis, value: f64) -> PlotResult<f64> {
        self.axis(axis).normalize(axis, value, self.clamp_mode)
    }

    /// Inverse of [`PlotSpace::map_to_plot_space`].
    pub fn map_from_plot_space(&self, point: NormalizedPoint) -> PlotResult<DataPoint> {
        Ok(DataPoint::new(
            self.x.denormalize(Axis::X, point.x, self.clamp_mode)?,
            self.y.denormalize(Axis::Y, point.y, self.clamp_mode)?,
        ))
    }

    pub fn map_value_from_plot_space(&self, axis: Axis, normalized: f64) -> PlotResult<f64> {
        self.axis(axis)
            .denormalize(axis, normalized, self.clamp_mode)
    }

    /// Replaces the visible range of one axis.
    pub fn set_range(&mut self, axis: Axis, range: PlotRange) -> PlotResult<()> {
        let resolved = self.axis(axis).resolve(range).inspect_err(|err| {
            warn!(%axis, error = %err, "rejected plot range update");
        })?;
        debug!(
            %axis,
            min = resolved.min(),
            max = resolved.max(),
            "set plot range"
        );
        self.axis_mut(axis).range = resolved;
        Ok(())
    }

    /// Replaces both visible ranges, or neither when either is rejected.
    pub fn set_ranges(&mut self, x_range: PlotRange, y_range: PlotRange) -> PlotResult<()> {
        let resolved = self
            .x
            .resolve(x_range)
            .and_then(|x| Ok((x, self.y.resolve(y_range)?)));
        let (x, y) = resolved.inspect_err(|err| {
            warn!(error = %err, "rejected plot ranges update");
        })?;
        debug!(
            x_min = x.min(),
            x_max = x.max(),
            y_min = y.min(),
            y_max = y.max(),
            "set plot ranges"
        );
        self.x.range = x;
        self.y.range = y;
        Ok(())
    }

    pub fn set_scale_type(&mut self, axis: Axis, scale: ScaleType) -> PlotResult<()> {
        let current = self.axis(axis);
        scale.validate_range(current.range)?;
        if let Some(global) = current.global_range {
            scale.validate_range(global)?;
        }
        debug!(%axis, ?scale, "set scale type");
        self.axis_mut(axis).scale = scale;
        Ok(())
    }

    /// Sets or clears the outer bound the visible range must stay inside.
    pub fn set_global_range(&mut self, axis: Axis, global: Option<PlotRange>) -> PlotResult<()> {
        let mut candidate = *self.axis(axis);
        candidate.global_range = global;
        let range = candidate.resolve(candidate.range)?;
        candidate.range = range;
        debug!(%axis, ?global, "set global plot range");
        *self.axis_mut(axis) = candidate;
        Ok(())
    }

    /// Shifts the visible window by a fraction of its own length per axis.
    ///
    /// Positive deltas move the window towards larger data values.
    pub fn pan_by(&mut self, delta: NormalizedPoint) -> PlotResult<()> {
        if !delta.x.is_finite() || !delta.y.is_finite() {
            return Err(PlotError::InvalidData(
                "pan delta must be finite".to_owned(),
            ));
        }
        let x = pan_axis(&self.x, delta.x)?;
        let y = pan_axis(&self.y, delta.y)?;
        self.set_ranges(x, y)
    }

    /// Zooms both axes by `factor` keeping the data under `anchor` fixed.
    ///
    /// Factors above `1.0` zoom in. Zooming happens in the transformed domain
    /// so log axes zoom by decades.
    pub fn scale_by(&mut self, factor: f64, anchor: NormalizedPoint) -> PlotResult<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(PlotError::InvalidData(
                "zoom factor must be finite and > 0".to_owned(),
            ));
        }
        if !anchor.x.is_finite() || !anchor.y.is_finite() {
            return Err(PlotError::InvalidData(
                "zoom anchor must be finite".to_owned(),
            ));
        }
        let x = zoom_axis(&self.x, factor, anchor.x)?;
        let y = zoom_axis(&self.y, factor, anchor.y)?;
        self.set_ranges(x, y)
    }

    /// Fits the visible ranges around the given data extents.
    ///
    /// Axes whose extent is `None` keep their current range.
    pub fn scale_to_fit(
        &mut self,
        x_extent: Option<PlotRange>,
        y_extent: Option<PlotRange>,
        tuning: FitTuning,
    ) -> PlotResult<()> {
        let tuning = tuning.validate()?;
        let x = match x_extent {
            Some(extent) => fit_axis(&self.x, extent, tuning)?,
            None => self.x.range,
        };
        let y = match y_extent {
            Some(extent) => fit_axis(&self.y, extent, tuning)?,
            None => self.y.range,
        };
        self.set_ranges(x, y)
    }
}

fn pan_axis(axis: &AxisSpace, delta: f64) -> PlotResult<PlotRange> {
    let (start, end) = axis.transformed_bounds();
    let shift = (end - start) * delta;
    axis.scale
        .range_from_transformed(start + shift, end + shift)
}

fn zoom_axis(axis: &AxisSpace, factor: f64, anchor: f64) -> PlotResult<PlotRange> {
    let (start, end) = axis.transformed_bounds();
    let span = end - start;
    let pivot = start + anchor * span;
    let new_span = span / factor;
    let new_start = pivot - anchor * new_span;
    axis.scale
        .range_from_transformed(new_start, new_start + new_span)
}

fn fit_axis(axis: &AxisSpace, extent: PlotRange, tuning: FitTuning) -> PlotResult<PlotRange> {
    axis.scale.validate_range(extent)?;
    let start = axis.scale.forward(extent.min());
    let end = axis.scale.forward(extent.max());
    let (start, end) = if end - start < tuning.min_span_absolute {
        let mid = start + (end - start) * 0.5;
        let half = tuning.min_span_absolute * 0.5;
        (mid - half, mid + half)
    } else {
        (start, end)
    };
    let span = end - start;
    axis.scale.range_from_transformed(
        start - span * tuning.lower_padding_ratio,
        end + span * tuning.upper_padding_ratio,
    )
}

#[cfg(test)]
mod tests {
    use super::{AxisSpace, ClampMode, FitTuning, PlotSpace};
    use crate::core::{Axis, NormalizedPoint, PlotRange, ScaleType};

    fn range(min: f64, max: f64) -> PlotRange {
        PlotRange::new(min, max).expect("valid range")
    }

    #[test]
    fn global_range_shifts_shorter_windows_inside() {
        let mut axis = AxisSpace::new(range(0.0, 10.0));
        axis.global_range = Some(range(0.0, 100.0));
        assert_eq!(axis.constrain(range(-5.0, 5.0)).expect("shift"), range(0.0, 10.0));
        assert_eq!(axis.constrain(range(95.0, 105.0)).expect("shift"), range(90.0, 100.0));
        assert_eq!(axis.constrain(range(-50.0, 200.0)).expect("replace"), range(0.0, 100.0));
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut space = PlotSpace::new(range(0.0, 100.0), range(0.0, 10.0));
        space
            .scale_by(2.0, NormalizedPoint::new(0.25, 0.5))
            .expect("zoom");
        assert_eq!(space.range(Axis::X), range(12.5, 62.5));
        assert_eq!(space.range(Axis::Y), range(2.5, 7.5));
    }

    #[test]
    fn fit_on_log_axis_pads_in_decades() {
        let mut space = PlotSpace::new(range(1.0, 10.0), range(0.0, 1.0))
            .with_scale_type(Axis::X, ScaleType::Log)
            .expect("log x");
        let tuning = FitTuning {
            lower_padding_ratio: 0.5,
            upper_padding_ratio: 0.5,
            min_span_absolute: 0.1,
        };
        space
            .scale_to_fit(Some(range(10.0, 100.0)), None, tuning)
            .expect("fit");
        let fitted = space.range(Axis::X);
        assert!((fitted.min() - 10f64.powf(0.5)).abs() <= 1e-9);
        assert!((fitted.max() - 10f64.powf(2.5)).abs() <= 1e-9);
        assert_eq!(space.range(Axis::Y), range(0.0, 1.0));
    }

    #[test]
    fn reject_mode_reports_axis() {
        let space = PlotSpace::new(range(0.0, 1.0), range(0.0, 1.0))
            .with_clamp_mode(ClampMode::Reject);
        let err = space
            .map_value_to_plot_space(Axis::Y, 2.0)
            .expect_err("out of range");
        assert!(err.to_string().contains("y plot range"));
    }

    #[test]
    fn deserialized_space_is_validated() {
        let space: PlotSpace = serde_json::from_str(
            r#"{
                "x": { "range": { "min": 0.0, "max": 10.0 },
                       "global_range": { "min": 20.0, "max": 40.0 } },
                "y": { "range": { "min": 1.0, "max": 100.0 }, "scale": "log" }
            }"#,
        )
        .expect("space");
        assert_eq!(space.range(Axis::X), range(20.0, 30.0));
        assert_eq!(space.scale_type(Axis::Y), ScaleType::Log);
        assert_eq!(space.clamp_mode(), ClampMode::Clamp);

        let round_trip: PlotSpace =
            serde_json::from_str(&serde_json::to_string(&space).expect("json")).expect("parse");
        assert_eq!(round_trip, space);
    }
}
