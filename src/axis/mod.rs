//! Axis models: tick placement, label text and axis geometry.

mod format;
mod ticks;

pub use format::{
    DecimalFormatter, LabelContext, LabelFormatter, PercentFormatter, SharedLabelFormatter,
    TimeFormatter, decimals_for_step,
};
pub use ticks::{NiceStep, nice_step, nice_ticks, select_nice_step};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{Axis, NormalizedPoint, PlotRange, PlotSpace, ScaleType};
use crate::error::{PlotError, PlotResult};
use crate::render::{GeometricPrimitive, LabelAlignment, StyleRef};

/// One labelled major tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub position: f64,
    pub label: String,
}

/// Computes "nice" ticks covering `range` with at most `desired_count + 1`
/// entries, labelled through `formatter`.
///
/// Steps are `{1, 2, 5} x 10^n`, choosing the one closest to
/// `range.length() / desired_count`.
#[must_use]
pub fn compute_ticks(
    range: PlotRange,
    desired_count: usize,
    formatter: &dyn LabelFormatter,
) -> Vec<AxisTick> {
    labelled_ticks(Axis::X, range, desired_count, formatter)
}

fn labelled_ticks(
    axis: Axis,
    range: PlotRange,
    desired_count: usize,
    formatter: &dyn LabelFormatter,
) -> Vec<AxisTick> {
    let (values, step) = ticks::nice_ticks(range, desired_count);
    let context = LabelContext { axis, step };
    values
        .into_iter()
        .map(|position| AxisTick {
            position,
            label: formatter.format(position, &context),
        })
        .collect()
}

/// Strategy deciding where major ticks go.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LabelingPolicy {
    /// No ticks or labels.
    None,
    /// Nice steps sized for roughly `desired_count` intervals.
    Automatic { desired_count: usize },
    /// Every `interval` data units, aligned on `origin`.
    FixedInterval { interval: f64, origin: f64 },
    /// `divisions + 1` evenly spaced ticks from range min to max.
    EqualDivisions { divisions: usize },
    /// Exactly these locations (those inside the range).
    Provided { locations: Vec<f64> },
}

impl Default for LabelingPolicy {
    fn default() -> Self {
        Self::Automatic { desired_count: 5 }
    }
}

impl LabelingPolicy {
    pub fn validate(&self) -> PlotResult<()> {
        match self {
            Self::FixedInterval { interval, origin } => {
                if !interval.is_finite() || *interval <= 0.0 || !origin.is_finite() {
                    return Err(PlotError::InvalidData(
                        "fixed tick interval must be finite and > 0 with a finite origin"
                            .to_owned(),
                    ));
                }
                Ok(())
            }
            Self::Automatic { desired_count } if *desired_count >= ticks::MAX_TICKS => {
                Err(PlotError::InvalidData(format!(
                    "desired tick count must be < {}",
                    ticks::MAX_TICKS
                )))
            }
            Self::Provided { locations } if locations.iter().any(|value| !value.is_finite()) => {
                Err(PlotError::InvalidData(
                    "provided tick locations must be finite".to_owned(),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Where the axis line sits along the orthogonal axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum AxisCrossing {
    /// Fixed normalized position (`0.0` is the plot edge).
    Normalized(f64),
    /// Data value on the orthogonal axis, pinned inside its visible range.
    Value(f64),
}

impl Default for AxisCrossing {
    fn default() -> Self {
        Self::Normalized(0.0)
    }
}

/// Style handles for each part of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisStyles {
    pub line: StyleRef,
    pub major_tick: StyleRef,
    pub minor_tick: StyleRef,
    pub major_grid: StyleRef,
    pub minor_grid: StyleRef,
    pub label: StyleRef,
}

impl Default for AxisStyles {
    fn default() -> Self {
        Self {
            line: StyleRef::AXIS_LINE,
            major_tick: StyleRef::MAJOR_TICK,
            minor_tick: StyleRef::MINOR_TICK,
            major_grid: StyleRef::MAJOR_GRID,
            minor_grid: StyleRef::MINOR_GRID,
            label: StyleRef::AXIS_LABEL,
        }
    }
}

/// Tick resolved against a plot space.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedTick {
    pub value: f64,
    /// Position along the axis in normalized plot units.
    pub normalized: f64,
    pub major: bool,
    /// Label text; minor ticks and excluded values carry none.
    pub label: Option<String>,
}

/// Tick and label model for one axis of a plot space.
#[derive(Clone)]
pub struct AxisModel {
    identifier: String,
    axis: Axis,
    policy: LabelingPolicy,
    formatter: SharedLabelFormatter,
    minor_ticks_per_interval: usize,
    label_exclusion_ranges: Vec<PlotRange>,
    crossing: AxisCrossing,
    show_major_grid: bool,
    show_minor_grid: bool,
    tick_length: f64,
    label_offset: f64,
    styles: AxisStyles,
}

impl fmt::Debug for AxisModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AxisModel")
            .field("identifier", &self.identifier)
            .field("axis", &self.axis)
            .field("policy", &self.policy)
            .field("minor_ticks_per_interval", &self.minor_ticks_per_interval)
            .field("label_exclusion_ranges", &self.label_exclusion_ranges)
            .field("crossing", &self.crossing)
            .finish_non_exhaustive()
    }
}

impl AxisModel {
    /// Automatic labeling with step-derived decimal labels.
    #[must_use]
    pub fn new(identifier: impl Into<String>, axis: Axis) -> Self {
        Self {
            identifier: identifier.into(),
            axis,
            policy: LabelingPolicy::default(),
            formatter: Arc::new(DecimalFormatter::default()),
            minor_ticks_per_interval: 0,
            label_exclusion_ranges: Vec::new(),
            crossing: AxisCrossing::default(),
            show_major_grid: false,
            show_minor_grid: false,
            tick_length: 0.015,
            label_offset: 0.01,
            styles: AxisStyles::default(),
        }
    }

    pub fn with_policy(mut self, policy: LabelingPolicy) -> PlotResult<Self> {
        policy.validate()?;
        self.policy = policy;
        Ok(self)
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: SharedLabelFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    #[must_use]
    pub fn with_minor_ticks_per_interval(mut self, count: usize) -> Self {
        self.minor_ticks_per_interval = count;
        self
    }

    /// Values inside any of these ranges get neither tick nor label.
    #[must_use]
    pub fn with_label_exclusion_ranges(mut self, ranges: Vec<PlotRange>) -> Self {
        self.label_exclusion_ranges = ranges;
        self
    }

    #[must_use]
    pub fn with_crossing(mut self, crossing: AxisCrossing) -> Self {
        self.crossing = crossing;
        self
    }

    #[must_use]
    pub fn with_grid_lines(mut self, major: bool, minor: bool) -> Self {
        self.show_major_grid = major;
        self.show_minor_grid = minor;
        self
    }

    /// Tick mark length and label gap, both in normalized units.
    pub fn with_tick_geometry(mut self, tick_length: f64, label_offset: f64) -> PlotResult<Self> {
        if !tick_length.is_finite()
            || !label_offset.is_finite()
            || tick_length < 0.0
            || label_offset < 0.0
        {
            return Err(PlotError::InvalidData(
                "tick length and label offset must be finite and >= 0".to_owned(),
            ));
        }
        self.tick_length = tick_length;
        self.label_offset = label_offset;
        Ok(self)
    }

    #[must_use]
    pub fn with_styles(mut self, styles: AxisStyles) -> Self {
        self.styles = styles;
        self
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    #[must_use]
    pub fn policy(&self) -> &LabelingPolicy {
        &self.policy
    }

    /// Nice ticks over `range` labelled with this axis' formatter.
    #[must_use]
    pub fn compute_ticks(&self, range: PlotRange, desired_count: usize) -> Vec<AxisTick> {
        labelled_ticks(self.axis, range, desired_count, self.formatter.as_ref())
    }

    /// Major tick values for `range` under the labeling policy, plus the step
    /// handed to the formatter.
    fn major_values(&self, range: PlotRange, scale: ScaleType) -> (Vec<f64>, f64) {
        match &self.policy {
            LabelingPolicy::None => (Vec::new(), 0.0),
            LabelingPolicy::Automatic { desired_count } => {
                if scale == ScaleType::Log {
                    if let Some(values) = ticks::decade_ticks(range, *desired_count) {
                        return (values, 0.0);
                    }
                }
                ticks::nice_ticks(range, *desired_count)
            }
            LabelingPolicy::FixedInterval { interval, origin } => (
                ticks::fixed_interval_ticks(range, *interval, *origin),
                *interval,
            ),
            LabelingPolicy::EqualDivisions { divisions } => {
                let values = ticks::equal_division_ticks(range, *divisions);
                let step = if *divisions == 0 {
                    0.0
                } else {
                    range.length() / *divisions as f64
                };
                (values, step)
            }
            LabelingPolicy::Provided { locations } => {
                let mut values: Vec<f64> = locations
                    .iter()
                    .copied()
                    .filter(|value| range.contains(*value))
                    .collect();
                values.sort_by(f64::total_cmp);
                values.dedup();
                let step = ticks::tick_step_hint_from_values(&values);
                (values, step)
            }
        }
    }

    fn minor_values(&self, range: PlotRange, scale: ScaleType, majors: &[f64]) -> Vec<f64> {
        if self.minor_ticks_per_interval == 0 {
            return Vec::new();
        }
        let decade_majors = scale == ScaleType::Log
            && matches!(self.policy, LabelingPolicy::Automatic { .. })
            && majors.len() >= 2
            && majors.iter().all(|value| value.log10().fract() == 0.0);
        if decade_majors {
            ticks::decade_minor_ticks(range)
                .into_iter()
                .filter(|value| !majors.contains(value))
                .collect()
        } else {
            ticks::linear_minor_ticks(majors, self.minor_ticks_per_interval)
        }
    }

    fn is_excluded(&self, value: f64) -> bool {
        self.label_exclusion_ranges
            .iter()
            .any(|range| range.contains(value))
    }

    /// Major and minor ticks for the current state of `space`, sorted by value.
    pub fn ticks(&self, space: &PlotSpace) -> PlotResult<Vec<PositionedTick>> {
        let range = space.range(self.axis);
        let scale = space.scale_type(self.axis);
        let (majors, step) = self.major_values(range, scale);
        let minors = self.minor_values(range, scale, &majors);
        let context = LabelContext {
            axis: self.axis,
            step,
        };

        let mut positioned = Vec::with_capacity(majors.len() + minors.len());
        for (value, major) in majors
            .iter()
            .map(|value| (*value, true))
            .chain(minors.iter().map(|value| (*value, false)))
        {
            if self.is_excluded(value) {
                trace!(axis = %self.axis, value, "tick excluded");
                continue;
            }
            // Generated values may sit a rounding error outside the range.
            let normalized = space.map_value_to_plot_space(self.axis, range.clamp(value))?;
            let label = major.then(|| self.formatter.format(value, &context));
            positioned.push(PositionedTick {
                value,
                normalized,
                major,
                label,
            });
        }
        positioned.sort_by(|left, right| left.value.total_cmp(&right.value));
        Ok(positioned)
    }

    /// Normalized position of the axis line along the orthogonal axis.
    pub fn crossing_position(&self, space: &PlotSpace) -> PlotResult<f64> {
        let orthogonal = self.axis.orthogonal();
        match self.crossing {
            AxisCrossing::Normalized(position) if position.is_finite() => Ok(position),
            AxisCrossing::Normalized(_) => Err(PlotError::InvalidData(
                "axis crossing must be finite".to_owned(),
            )),
            AxisCrossing::Value(value) => {
                let pinned = space.range(orthogonal).clamp(value);
                space.map_value_to_plot_space(orthogonal, pinned)
            }
        }
    }

    /// Builds a normalized point from an along-axis and an across-axis value.
    fn point(&self, along: f64, across: f64) -> NormalizedPoint {
        match self.axis {
            Axis::X => NormalizedPoint::new(along, across),
            Axis::Y => NormalizedPoint::new(across, along),
        }
    }

    /// Grid lines spanning the whole plot area, minor lines first.
    pub fn grid_primitives(&self, space: &PlotSpace) -> PlotResult<Vec<GeometricPrimitive>> {
        if !self.show_major_grid && !self.show_minor_grid {
            return Ok(Vec::new());
        }
        let ticks = self.ticks(space)?;
        let mut primitives = Vec::new();
        for pass_major in [false, true] {
            let enabled = if pass_major {
                self.show_major_grid
            } else {
                self.show_minor_grid
            };
            if !enabled {
                continue;
            }
            let style = if pass_major {
                self.styles.major_grid
            } else {
                self.styles.minor_grid
            };
            for tick in ticks.iter().filter(|tick| tick.major == pass_major) {
                primitives.push(GeometricPrimitive::segment(
                    self.point(tick.normalized, 0.0),
                    self.point(tick.normalized, 1.0),
                    style,
                    None,
                ));
            }
        }
        Ok(primitives)
    }

    /// Axis line, tick marks and labels.
    ///
    /// Tick marks point away from the plot area (down for x, left for y) and
    /// labels sit beyond them.
    pub fn axis_primitives(&self, space: &PlotSpace) -> PlotResult<Vec<GeometricPrimitive>> {
        let crossing = self.crossing_position(space)?;
        let ticks = self.ticks(space)?;
        let mut primitives = Vec::with_capacity(1 + ticks.len() * 2);
        primitives.push(GeometricPrimitive::segment(
            self.point(0.0, crossing),
            self.point(1.0, crossing),
            self.styles.line,
            None,
        ));

        for tick in &ticks {
            let (length, style) = if tick.major {
                (self.tick_length, self.styles.major_tick)
            } else {
                (self.tick_length * 0.5, self.styles.minor_tick)
            };
            if length > 0.0 {
                primitives.push(GeometricPrimitive::segment(
                    self.point(tick.normalized, crossing),
                    self.point(tick.normalized, crossing - length),
                    style,
                    None,
                ));
            }
        }

        let alignment = match self.axis {
            Axis::X => LabelAlignment::Below,
            Axis::Y => LabelAlignment::Left,
        };
        for tick in &ticks {
            let Some(label) = tick.label.as_ref().filter(|label| !label.is_empty()) else {
                continue;
            };
            primitives.push(GeometricPrimitive::label(
                self.point(
                    tick.normalized,
                    crossing - self.tick_length - self.label_offset,
                ),
                label.clone(),
                alignment,
                self.styles.label,
                None,
            ));
        }
        Ok(primitives)
    }

    /// Grid primitives followed by axis primitives.
    pub fn generate_primitives(&self, space: &PlotSpace) -> PlotResult<Vec<GeometricPrimitive>> {
        let mut primitives = self.grid_primitives(space)?;
        primitives.extend(self.axis_primitives(space)?);
        Ok(primitives)
    }
}
