use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::axis::{
    AxisCrossing, AxisModel, DecimalFormatter, LabelingPolicy, PercentFormatter,
    SharedLabelFormatter, TimeFormatter,
};
use crate::core::{Axis, AxisSpace, ClampMode, PlotRange, PlotSpace, ScaleType};
use crate::data::fields;
use crate::error::{PlotError, PlotResult};
use crate::plot::{
    AreaFill, BarOrientation, BarPlot, DataLabels, Interpolation, OhlcFields, Plot, RangePlot,
    ScatterPlot, TradingRangePlot, TradingRangeStyle,
};
use crate::render::{LabelAlignment, StyleRef, Theme};

use super::Graph;

/// Serializable description of a [`Graph`].
///
/// Hosts persist and load graph setup through this type (see the JSON
/// contract helpers) instead of inventing their own format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default = "default_graph_identifier")]
    pub identifier: String,
    pub x: AxisSpaceConfig,
    pub y: AxisSpaceConfig,
    #[serde(default)]
    pub clamp_mode: ClampMode,
    #[serde(default)]
    pub theme: ThemePreset,
    #[serde(default)]
    pub axes: Vec<AxisConfig>,
    #[serde(default)]
    pub plots: Vec<PlotConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSpaceConfig {
    pub range: PlotRange,
    #[serde(default)]
    pub scale: ScaleType,
    #[serde(default)]
    pub global_range: Option<PlotRange>,
}

impl AxisSpaceConfig {
    #[must_use]
    pub fn new(range: PlotRange) -> Self {
        Self {
            range,
            scale: ScaleType::Linear,
            global_range: None,
        }
    }

    fn build(self) -> PlotResult<AxisSpace> {
        Ok(AxisSpace::with_scale(self.range, self.scale)?.with_global_range(self.global_range))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemePreset {
    #[default]
    PlainWhite,
    PlainBlack,
}

impl ThemePreset {
    #[must_use]
    pub fn theme(self) -> Theme {
        match self {
            Self::PlainWhite => Theme::plain_white(),
            Self::PlainBlack => Theme::plain_black(),
        }
    }
}

/// Label text format for axes and data labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LabelFormatConfig {
    Decimal(DecimalFormatter),
    Percent(PercentFormatter),
    Time(TimeFormatConfig),
}

impl Default for LabelFormatConfig {
    fn default() -> Self {
        Self::Decimal(DecimalFormatter::default())
    }
}

impl LabelFormatConfig {
    pub fn build(&self) -> PlotResult<SharedLabelFormatter> {
        Ok(match self {
            Self::Decimal(formatter) => Arc::new(formatter.clone()),
            Self::Percent(formatter) => Arc::new(*formatter),
            Self::Time(config) => Arc::new(
                TimeFormatter::from_unix_reference(
                    config.reference_unix_seconds,
                    config.pattern.clone(),
                )?
                .with_utc_offset_seconds(config.utc_offset_seconds)?,
            ),
        })
    }
}

/// Values are seconds after `reference_unix_seconds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeFormatConfig {
    #[serde(default)]
    pub reference_unix_seconds: i64,
    #[serde(default = "default_time_pattern")]
    pub pattern: String,
    #[serde(default)]
    pub utc_offset_seconds: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    pub identifier: String,
    pub axis: Axis,
    #[serde(default)]
    pub policy: LabelingPolicy,
    #[serde(default)]
    pub label_format: LabelFormatConfig,
    #[serde(default)]
    pub minor_ticks_per_interval: usize,
    #[serde(default)]
    pub label_exclusion_ranges: Vec<PlotRange>,
    #[serde(default)]
    pub crossing: AxisCrossing,
    #[serde(default)]
    pub major_grid: bool,
    #[serde(default)]
    pub minor_grid: bool,
    #[serde(default = "default_tick_length")]
    pub tick_length: f64,
    #[serde(default = "default_label_offset")]
    pub label_offset: f64,
}

impl AxisConfig {
    #[must_use]
    pub fn new(identifier: impl Into<String>, axis: Axis) -> Self {
        Self {
            identifier: identifier.into(),
            axis,
            policy: LabelingPolicy::default(),
            label_format: LabelFormatConfig::default(),
            minor_ticks_per_interval: 0,
            label_exclusion_ranges: Vec::new(),
            crossing: AxisCrossing::default(),
            major_grid: false,
            minor_grid: false,
            tick_length: default_tick_length(),
            label_offset: default_label_offset(),
        }
    }

    pub fn build(&self) -> PlotResult<AxisModel> {
        Ok(AxisModel::new(self.identifier.clone(), self.axis)
            .with_policy(self.policy.clone())?
            .with_formatter(self.label_format.build()?)
            .with_minor_ticks_per_interval(self.minor_ticks_per_interval)
            .with_label_exclusion_ranges(self.label_exclusion_ranges.clone())
            .with_crossing(self.crossing)
            .with_grid_lines(self.major_grid, self.minor_grid)
            .with_tick_geometry(self.tick_length, self.label_offset)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataLabelsConfig {
    #[serde(default = "default_label_axis")]
    pub value_axis: Axis,
    #[serde(default = "default_label_alignment")]
    pub alignment: LabelAlignment,
    #[serde(default = "default_label_offset")]
    pub offset: f64,
    #[serde(default)]
    pub format: LabelFormatConfig,
}

impl DataLabelsConfig {
    fn build(&self) -> PlotResult<DataLabels> {
        if !self.offset.is_finite() {
            return Err(PlotError::InvalidData(
                "data label offset must be finite".to_owned(),
            ));
        }
        Ok(DataLabels {
            value_axis: self.value_axis,
            alignment: self.alignment,
            offset: self.offset,
            style: StyleRef::DATA_LABEL,
            formatter: self.format.build()?,
        })
    }
}

/// One plot and the name of the data source it reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlotConfig {
    Scatter(ScatterConfig),
    Bar(BarConfig),
    Range(RangeConfig),
    TradingRange(TradingRangeConfig),
}

impl PlotConfig {
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::Scatter(config) => &config.identifier,
            Self::Bar(config) => &config.identifier,
            Self::Range(config) => &config.identifier,
            Self::TradingRange(config) => &config.identifier,
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::Scatter(config) => &config.source,
            Self::Bar(config) => &config.source,
            Self::Range(config) => &config.source,
            Self::TradingRange(config) => &config.source,
        }
    }

    pub fn build(&self) -> PlotResult<Box<dyn Plot>> {
        let plot: Box<dyn Plot> = match self {
            Self::Scatter(config) => Box::new(config.build()?),
            Self::Bar(config) => Box::new(config.build()?),
            Self::Range(config) => Box::new(config.build()?),
            Self::TradingRange(config) => Box::new(config.build()?),
        };
        Ok(plot)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterConfig {
    pub identifier: String,
    pub source: String,
    #[serde(default = "default_x_field")]
    pub x_field: String,
    #[serde(default = "default_y_field")]
    pub y_field: String,
    #[serde(default = "default_true")]
    pub line: bool,
    #[serde(default = "default_true")]
    pub symbols: bool,
    #[serde(default)]
    pub interpolation: Interpolation,
    /// Fills down to this value when present.
    #[serde(default)]
    pub area_base: Option<f64>,
    #[serde(default)]
    pub data_labels: Option<DataLabelsConfig>,
}

impl ScatterConfig {
    fn build(&self) -> PlotResult<ScatterPlot> {
        if self.area_base.is_some_and(|base| !base.is_finite()) {
            return Err(PlotError::InvalidData(
                "area base value must be finite".to_owned(),
            ));
        }
        let labels = self
            .data_labels
            .as_ref()
            .map(DataLabelsConfig::build)
            .transpose()?;
        Ok(ScatterPlot::new(self.identifier.clone())
            .with_fields(self.x_field.clone(), self.y_field.clone())
            .with_line_style(self.line.then_some(StyleRef::DATA_LINE))
            .with_symbol_style(self.symbols.then_some(StyleRef::DATA_SYMBOL))
            .with_interpolation(self.interpolation)
            .with_area_fill(self.area_base.map(|base_value| AreaFill {
                base_value,
                style: StyleRef::DATA_FILL,
            }))
            .with_data_labels(labels))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarConfig {
    pub identifier: String,
    pub source: String,
    #[serde(default = "default_bar_location_field")]
    pub location_field: String,
    #[serde(default = "default_bar_tip_field")]
    pub tip_field: String,
    #[serde(default)]
    pub base_field: Option<String>,
    #[serde(default)]
    pub base_value: f64,
    #[serde(default = "default_bar_width")]
    pub bar_width: f64,
    #[serde(default)]
    pub bar_offset: f64,
    #[serde(default)]
    pub orientation: BarOrientation,
    #[serde(default)]
    pub data_labels: Option<DataLabelsConfig>,
}

impl BarConfig {
    fn build(&self) -> PlotResult<BarPlot> {
        let labels = self
            .data_labels
            .as_ref()
            .map(DataLabelsConfig::build)
            .transpose()?;
        Ok(BarPlot::new(self.identifier.clone())
            .with_fields(self.location_field.clone(), self.tip_field.clone())
            .with_base_field(self.base_field.clone())
            .with_base_value(self.base_value)?
            .with_bar_geometry(self.bar_width, self.bar_offset)?
            .with_orientation(self.orientation)
            .with_data_labels(labels))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    pub identifier: String,
    pub source: String,
    #[serde(default = "default_x_field")]
    pub x_field: String,
    #[serde(default = "default_y_field")]
    pub y_field: String,
    #[serde(default)]
    pub cap_width: f64,
    #[serde(default)]
    pub symbols: bool,
    #[serde(default)]
    pub area: bool,
}

impl RangeConfig {
    fn build(&self) -> PlotResult<RangePlot> {
        Ok(RangePlot::new(self.identifier.clone())
            .with_fields(self.x_field.clone(), self.y_field.clone())
            .with_cap_width(self.cap_width)?
            .with_symbol_style(self.symbols.then_some(StyleRef::DATA_SYMBOL))
            .with_area_style(self.area.then_some(StyleRef::DATA_FILL)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingRangeConfig {
    pub identifier: String,
    pub source: String,
    #[serde(default)]
    pub fields: OhlcFields,
    #[serde(default)]
    pub style: TradingRangeStyle,
    #[serde(default = "default_trading_bar_width")]
    pub bar_width: f64,
}

impl TradingRangeConfig {
    fn build(&self) -> PlotResult<TradingRangePlot> {
        TradingRangePlot::new(self.identifier.clone())
            .with_fields(self.fields.clone())
            .with_style(self.style)
            .with_bar_width(self.bar_width)
    }
}

impl GraphConfig {
    /// Minimal config: linear axes over the given ranges, nothing plotted.
    #[must_use]
    pub fn new(x_range: PlotRange, y_range: PlotRange) -> Self {
        Self {
            identifier: default_graph_identifier(),
            x: AxisSpaceConfig::new(x_range),
            y: AxisSpaceConfig::new(y_range),
            clamp_mode: ClampMode::Clamp,
            theme: ThemePreset::PlainWhite,
            axes: Vec::new(),
            plots: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    #[must_use]
    pub fn with_scale(mut self, axis: Axis, scale: ScaleType) -> Self {
        match axis {
            Axis::X => self.x.scale = scale,
            Axis::Y => self.y.scale = scale,
        }
        self
    }

    #[must_use]
    pub fn with_global_range(mut self, axis: Axis, global_range: Option<PlotRange>) -> Self {
        match axis {
            Axis::X => self.x.global_range = global_range,
            Axis::Y => self.y.global_range = global_range,
        }
        self
    }

    #[must_use]
    pub fn with_clamp_mode(mut self, clamp_mode: ClampMode) -> Self {
        self.clamp_mode = clamp_mode;
        self
    }

    #[must_use]
    pub fn with_theme(mut self, theme: ThemePreset) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn with_axis(mut self, axis: AxisConfig) -> Self {
        self.axes.push(axis);
        self
    }

    #[must_use]
    pub fn with_plot(mut self, plot: PlotConfig) -> Self {
        self.plots.push(plot);
        self
    }

    /// Builds the plot space alone.
    pub fn plot_space(&self) -> PlotResult<PlotSpace> {
        PlotSpace::from_axes(self.x.build()?, self.y.build()?, self.clamp_mode)
    }

    /// Validates every part and assembles the graph.
    pub fn build(&self) -> PlotResult<Graph> {
        let mut graph = Graph::new(self.identifier.clone(), self.plot_space()?)
            .with_theme(self.theme.theme())?;
        for axis in &self.axes {
            graph.add_axis(axis.build()?)?;
        }
        for plot in &self.plots {
            graph.add_boxed_plot(plot.build()?, plot.source().to_owned())?;
        }
        debug!(
            graph = %self.identifier,
            axes = self.axes.len(),
            plots = self.plots.len(),
            "graph built from config"
        );
        Ok(graph)
    }
}

fn default_graph_identifier() -> String {
    "graph".to_owned()
}

fn default_time_pattern() -> String {
    "%Y-%m-%d %H:%M".to_owned()
}

fn default_tick_length() -> f64 {
    0.015
}

fn default_label_offset() -> f64 {
    0.01
}

fn default_label_axis() -> Axis {
    Axis::Y
}

fn default_label_alignment() -> LabelAlignment {
    LabelAlignment::Above
}

fn default_true() -> bool {
    true
}

fn default_x_field() -> String {
    fields::X.to_owned()
}

fn default_y_field() -> String {
    fields::Y.to_owned()
}

fn default_bar_location_field() -> String {
    fields::BAR_LOCATION.to_owned()
}

fn default_bar_tip_field() -> String {
    fields::BAR_TIP.to_owned()
}

fn default_bar_width() -> f64 {
    1.0
}

fn default_trading_bar_width() -> f64 {
    0.02
}
