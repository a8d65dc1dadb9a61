use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

use super::{DataLabels, Plot, PrimitiveStream, RecordPrimitives, map_point};
use crate::core::{Axis, DataPoint, NormalizedPoint, PlotRange, PlotSpace};
use crate::data::{DataSource, fields, require_field};
use crate::error::PlotResult;
use crate::render::{GeometricPrimitive, StyleRef};

/// How consecutive points are connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Straight segment between points.
    #[default]
    Linear,
    /// Horizontal run at the previous value, then a vertical jump.
    Stepped,
}

/// Fill between the data line and a horizontal base value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaFill {
    pub base_value: f64,
    pub style: StyleRef,
}

/// Points, optionally connected, optionally filled down to a base value.
#[derive(Debug, Clone)]
pub struct ScatterPlot {
    identifier: String,
    x_field: String,
    y_field: String,
    line_style: Option<StyleRef>,
    symbol_style: Option<StyleRef>,
    interpolation: Interpolation,
    area: Option<AreaFill>,
    labels: Option<DataLabels>,
}

impl ScatterPlot {
    /// Line and symbols over the conventional `x`/`y` fields.
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            x_field: fields::X.to_owned(),
            y_field: fields::Y.to_owned(),
            line_style: Some(StyleRef::DATA_LINE),
            symbol_style: Some(StyleRef::DATA_SYMBOL),
            interpolation: Interpolation::Linear,
            area: None,
            labels: None,
        }
    }

    #[must_use]
    pub fn with_fields(mut self, x_field: impl Into<String>, y_field: impl Into<String>) -> Self {
        self.x_field = x_field.into();
        self.y_field = y_field.into();
        self
    }

    /// `None` disables connecting lines.
    #[must_use]
    pub fn with_line_style(mut self, style: Option<StyleRef>) -> Self {
        self.line_style = style;
        self
    }

    /// `None` disables point symbols.
    #[must_use]
    pub fn with_symbol_style(mut self, style: Option<StyleRef>) -> Self {
        self.symbol_style = style;
        self
    }

    #[must_use]
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    #[must_use]
    pub fn with_area_fill(mut self, area: Option<AreaFill>) -> Self {
        self.area = area;
        self
    }

    #[must_use]
    pub fn with_data_labels(mut self, labels: Option<DataLabels>) -> Self {
        self.labels = labels;
        self
    }

    /// Index of the plotted record closest to `target`, in normalized units.
    ///
    /// Ties resolve to the lower index.
    pub fn nearest_index(
        &self,
        source: &dyn DataSource,
        space: &PlotSpace,
        target: NormalizedPoint,
    ) -> PlotResult<Option<usize>> {
        let xs = require_field(source, &self.x_field)?;
        let ys = require_field(source, &self.y_field)?;
        let mut best: Option<(usize, f64)> = None;
        for index in 0..source.record_count() {
            let (Some(x), Some(y)) = (xs.get(index), ys.get(index)) else {
                continue;
            };
            let Ok(point) = map_point(space, x, y) else {
                continue;
            };
            let distance = point.distance_squared(target);
            if best.is_none_or(|(_, current)| distance < current) {
                best = Some((index, distance));
            }
        }
        Ok(best.map(|(index, _)| index))
    }
}

impl Plot for ScatterPlot {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn generate_primitives<'a>(
        &'a self,
        source: &'a dyn DataSource,
        space: &'a PlotSpace,
    ) -> PlotResult<PrimitiveStream<'a>> {
        let xs = require_field(source, &self.x_field)?;
        let ys = require_field(source, &self.y_field)?;
        let base = match self.area {
            Some(area) => Some((
                space.map_value_to_plot_space(
                    Axis::Y,
                    space.range(Axis::Y).clamp(area.base_value),
                )?,
                area.style,
            )),
            None => None,
        };

        let mut previous: Option<NormalizedPoint> = None;
        Ok(PrimitiveStream::from_records(
            source.record_count(),
            move |index| {
                let mut out = RecordPrimitives::new();
                let (Some(x), Some(y)) = (xs.get(index), ys.get(index)) else {
                    trace!(plot = %self.identifier, index, "skipping record with missing value");
                    previous = None;
                    return out;
                };
                let point = match map_point(space, x, y) {
                    Ok(point) => point,
                    Err(err) => {
                        previous = None;
                        out.push(Err(err));
                        return out;
                    }
                };

                if let Some(prev) = previous {
                    let corner = NormalizedPoint::new(point.x, prev.y);
                    if let Some((base_y, style)) = base {
                        let vertices: SmallVec<[NormalizedPoint; 4]> = match self.interpolation {
                            Interpolation::Linear => SmallVec::from_buf([
                                prev,
                                point,
                                NormalizedPoint::new(point.x, base_y),
                                NormalizedPoint::new(prev.x, base_y),
                            ]),
                            Interpolation::Stepped => SmallVec::from_buf([
                                prev,
                                corner,
                                NormalizedPoint::new(point.x, base_y),
                                NormalizedPoint::new(prev.x, base_y),
                            ]),
                        };
                        out.push(Ok(GeometricPrimitive::polygon(
                            vertices,
                            style,
                            Some(index),
                        )));
                    }
                    if let Some(style) = self.line_style {
                        match self.interpolation {
                            Interpolation::Linear => out.push(Ok(GeometricPrimitive::segment(
                                prev,
                                point,
                                style,
                                Some(index),
                            ))),
                            Interpolation::Stepped => {
                                out.push(Ok(GeometricPrimitive::segment(
                                    prev,
                                    corner,
                                    style,
                                    Some(index),
                                )));
                                out.push(Ok(GeometricPrimitive::segment(
                                    corner,
                                    point,
                                    style,
                                    Some(index),
                                )));
                            }
                        }
                    }
                }
                if let Some(style) = self.symbol_style {
                    out.push(Ok(GeometricPrimitive::point(point, style, Some(index))));
                }
                if let Some(labels) = &self.labels {
                    out.push(Ok(labels.primitive(point, DataPoint::new(x, y), index)));
                }
                previous = Some(point);
                out
            },
        ))
    }

    fn data_extent(&self, source: &dyn DataSource, axis: Axis) -> PlotResult<Option<PlotRange>> {
        let xs = require_field(source, &self.x_field)?;
        let ys = require_field(source, &self.y_field)?;
        let extent = PlotRange::from_values((0..source.record_count()).filter_map(|index| {
            match (xs.get(index), ys.get(index)) {
                (Some(x), Some(y)) => Some(DataPoint::new(x, y).coordinate(axis)),
                _ => None,
            }
        }));
        Ok(match (axis, self.area, extent) {
            (Axis::Y, Some(area), Some(extent)) => {
                Some(extent.union(PlotRange::new(area.base_value, area.base_value)?)?)
            }
            _ => extent,
        })
    }
}
