use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

use super::{DataLabels, Plot, PrimitiveStream, RecordPrimitives, columns_extent, map_point};
use crate::core::{Axis, DataPoint, NormalizedPoint, PlotRange, PlotSpace};
use crate::data::{DataSource, fields, require_field};
use crate::error::{PlotError, PlotResult};
use crate::render::{GeometricPrimitive, StyleRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarOrientation {
    /// Locations along x, bars grow along y.
    #[default]
    Vertical,
    /// Locations along y, bars grow along x.
    Horizontal,
}

impl BarOrientation {
    #[must_use]
    pub const fn location_axis(self) -> Axis {
        match self {
            Self::Vertical => Axis::X,
            Self::Horizontal => Axis::Y,
        }
    }

    fn point(self, location: f64, value: f64) -> DataPoint {
        match self {
            Self::Vertical => DataPoint::new(location, value),
            Self::Horizontal => DataPoint::new(value, location),
        }
    }
}

/// One rectangle per record from a base value up to the record's tip.
#[derive(Debug, Clone)]
pub struct BarPlot {
    identifier: String,
    location_field: String,
    tip_field: String,
    base_field: Option<String>,
    base_value: f64,
    bar_width: f64,
    bar_offset: f64,
    orientation: BarOrientation,
    style: StyleRef,
    labels: Option<DataLabels>,
}

impl BarPlot {
    /// Vertical bars of width `1.0` from `0.0` over `bar_location`/`bar_tip`.
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            location_field: fields::BAR_LOCATION.to_owned(),
            tip_field: fields::BAR_TIP.to_owned(),
            base_field: None,
            base_value: 0.0,
            bar_width: 1.0,
            bar_offset: 0.0,
            orientation: BarOrientation::Vertical,
            style: StyleRef::DATA_FILL,
            labels: None,
        }
    }

    #[must_use]
    pub fn with_fields(
        mut self,
        location_field: impl Into<String>,
        tip_field: impl Into<String>,
    ) -> Self {
        self.location_field = location_field.into();
        self.tip_field = tip_field.into();
        self
    }

    /// Reads each bar's base from a field instead of the fixed base value.
    #[must_use]
    pub fn with_base_field(mut self, base_field: Option<String>) -> Self {
        self.base_field = base_field;
        self
    }

    pub fn with_base_value(mut self, base_value: f64) -> PlotResult<Self> {
        if !base_value.is_finite() {
            return Err(PlotError::InvalidData(
                "bar base value must be finite".to_owned(),
            ));
        }
        self.base_value = base_value;
        Ok(self)
    }

    /// Bar width and offset from the location, both in data units.
    pub fn with_bar_geometry(mut self, bar_width: f64, bar_offset: f64) -> PlotResult<Self> {
        if !bar_width.is_finite() || bar_width <= 0.0 || !bar_offset.is_finite() {
            return Err(PlotError::InvalidData(
                "bar width must be finite and > 0 with a finite offset".to_owned(),
            ));
        }
        self.bar_width = bar_width;
        self.bar_offset = bar_offset;
        Ok(self)
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: BarOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: StyleRef) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_data_labels(mut self, labels: Option<DataLabels>) -> Self {
        self.labels = labels;
        self
    }
}

impl Plot for BarPlot {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn generate_primitives<'a>(
        &'a self,
        source: &'a dyn DataSource,
        space: &'a PlotSpace,
    ) -> PlotResult<PrimitiveStream<'a>> {
        let locations = require_field(source, &self.location_field)?;
        let tips = require_field(source, &self.tip_field)?;
        let bases = self
            .base_field
            .as_deref()
            .map(|name| require_field(source, name))
            .transpose()?;

        let half = self.bar_width * 0.5;
        let orientation = self.orientation;
        Ok(PrimitiveStream::from_records(
            source.record_count(),
            move |index| {
                let mut out = RecordPrimitives::new();
                let base = match bases {
                    Some(bases) => bases.get(index),
                    None => Some(self.base_value),
                };
                let (Some(location), Some(tip), Some(base)) =
                    (locations.get(index), tips.get(index), base)
                else {
                    trace!(plot = %self.identifier, index, "skipping record with missing value");
                    return out;
                };

                let center = location + self.bar_offset;
                let corners = [
                    orientation.point(center - half, base),
                    orientation.point(center + half, base),
                    orientation.point(center + half, tip),
                    orientation.point(center - half, tip),
                ];
                let mapped: PlotResult<SmallVec<[NormalizedPoint; 4]>> = corners
                    .iter()
                    .map(|corner| map_point(space, corner.x, corner.y))
                    .collect();
                match mapped {
                    Ok(vertices) => {
                        let tip_center = NormalizedPoint::new(
                            (vertices[2].x + vertices[3].x) * 0.5,
                            (vertices[2].y + vertices[3].y) * 0.5,
                        );
                        out.push(Ok(GeometricPrimitive::polygon(
                            vertices,
                            self.style,
                            Some(index),
                        )));
                        if let Some(labels) = &self.labels {
                            out.push(Ok(labels.primitive(
                                tip_center,
                                orientation.point(location, tip),
                                index,
                            )));
                        }
                    }
                    Err(err) => out.push(Err(err)),
                }
                out
            },
        ))
    }

    fn data_extent(&self, source: &dyn DataSource, axis: Axis) -> PlotResult<Option<PlotRange>> {
        let locations = require_field(source, &self.location_field)?;
        let tips = require_field(source, &self.tip_field)?;
        if axis == self.orientation.location_axis() {
            let half = self.bar_width * 0.5;
            let centers = columns_extent([Some(locations.values())]);
            return centers
                .map(|extent| {
                    PlotRange::new(
                        extent.min() + self.bar_offset - half,
                        extent.max() + self.bar_offset + half,
                    )
                })
                .transpose();
        }

        let values = match &self.base_field {
            Some(name) => columns_extent([
                Some(tips.values()),
                Some(require_field(source, name)?.values()),
            ]),
            None => match columns_extent([Some(tips.values())]) {
                Some(extent) => {
                    Some(extent.union(PlotRange::new(self.base_value, self.base_value)?)?)
                }
                None => None,
            },
        };
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::{BarOrientation, BarPlot};
    use crate::core::{Axis, PlotRange, PlotSpace};
    use crate::data::ColumnDataSource;
    use crate::plot::Plot;
    use crate::render::GeometricPrimitive;
    use approx::assert_relative_eq;

    fn source() -> ColumnDataSource {
        ColumnDataSource::new()
            .with_field("bar_location", vec![1.0, 2.0, 3.0])
            .with_field("bar_tip", vec![5.0, f64::NAN, 10.0])
    }

    fn space() -> PlotSpace {
        PlotSpace::new(
            PlotRange::new(0.0, 4.0).expect("x"),
            PlotRange::new(0.0, 10.0).expect("y"),
        )
    }

    #[test]
    fn vertical_bars_span_base_to_tip() {
        let source = source();
        let space = space();
        let plot = BarPlot::new("bars")
            .with_bar_geometry(0.5, 0.0)
            .expect("geometry");
        let primitives = plot
            .generate_primitives(&source, &space)
            .expect("stream")
            .collect_primitives()
            .expect("primitives");

        assert_eq!(primitives.len(), 2);
        let GeometricPrimitive::Polygon(first) = &primitives[0] else {
            panic!("expected polygon");
        };
        assert_eq!(first.record, Some(0));
        assert_relative_eq!(first.vertices[0].x, 0.1875);
        assert_relative_eq!(first.vertices[0].y, 0.0);
        assert_relative_eq!(first.vertices[2].x, 0.3125);
        assert_relative_eq!(first.vertices[2].y, 0.5);
        assert_eq!(primitives[1].record(), Some(2));
    }

    #[test]
    fn horizontal_bars_swap_axes() {
        let source = source();
        let space = PlotSpace::new(
            PlotRange::new(0.0, 10.0).expect("x"),
            PlotRange::new(0.0, 4.0).expect("y"),
        );
        let plot = BarPlot::new("bars").with_orientation(BarOrientation::Horizontal);
        let primitives = plot
            .generate_primitives(&source, &space)
            .expect("stream")
            .collect_primitives()
            .expect("primitives");
        let GeometricPrimitive::Polygon(last) = &primitives[1] else {
            panic!("expected polygon");
        };
        assert_relative_eq!(last.vertices[2].x, 1.0);
        assert_relative_eq!(last.vertices[2].y, 0.875);
    }

    #[test]
    fn extent_covers_bar_width_and_base() {
        let source = source();
        let plot = BarPlot::new("bars")
            .with_base_value(-2.0)
            .expect("base");
        let x = plot.data_extent(&source, Axis::X).expect("x").expect("some");
        assert_relative_eq!(x.min(), 0.5);
        assert_relative_eq!(x.max(), 3.5);
        let y = plot.data_extent(&source, Axis::Y).expect("y").expect("some");
        assert_relative_eq!(y.min(), -2.0);
        assert_relative_eq!(y.max(), 10.0);
    }

    #[test]
    fn rejects_non_positive_width() {
        assert!(BarPlot::new("bars").with_bar_geometry(0.0, 0.0).is_err());
        assert!(BarPlot::new("bars").with_base_value(f64::NAN).is_err());
    }
}
