use tracing::trace;

use super::{Plot, PrimitiveStream, RecordPrimitives, map_point};
use crate::core::{Axis, NormalizedPoint, PlotRange, PlotSpace};
use crate::data::{DataSource, FieldView, fields, optional_field, require_field};
use crate::error::{PlotError, PlotResult};
use crate::render::{GeometricPrimitive, StyleRef};

/// Error bars around a centre point.
///
/// `high`/`low` are distances above and below `y`, `left`/`right` distances
/// on either side of `x`. Absent or non-finite distances draw no bar on that side.
#[derive(Debug, Clone)]
pub struct RangePlot {
    identifier: String,
    x_field: String,
    y_field: String,
    bar_style: StyleRef,
    cap_width: f64,
    symbol_style: Option<StyleRef>,
    area_style: Option<StyleRef>,
}

#[derive(Clone, Copy)]
struct Offsets<'a> {
    high: Option<FieldView<'a>>,
    low: Option<FieldView<'a>>,
    left: Option<FieldView<'a>>,
    right: Option<FieldView<'a>>,
}

impl<'a> Offsets<'a> {
    fn resolve(source: &'a dyn DataSource) -> Self {
        Self {
            high: optional_field(source, fields::HIGH),
            low: optional_field(source, fields::LOW),
            left: optional_field(source, fields::LEFT),
            right: optional_field(source, fields::RIGHT),
        }
    }

    fn at(field: Option<FieldView<'_>>, index: usize) -> Option<f64> {
        field.and_then(|view| view.get(index))
    }
}

impl RangePlot {
    /// Plain error bars without caps, symbols or fill.
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            x_field: fields::X.to_owned(),
            y_field: fields::Y.to_owned(),
            bar_style: StyleRef::DATA_LINE,
            cap_width: 0.0,
            symbol_style: None,
            area_style: None,
        }
    }

    #[must_use]
    pub fn with_fields(mut self, x_field: impl Into<String>, y_field: impl Into<String>) -> Self {
        self.x_field = x_field.into();
        self.y_field = y_field.into();
        self
    }

    #[must_use]
    pub fn with_bar_style(mut self, style: StyleRef) -> Self {
        self.bar_style = style;
        self
    }

    /// Cap length across each bar end, in normalized units. `0.0` disables caps.
    pub fn with_cap_width(mut self, cap_width: f64) -> PlotResult<Self> {
        if !cap_width.is_finite() || cap_width < 0.0 {
            return Err(PlotError::InvalidData(
                "cap width must be finite and >= 0".to_owned(),
            ));
        }
        self.cap_width = cap_width;
        Ok(self)
    }

    #[must_use]
    pub fn with_symbol_style(mut self, style: Option<StyleRef>) -> Self {
        self.symbol_style = style;
        self
    }

    /// Fills the band between consecutive high/low ends.
    #[must_use]
    pub fn with_area_style(mut self, style: Option<StyleRef>) -> Self {
        self.area_style = style;
        self
    }

    fn cap(&self, out: &mut RecordPrimitives, end: NormalizedPoint, across: Axis, index: usize) {
        if self.cap_width <= 0.0 {
            return;
        }
        let half = self.cap_width * 0.5;
        let (from, to) = match across {
            Axis::X => (
                NormalizedPoint::new(end.x - half, end.y),
                NormalizedPoint::new(end.x + half, end.y),
            ),
            Axis::Y => (
                NormalizedPoint::new(end.x, end.y - half),
                NormalizedPoint::new(end.x, end.y + half),
            ),
        };
        out.push(Ok(GeometricPrimitive::segment(
            from,
            to,
            self.bar_style,
            Some(index),
        )));
    }

    /// Bar along `axis` between the centre minus `below` and plus `above`.
    fn bar(
        &self,
        out: &mut RecordPrimitives,
        space: &PlotSpace,
        (x, y): (f64, f64),
        axis: Axis,
        (below, above): (Option<f64>, Option<f64>),
        index: usize,
    ) {
        if below.is_none() && above.is_none() {
            return;
        }
        let shifted = |delta: f64| match axis {
            Axis::X => map_point(space, x + delta, y),
            Axis::Y => map_point(space, x, y + delta),
        };
        let ends = (
            shifted(-below.unwrap_or(0.0)),
            shifted(above.unwrap_or(0.0)),
        );
        let (start, end) = match ends {
            (Ok(start), Ok(end)) => (start, end),
            (Err(err), _) | (_, Err(err)) => {
                out.push(Err(err));
                return;
            }
        };
        out.push(Ok(GeometricPrimitive::segment(
            start,
            end,
            self.bar_style,
            Some(index),
        )));
        let across = axis.orthogonal();
        if below.is_some() {
            self.cap(out, start, across, index);
        }
        if above.is_some() {
            self.cap(out, end, across, index);
        }
    }
}

impl Plot for RangePlot {
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
        let offsets = Offsets::resolve(source);

        // Previous high/low band ends, for the area fill.
        let mut previous: Option<(NormalizedPoint, NormalizedPoint)> = None;
        Ok(PrimitiveStream::from_records(
            source.record_count(),
            move |index| {
                let mut out = RecordPrimitives::new();
                let (Some(x), Some(y)) = (xs.get(index), ys.get(index)) else {
                    trace!(plot = %self.identifier, index, "skipping record with missing value");
                    previous = None;
                    return out;
                };
                let center = match map_point(space, x, y) {
                    Ok(center) => center,
                    Err(err) => {
                        previous = None;
                        out.push(Err(err));
                        return out;
                    }
                };

                let high = Offsets::at(offsets.high, index);
                let low = Offsets::at(offsets.low, index);
                if let Some(style) = self.area_style {
                    let band = match (high, low) {
                        (Some(high), Some(low)) => map_point(space, x, y + high)
                            .and_then(|top| Ok((top, map_point(space, x, y - low)?)))
                            .ok(),
                        _ => None,
                    };
                    if let (Some((prev_top, prev_bottom)), Some((top, bottom))) = (previous, band) {
                        out.push(Ok(GeometricPrimitive::polygon(
                            [prev_top, top, bottom, prev_bottom],
                            style,
                            Some(index),
                        )));
                    }
                    previous = band;
                }

                self.bar(&mut out, space, (x, y), Axis::Y, (low, high), index);
                self.bar(
                    &mut out,
                    space,
                    (x, y),
                    Axis::X,
                    (
                        Offsets::at(offsets.left, index),
                        Offsets::at(offsets.right, index),
                    ),
                    index,
                );
                if let Some(style) = self.symbol_style {
                    out.push(Ok(GeometricPrimitive::point(center, style, Some(index))));
                }
                out
            },
        ))
    }

    fn data_extent(&self, source: &dyn DataSource, axis: Axis) -> PlotResult<Option<PlotRange>> {
        let xs = require_field(source, &self.x_field)?;
        let ys = require_field(source, &self.y_field)?;
        let offsets = Offsets::resolve(source);
        let (below, above) = match axis {
            Axis::X => (offsets.left, offsets.right),
            Axis::Y => (offsets.low, offsets.high),
        };

        let mut values = Vec::with_capacity(source.record_count() * 2);
        for index in 0..source.record_count() {
            let (Some(x), Some(y)) = (xs.get(index), ys.get(index)) else {
                continue;
            };
            let center = match axis {
                Axis::X => x,
                Axis::Y => y,
            };
            values.push(center - Offsets::at(below, index).unwrap_or(0.0));
            values.push(center + Offsets::at(above, index).unwrap_or(0.0));
        }
        Ok(PlotRange::from_values(values))
    }
}

#[cfg(test)]
mod tests {
    use super::RangePlot;
    use crate::core::{Axis, PlotRange, PlotSpace};
    use crate::data::ColumnDataSource;
    use crate::plot::Plot;
    use crate::render::{GeometricPrimitive, StyleRef};
    use approx::assert_relative_eq;

    fn space() -> PlotSpace {
        PlotSpace::new(
            PlotRange::new(0.0, 10.0).expect("x"),
            PlotRange::new(0.0, 10.0).expect("y"),
        )
    }

    #[test]
    fn vertical_bar_with_caps_and_symbol() {
        let source = ColumnDataSource::new()
            .with_field("x", vec![5.0])
            .with_field("y", vec![5.0])
            .with_field("high", vec![2.0])
            .with_field("low", vec![1.0]);
        let space = space();
        let plot = RangePlot::new("errors")
            .with_cap_width(0.1)
            .expect("cap")
            .with_symbol_style(Some(StyleRef::DATA_SYMBOL));
        let primitives = plot
            .generate_primitives(&source, &space)
            .expect("stream")
            .collect_primitives()
            .expect("primitives");

        assert_eq!(primitives.len(), 4);
        let GeometricPrimitive::LineSegment(bar) = &primitives[0] else {
            panic!("expected bar segment");
        };
        assert_relative_eq!(bar.from.y, 0.4);
        assert_relative_eq!(bar.to.y, 0.7);
        let GeometricPrimitive::LineSegment(cap) = &primitives[2] else {
            panic!("expected cap segment");
        };
        assert_relative_eq!(cap.from.x, 0.45);
        assert_relative_eq!(cap.to.x, 0.55);
        assert!(matches!(primitives[3], GeometricPrimitive::Point(_)));
    }

    #[test]
    fn area_breaks_at_skipped_records() {
        let source = ColumnDataSource::new()
            .with_field("x", vec![1.0, 2.0, 3.0, 4.0])
            .with_field("y", vec![5.0, f64::NAN, 5.0, 5.0])
            .with_field("high", vec![1.0, 1.0, 1.0, 1.0])
            .with_field("low", vec![1.0, 1.0, 1.0, 1.0]);
        let space = space();
        let plot = RangePlot::new("band").with_area_style(Some(StyleRef::DATA_FILL));
        let polygons: Vec<_> = plot
            .generate_primitives(&source, &space)
            .expect("stream")
            .collect_primitives()
            .expect("primitives")
            .into_iter()
            .filter(|primitive| matches!(primitive, GeometricPrimitive::Polygon(_)))
            .collect();
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].record(), Some(3));
    }

    #[test]
    fn extent_includes_offsets() {
        let source = ColumnDataSource::new()
            .with_field("x", vec![1.0, 4.0])
            .with_field("y", vec![2.0, 3.0])
            .with_field("high", vec![0.5, 2.0])
            .with_field("left", vec![1.0, f64::NAN]);
        let plot = RangePlot::new("errors");
        let y = plot.data_extent(&source, Axis::Y).expect("y").expect("some");
        assert_relative_eq!(y.min(), 2.0);
        assert_relative_eq!(y.max(), 5.0);
        let x = plot.data_extent(&source, Axis::X).expect("x").expect("some");
        assert_relative_eq!(x.min(), 0.0);
        assert_relative_eq!(x.max(), 4.0);
    }
}
