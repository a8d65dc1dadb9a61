use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{Plot, PrimitiveStream, RecordPrimitives, columns_extent, map_point};
use crate::core::{Axis, NormalizedPoint, PlotRange, PlotSpace};
use crate::data::{DataSource, fields, require_field};
use crate::error::{PlotError, PlotResult};
use crate::render::{GeometricPrimitive, StyleRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingRangeStyle {
    /// Low-high stem with an open tick on the left and a close tick on the right.
    Ohlc,
    /// Wicks plus a filled open-close body.
    #[default]
    Candlestick,
}

/// Field names a [`TradingRangePlot`] reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OhlcFields {
    pub x: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
}

impl Default for OhlcFields {
    fn default() -> Self {
        Self {
            x: fields::X.to_owned(),
            open: fields::OPEN.to_owned(),
            high: fields::HIGH.to_owned(),
            low: fields::LOW.to_owned(),
            close: fields::CLOSE.to_owned(),
        }
    }
}

/// Open/high/low/close records drawn as OHLC bars or candlesticks.
///
/// A record is rising when `close >= open`.
#[derive(Debug, Clone)]
pub struct TradingRangePlot {
    identifier: String,
    fields: OhlcFields,
    style: TradingRangeStyle,
    bar_width: f64,
    rising_style: StyleRef,
    falling_style: StyleRef,
}

#[derive(Debug, Clone, Copy)]
struct Ohlc {
    x: f64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl Ohlc {
    fn validate(self) -> PlotResult<Self> {
        if self.low > self.high {
            return Err(PlotError::InvalidData(format!(
                "trading range low {} must be <= high {}",
                self.low, self.high
            )));
        }
        Ok(self)
    }

    fn is_rising(self) -> bool {
        self.close >= self.open
    }
}

impl TradingRangePlot {
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            fields: OhlcFields::default(),
            style: TradingRangeStyle::Candlestick,
            bar_width: 0.02,
            rising_style: StyleRef::RISING,
            falling_style: StyleRef::FALLING,
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: OhlcFields) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: TradingRangeStyle) -> Self {
        self.style = style;
        self
    }

    /// Body (or tick span) width in normalized units.
    pub fn with_bar_width(mut self, bar_width: f64) -> PlotResult<Self> {
        if !bar_width.is_finite() || bar_width <= 0.0 {
            return Err(PlotError::InvalidData(
                "bar width must be finite and > 0".to_owned(),
            ));
        }
        self.bar_width = bar_width;
        Ok(self)
    }

    #[must_use]
    pub fn with_direction_styles(mut self, rising: StyleRef, falling: StyleRef) -> Self {
        self.rising_style = rising;
        self.falling_style = falling;
        self
    }

    fn emit(
        &self,
        out: &mut RecordPrimitives,
        space: &PlotSpace,
        bar: Ohlc,
        index: usize,
    ) -> PlotResult<()> {
        let style = if bar.is_rising() {
            self.rising_style
        } else {
            self.falling_style
        };
        let open = map_point(space, bar.x, bar.open)?;
        let close = map_point(space, bar.x, bar.close)?;
        let high = map_point(space, bar.x, bar.high)?;
        let low = map_point(space, bar.x, bar.low)?;
        let half = self.bar_width * 0.5;
        let record = Some(index);

        match self.style {
            TradingRangeStyle::Ohlc => {
                out.push(Ok(GeometricPrimitive::segment(low, high, style, record)));
                out.push(Ok(GeometricPrimitive::segment(
                    NormalizedPoint::new(open.x - half, open.y),
                    open,
                    style,
                    record,
                )));
                out.push(Ok(GeometricPrimitive::segment(
                    close,
                    NormalizedPoint::new(close.x + half, close.y),
                    style,
                    record,
                )));
            }
            TradingRangeStyle::Candlestick => {
                let (bottom, top) = if open.y <= close.y {
                    (open.y, close.y)
                } else {
                    (close.y, open.y)
                };
                if top > bottom {
                    out.push(Ok(GeometricPrimitive::polygon(
                        [
                            NormalizedPoint::new(open.x - half, bottom),
                            NormalizedPoint::new(open.x + half, bottom),
                            NormalizedPoint::new(open.x + half, top),
                            NormalizedPoint::new(open.x - half, top),
                        ],
                        style,
                        record,
                    )));
                } else {
                    // Doji: the body collapses to a line.
                    out.push(Ok(GeometricPrimitive::segment(
                        NormalizedPoint::new(open.x - half, bottom),
                        NormalizedPoint::new(open.x + half, bottom),
                        style,
                        record,
                    )));
                }
                if high.y > top {
                    out.push(Ok(GeometricPrimitive::segment(
                        NormalizedPoint::new(high.x, top),
                        high,
                        style,
                        record,
                    )));
                }
                if low.y < bottom {
                    out.push(Ok(GeometricPrimitive::segment(
                        low,
                        NormalizedPoint::new(low.x, bottom),
                        style,
                        record,
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Plot for TradingRangePlot {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn generate_primitives<'a>(
        &'a self,
        source: &'a dyn DataSource,
        space: &'a PlotSpace,
    ) -> PlotResult<PrimitiveStream<'a>> {
        let xs = require_field(source, &self.fields.x)?;
        let opens = require_field(source, &self.fields.open)?;
        let highs = require_field(source, &self.fields.high)?;
        let lows = require_field(source, &self.fields.low)?;
        let closes = require_field(source, &self.fields.close)?;

        Ok(PrimitiveStream::from_records(
            source.record_count(),
            move |index| {
                let mut out = RecordPrimitives::new();
                let (Some(x), Some(open), Some(high), Some(low), Some(close)) = (
                    xs.get(index),
                    opens.get(index),
                    highs.get(index),
                    lows.get(index),
                    closes.get(index),
                ) else {
                    trace!(plot = %self.identifier, index, "skipping record with missing value");
                    return out;
                };
                let bar = Ohlc {
                    x,
                    open,
                    high,
                    low,
                    close,
                };
                let emitted = bar
                    .validate()
                    .and_then(|bar| self.emit(&mut out, space, bar, index));
                if let Err(err) = emitted {
                    out.push(Err(err));
                }
                out
            },
        ))
    }

    fn data_extent(&self, source: &dyn DataSource, axis: Axis) -> PlotResult<Option<PlotRange>> {
        match axis {
            Axis::X => Ok(columns_extent([Some(
                require_field(source, &self.fields.x)?.values(),
            )])),
            Axis::Y => {
                let lows = require_field(source, &self.fields.low)?;
                let highs = require_field(source, &self.fields.high)?;
                Ok(columns_extent([Some(lows.values()), Some(highs.values())]))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{OhlcFields, TradingRangePlot, TradingRangeStyle};
    use crate::core::{Axis, ClampMode, PlotRange, PlotSpace};
    use crate::data::ColumnDataSource;
    use crate::error::PlotError;
    use crate::plot::Plot;
    use crate::render::{GeometricPrimitive, StyleRef};
    use approx::assert_relative_eq;

    fn source(open: f64, high: f64, low: f64, close: f64) -> ColumnDataSource {
        ColumnDataSource::new()
            .with_field("x", vec![5.0])
            .with_field("open", vec![open])
            .with_field("high", vec![high])
            .with_field("low", vec![low])
            .with_field("close", vec![close])
    }

    fn space() -> PlotSpace {
        PlotSpace::new(
            PlotRange::new(0.0, 10.0).expect("x"),
            PlotRange::new(0.0, 100.0).expect("y"),
        )
    }

    #[test]
    fn rising_candle_has_body_and_wicks() {
        let source = source(40.0, 80.0, 20.0, 60.0);
        let space = space();
        let plot = TradingRangePlot::new("candles");
        let primitives = plot
            .generate_primitives(&source, &space)
            .expect("stream")
            .collect_primitives()
            .expect("primitives");

        assert_eq!(primitives.len(), 3);
        let GeometricPrimitive::Polygon(body) = &primitives[0] else {
            panic!("expected body polygon");
        };
        assert_eq!(body.style, StyleRef::RISING);
        assert_relative_eq!(body.vertices[0].y, 0.4);
        assert_relative_eq!(body.vertices[2].y, 0.6);
        assert_relative_eq!(body.vertices[0].x, 0.49);
    }

    #[test]
    fn doji_body_is_a_segment() {
        let source = source(50.0, 50.0, 50.0, 50.0);
        let space = space();
        let primitives = TradingRangePlot::new("candles")
            .generate_primitives(&source, &space)
            .expect("stream")
            .collect_primitives()
            .expect("primitives");
        assert_eq!(primitives.len(), 1);
        assert!(matches!(primitives[0], GeometricPrimitive::LineSegment(_)));
    }

    #[test]
    fn ohlc_uses_falling_style_for_falling_records() {
        let source = source(60.0, 80.0, 20.0, 40.0);
        let space = space();
        let primitives = TradingRangePlot::new("ohlc")
            .with_style(TradingRangeStyle::Ohlc)
            .generate_primitives(&source, &space)
            .expect("stream")
            .collect_primitives()
            .expect("primitives");
        assert_eq!(primitives.len(), 3);
        assert!(
            primitives
                .iter()
                .all(|primitive| primitive.style() == StyleRef::FALLING)
        );
    }

    #[test]
    fn inverted_low_high_yields_error_item() {
        let source = source(50.0, 20.0, 80.0, 50.0);
        let space = space();
        let items: Vec<_> = TradingRangePlot::new("candles")
            .generate_primitives(&source, &space)
            .expect("stream")
            .collect();
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(PlotError::InvalidData(_))));
    }

    #[test]
    fn reject_mode_surfaces_out_of_range() {
        let source = source(40.0, 180.0, 20.0, 60.0);
        let space = space().with_clamp_mode(ClampMode::Reject);
        let items: Vec<_> = TradingRangePlot::new("candles")
            .generate_primitives(&source, &space)
            .expect("stream")
            .collect();
        assert_eq!(items.len(), 1);
        assert!(matches!(
            items[0],
            Err(PlotError::OutOfRange { axis: Axis::Y, .. })
        ));
    }

    #[test]
    fn extent_spans_lows_and_highs() {
        let source = source(40.0, 80.0, 20.0, 60.0);
        let extent = TradingRangePlot::new("candles")
            .data_extent(&source, Axis::Y)
            .expect("extent")
            .expect("some");
        assert_relative_eq!(extent.min(), 20.0);
        assert_relative_eq!(extent.max(), 80.0);
    }

    #[test]
    fn custom_field_names_are_read() {
        let source = ColumnDataSource::new()
            .with_field("t", vec![5.0])
            .with_field("o", vec![40.0])
            .with_field("h", vec![80.0])
            .with_field("l", vec![20.0])
            .with_field("c", vec![60.0]);
        let space = space();
        let fields = OhlcFields {
            x: "t".to_owned(),
            open: "o".to_owned(),
            high: "h".to_owned(),
            low: "l".to_owned(),
            close: "c".to_owned(),
        };
        let plot = TradingRangePlot::new("candles").with_fields(fields);
        let primitives = plot
            .generate_primitives(&source, &space)
            .expect("stream")
            .collect_primitives()
            .expect("primitives");
        assert_eq!(primitives.len(), 3);
        let extent = plot
            .data_extent(&source, Axis::Y)
            .expect("extent")
            .expect("some");
        assert_relative_eq!(extent.max(), 80.0);

        assert!(matches!(
            TradingRangePlot::new("candles").generate_primitives(&source, &space),
            Err(PlotError::MissingField { .. })
        ));
    }
}
