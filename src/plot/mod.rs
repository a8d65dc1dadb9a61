//! Plots turn data-source records into geometric primitives.
//!
//! Every plot follows the same contract:
//! - required fields are resolved up front; a missing one fails the call with
//!   [`PlotError::MissingField`](crate::error::PlotError::MissingField)
//! - records with a NaN, infinite or absent required value are skipped,
//!   never coerced
//! - primitives come out in data-source index order
//! - the returned stream is lazy and borrows its inputs; calling
//!   `generate_primitives` again restarts from the first record

mod bar;
mod range_plot;
mod scatter;
mod trading_range;

pub use bar::{BarOrientation, BarPlot};
pub use range_plot::RangePlot;
pub use scatter::{AreaFill, Interpolation, ScatterPlot};
pub use trading_range::{OhlcFields, TradingRangePlot, TradingRangeStyle};

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;
use tracing::warn;

use crate::axis::{DecimalFormatter, LabelContext, SharedLabelFormatter};
use crate::core::{Axis, DataPoint, NormalizedPoint, PlotRange, PlotSpace};
use crate::data::DataSource;
use crate::error::PlotResult;
use crate::render::{GeometricPrimitive, LabelAlignment, StyleRef};

/// Renderer-facing output of one plot for one pass.
pub trait Plot: Send + Sync {
    fn identifier(&self) -> &str;

    /// Lazily maps every usable record of `source` through `space`.
    ///
    /// Mapping failures (only possible in reject mode) surface as `Err`
    /// items so the caller decides whether to skip or abort.
    fn generate_primitives<'a>(
        &'a self,
        source: &'a dyn DataSource,
        space: &'a PlotSpace,
    ) -> PlotResult<PrimitiveStream<'a>>;

    /// Extent of the plotted data along `axis`, or `None` without usable data.
    fn data_extent(&self, source: &dyn DataSource, axis: Axis) -> PlotResult<Option<PlotRange>>;
}

/// Primitives emitted for a single record.
pub(crate) type RecordPrimitives = SmallVec<[PlotResult<GeometricPrimitive>; 4]>;

/// Lazy, finite sequence of primitives from one plot.
pub struct PrimitiveStream<'a> {
    inner: Box<dyn Iterator<Item = PlotResult<GeometricPrimitive>> + 'a>,
}

impl fmt::Debug for PrimitiveStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimitiveStream").finish_non_exhaustive()
    }
}

impl<'a> PrimitiveStream<'a> {
    pub(crate) fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = PlotResult<GeometricPrimitive>> + 'a,
    {
        Self {
            inner: Box::new(iter),
        }
    }

    /// Per-record stream over `0..record_count`.
    pub(crate) fn from_records<F>(record_count: usize, emit: F) -> Self
    where
        F: FnMut(usize) -> RecordPrimitives + 'a,
    {
        Self::new((0..record_count).flat_map(emit))
    }

    /// Collects everything, stopping at the first failure.
    pub fn collect_primitives(self) -> PlotResult<Vec<GeometricPrimitive>> {
        self.collect()
    }

    /// Drops failed items, logging each one.
    pub fn skip_failures(self) -> impl Iterator<Item = GeometricPrimitive> + 'a {
        self.inner.filter_map(|item| match item {
            Ok(primitive) => Some(primitive),
            Err(err) => {
                warn!(error = %err, "skipping primitive that failed to map");
                None
            }
        })
    }
}

impl Iterator for PrimitiveStream<'_> {
    type Item = PlotResult<GeometricPrimitive>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

/// Per-record value labels drawn next to plotted data.
#[derive(Clone)]
pub struct DataLabels {
    /// Axis whose value is printed.
    pub value_axis: Axis,
    pub alignment: LabelAlignment,
    /// Distance from the anchor in normalized units, along the alignment.
    pub offset: f64,
    pub style: StyleRef,
    pub formatter: SharedLabelFormatter,
}

impl fmt::Debug for DataLabels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataLabels")
            .field("value_axis", &self.value_axis)
            .field("alignment", &self.alignment)
            .field("offset", &self.offset)
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

impl Default for DataLabels {
    fn default() -> Self {
        Self {
            value_axis: Axis::Y,
            alignment: LabelAlignment::Above,
            offset: 0.01,
            style: StyleRef::DATA_LABEL,
            formatter: Arc::new(DecimalFormatter::with_precision(2)),
        }
    }
}

impl DataLabels {
    pub(crate) fn primitive(
        &self,
        anchor: NormalizedPoint,
        value: DataPoint,
        record: usize,
    ) -> GeometricPrimitive {
        let context = LabelContext {
            axis: self.value_axis,
            step: 0.0,
        };
        let text = self
            .formatter
            .format(value.coordinate(self.value_axis), &context);
        let anchor = match self.alignment {
            LabelAlignment::Center => anchor,
            LabelAlignment::Above => NormalizedPoint::new(anchor.x, anchor.y + self.offset),
            LabelAlignment::Below => NormalizedPoint::new(anchor.x, anchor.y - self.offset),
            LabelAlignment::Left => NormalizedPoint::new(anchor.x - self.offset, anchor.y),
            LabelAlignment::Right => NormalizedPoint::new(anchor.x + self.offset, anchor.y),
        };
        GeometricPrimitive::label(anchor, text, self.alignment, self.style, Some(record))
    }
}

pub(crate) fn map_point(space: &PlotSpace, x: f64, y: f64) -> PlotResult<NormalizedPoint> {
    space.map_to_plot_space(DataPoint::new(x, y))
}

/// Extent of several optional columns, ignoring non-finite values.
pub(crate) fn columns_extent<'a, I>(columns: I) -> Option<PlotRange>
where
    I: IntoIterator<Item = Option<&'a [f64]>>,
{
    PlotRange::from_values(
        columns
            .into_iter()
            .flatten()
            .flat_map(|values| values.iter().copied()),
    )
}
