use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::NormalizedPoint;
use crate::error::{PlotError, PlotResult};

/// Opaque handle into a host-owned [`Theme`](crate::render::Theme).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleRef(u32);

impl StyleRef {
    pub const AXIS_LINE: Self = Self(0);
    pub const MAJOR_TICK: Self = Self(1);
    pub const MINOR_TICK: Self = Self(2);
    pub const MAJOR_GRID: Self = Self(3);
    pub const MINOR_GRID: Self = Self(4);
    pub const AXIS_LABEL: Self = Self(5);
    pub const DATA_LINE: Self = Self(16);
    pub const DATA_SYMBOL: Self = Self(17);
    pub const DATA_FILL: Self = Self(18);
    pub const DATA_LABEL: Self = Self(19);
    pub const RISING: Self = Self(20);
    pub const FALLING: Self = Self(21);

    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// Symbol marker at one location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointPrimitive {
    pub at: NormalizedPoint,
    pub style: StyleRef,
    pub record: Option<usize>,
}

/// Straight stroke between two locations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentPrimitive {
    pub from: NormalizedPoint,
    pub to: NormalizedPoint,
    pub style: StyleRef,
    pub record: Option<usize>,
}

/// Closed filled region; vertices are listed in drawing order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonPrimitive {
    pub vertices: SmallVec<[NormalizedPoint; 4]>,
    pub style: StyleRef,
    pub record: Option<usize>,
}

/// Where a label sits relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelAlignment {
    #[default]
    Center,
    Above,
    Below,
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPrimitive {
    pub anchor: NormalizedPoint,
    pub text: String,
    pub alignment: LabelAlignment,
    pub style: StyleRef,
    pub record: Option<usize>,
}

/// Renderer-agnostic shape produced by plots and axes.
///
/// Coordinates are normalized plot-space units. `record` names the data-source
/// index a primitive was produced from; axis geometry has none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeometricPrimitive {
    Point(PointPrimitive),
    LineSegment(SegmentPrimitive),
    Polygon(PolygonPrimitive),
    Label(LabelPrimitive),
}

impl GeometricPrimitive {
    #[must_use]
    pub fn point(at: NormalizedPoint, style: StyleRef, record: Option<usize>) -> Self {
        Self::Point(PointPrimitive { at, style, record })
    }

    #[must_use]
    pub fn segment(
        from: NormalizedPoint,
        to: NormalizedPoint,
        style: StyleRef,
        record: Option<usize>,
    ) -> Self {
        Self::LineSegment(SegmentPrimitive {
            from,
            to,
            style,
            record,
        })
    }

    #[must_use]
    pub fn polygon<I>(vertices: I, style: StyleRef, record: Option<usize>) -> Self
    where
        I: IntoIterator<Item = NormalizedPoint>,
    {
        Self::Polygon(PolygonPrimitive {
            vertices: vertices.into_iter().collect(),
            style,
            record,
        })
    }

    #[must_use]
    pub fn label(
        anchor: NormalizedPoint,
        text: impl Into<String>,
        alignment: LabelAlignment,
        style: StyleRef,
        record: Option<usize>,
    ) -> Self {
        Self::Label(LabelPrimitive {
            anchor,
            text: text.into(),
            alignment,
            style,
            record,
        })
    }

    #[must_use]
    pub fn style(&self) -> StyleRef {
        match self {
            Self::Point(point) => point.style,
            Self::LineSegment(segment) => segment.style,
            Self::Polygon(polygon) => polygon.style,
            Self::Label(label) => label.style,
        }
    }

    #[must_use]
    pub fn record(&self) -> Option<usize> {
        match self {
            Self::Point(point) => point.record,
            Self::LineSegment(segment) => segment.record,
            Self::Polygon(polygon) => polygon.record,
            Self::Label(label) => label.record,
        }
    }

    pub fn validate(&self) -> PlotResult<()> {
        let finite = |point: &NormalizedPoint| point.x.is_finite() && point.y.is_finite();
        match self {
            Self::Point(point) if !finite(&point.at) => Err(PlotError::InvalidData(
                "point coordinates must be finite".to_owned(),
            )),
            Self::LineSegment(segment) if !finite(&segment.from) || !finite(&segment.to) => Err(
                PlotError::InvalidData("segment coordinates must be finite".to_owned()),
            ),
            Self::Polygon(polygon) if polygon.vertices.len() < 3 => Err(PlotError::InvalidData(
                "polygon needs at least 3 vertices".to_owned(),
            )),
            Self::Polygon(polygon) if !polygon.vertices.iter().all(finite) => Err(
                PlotError::InvalidData("polygon coordinates must be finite".to_owned()),
            ),
            Self::Label(label) if label.text.is_empty() => Err(PlotError::InvalidData(
                "label text must not be empty".to_owned(),
            )),
            Self::Label(label) if !finite(&label.anchor) => Err(PlotError::InvalidData(
                "label coordinates must be finite".to_owned(),
            )),
            _ => Ok(()),
        }
    }
}
