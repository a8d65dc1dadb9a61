mod frame;
mod null_renderer;
mod primitives;
mod style;

pub use frame::{FrameLayer, LayerKind, RenderFrame};
pub use null_renderer::NullRenderer;
pub use primitives::{
    GeometricPrimitive, LabelAlignment, LabelPrimitive, PointPrimitive, PolygonPrimitive,
    SegmentPrimitive, StyleRef,
};
pub use style::{
    Color, FillStyle, LineCap, LineStyle, Style, SymbolShape, SymbolStyle, TextStyle, Theme,
};

use crate::error::PlotResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized, deterministic `RenderFrame` so
/// drawing code remains isolated from plot-space and data-source logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> PlotResult<()>;
}
