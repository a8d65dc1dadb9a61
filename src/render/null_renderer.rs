use crate::error::PlotResult;
use crate::render::{GeometricPrimitive, RenderFrame, Renderer};

/// No-op renderer used by tests and headless usage.
///
/// It still validates frame content so tests can catch invalid geometry before
/// a real backend is introduced.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub last_layer_count: usize,
    pub last_segment_count: usize,
    pub last_label_count: usize,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> PlotResult<()> {
        frame.validate()?;
        self.last_layer_count = frame.layers.len();
        self.last_segment_count = frame
            .primitives()
            .filter(|primitive| matches!(primitive, GeometricPrimitive::LineSegment(_)))
            .count();
        self.last_label_count = frame
            .primitives()
            .filter(|primitive| matches!(primitive, GeometricPrimitive::Label(_)))
            .count();
        Ok(())
    }
}
