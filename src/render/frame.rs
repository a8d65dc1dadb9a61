use serde::{Deserialize, Serialize};

use crate::error::PlotResult;
use crate::render::GeometricPrimitive;

/// Draw layer a group of primitives belongs to, listed back to front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Grid,
    Plot,
    Axis,
}

/// Primitives from one producer (a plot or an axis) within a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameLayer {
    pub kind: LayerKind,
    /// Identifier of the plot or axis that produced the primitives.
    pub source: String,
    pub primitives: Vec<GeometricPrimitive>,
}

/// Backend-agnostic scene for one render pass.
///
/// Layers are stored in draw order; primitives within a layer keep the order
/// their producer emitted them in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub layers: Vec<FrameLayer>,
}

impl RenderFrame {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_layer(
        mut self,
        kind: LayerKind,
        source: impl Into<String>,
        primitives: Vec<GeometricPrimitive>,
    ) -> Self {
        self.push_layer(kind, source, primitives);
        self
    }

    pub fn push_layer(
        &mut self,
        kind: LayerKind,
        source: impl Into<String>,
        primitives: Vec<GeometricPrimitive>,
    ) {
        self.layers.push(FrameLayer {
            kind,
            source: source.into(),
            primitives,
        });
    }

    /// Layer produced by `source`, if any.
    #[must_use]
    pub fn layer(&self, kind: LayerKind, source: &str) -> Option<&FrameLayer> {
        self.layers
            .iter()
            .find(|layer| layer.kind == kind && layer.source == source)
    }

    /// All primitives in draw order.
    pub fn primitives(&self) -> impl Iterator<Item = &GeometricPrimitive> {
        self.layers.iter().flat_map(|layer| layer.primitives.iter())
    }

    pub fn validate(&self) -> PlotResult<()> {
        for primitive in self.primitives() {
            primitive.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|layer| layer.primitives.is_empty())
    }
}
