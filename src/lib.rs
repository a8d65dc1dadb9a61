//! plot-core: a renderer-agnostic 2D plotting core.
//!
//! Data flows one way: a [`data::DataSource`] is read by a [`plot::Plot`]
//! through a [`core::PlotSpace`], producing normalized
//! [`render::GeometricPrimitive`]s. [`axis::AxisModel`]s derive ticks and
//! labels from the same space. [`api::Graph`] ties them together into a
//! layered [`render::RenderFrame`] for whatever backend the host provides.

pub mod api;
pub mod axis;
pub mod core;
pub mod data;
pub mod error;
pub mod plot;
pub mod render;
pub mod telemetry;

pub use api::{DataSources, Graph, GraphConfig};
pub use core::{Axis, ClampMode, DataPoint, NormalizedPoint, PlotRange, PlotSpace, ScaleType};
pub use error::{PlotError, PlotResult};
