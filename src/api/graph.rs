use std::fmt;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::axis::AxisModel;
use crate::core::{Axis, FitTuning, PlotRange, PlotSpace};
use crate::data::DataSource;
use crate::error::{PlotError, PlotResult};
use crate::plot::Plot;
use crate::render::{GeometricPrimitive, LayerKind, RenderFrame, Renderer, Theme};

/// Named data sources borrowed for one render pass.
#[derive(Default)]
pub struct DataSources<'a> {
    sources: IndexMap<String, &'a dyn DataSource>,
}

impl fmt::Debug for DataSources<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSources")
            .field("names", &self.sources.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<'a> DataSources<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_source(mut self, name: impl Into<String>, source: &'a dyn DataSource) -> Self {
        self.insert(name, source);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, source: &'a dyn DataSource) {
        self.sources.insert(name.into(), source);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a dyn DataSource> {
        self.sources.get(name).copied()
    }

    fn require(&self, name: &str, plot: &str) -> PlotResult<&'a dyn DataSource> {
        self.get(name).ok_or_else(|| {
            PlotError::InvalidData(format!(
                "plot `{plot}` is bound to unknown data source `{name}`"
            ))
        })
    }
}

struct BoundPlot {
    plot: Box<dyn Plot>,
    source: String,
}

/// What a render pass does with primitives that fail to map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureHandling {
    Abort,
    Skip,
}

/// One plot space with its plots, axes and theme.
///
/// Plots draw in insertion order. A render pass produces grid layers first,
/// then one layer per plot, then one layer per axis.
pub struct Graph {
    identifier: String,
    space: PlotSpace,
    plots: Vec<BoundPlot>,
    axes: Vec<AxisModel>,
    theme: Theme,
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("identifier", &self.identifier)
            .field("space", &self.space)
            .field("plots", &self.plot_identifiers().collect::<Vec<_>>())
            .field("axes", &self.axes)
            .field("theme", &self.theme.name())
            .finish()
    }
}

impl Graph {
    /// Empty graph using the plain white theme.
    #[must_use]
    pub fn new(identifier: impl Into<String>, space: PlotSpace) -> Self {
        Self {
            identifier: identifier.into(),
            space,
            plots: Vec::new(),
            axes: Vec::new(),
            theme: Theme::plain_white(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> PlotResult<Self> {
        self.set_theme(theme)?;
        Ok(self)
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn plot_space(&self) -> &PlotSpace {
        &self.space
    }

    #[must_use]
    pub fn plot_space_mut(&mut self) -> &mut PlotSpace {
        &mut self.space
    }

    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: Theme) -> PlotResult<()> {
        theme.validate()?;
        self.theme = theme;
        Ok(())
    }

    /// Appends a plot reading from the data source registered as `source`.
    ///
    /// Plot identifiers must be unique within the graph.
    pub fn add_plot<P>(&mut self, plot: P, source: impl Into<String>) -> PlotResult<()>
    where
        P: Plot + 'static,
    {
        self.add_boxed_plot(Box::new(plot), source.into())
    }

    pub(crate) fn add_boxed_plot(
        &mut self,
        plot: Box<dyn Plot>,
        source: String,
    ) -> PlotResult<()> {
        if self.plot(plot.identifier()).is_some() {
            return Err(PlotError::InvalidData(format!(
                "duplicate plot identifier `{}`",
                plot.identifier()
            )));
        }
        debug!(graph = %self.identifier, plot = %plot.identifier(), source = %source, "add plot");
        self.plots.push(BoundPlot { plot, source });
        Ok(())
    }

    /// Removes a plot, returning whether it existed.
    pub fn remove_plot(&mut self, identifier: &str) -> bool {
        let before = self.plots.len();
        self.plots.retain(|bound| bound.plot.identifier() != identifier);
        let removed = self.plots.len() != before;
        if removed {
            debug!(graph = %self.identifier, plot = identifier, "remove plot");
        }
        removed
    }

    #[must_use]
    pub fn plot(&self, identifier: &str) -> Option<&dyn Plot> {
        self.plots
            .iter()
            .find(|bound| bound.plot.identifier() == identifier)
            .map(|bound| bound.plot.as_ref())
    }

    pub fn plot_identifiers(&self) -> impl Iterator<Item = &str> {
        self.plots.iter().map(|bound| bound.plot.identifier())
    }

    /// Appends an axis model. Axis identifiers must be unique within the graph.
    pub fn add_axis(&mut self, axis: AxisModel) -> PlotResult<()> {
        if self
            .axes
            .iter()
            .any(|existing| existing.identifier() == axis.identifier())
        {
            return Err(PlotError::InvalidData(format!(
                "duplicate axis identifier `{}`",
                axis.identifier()
            )));
        }
        self.axes.push(axis);
        Ok(())
    }

    #[must_use]
    pub fn axes(&self) -> &[AxisModel] {
        &self.axes
    }

    /// Builds the layered frame for the current plot space.
    ///
    /// The first primitive that fails to map aborts the pass.
    pub fn render(&self, sources: &DataSources<'_>) -> PlotResult<RenderFrame> {
        self.render_pass(sources, FailureHandling::Abort)
    }

    /// Like [`Graph::render`], but primitives that fail to map are dropped
    /// with a warning. Missing fields and unknown sources still fail.
    pub fn render_skipping_failures(
        &self,
        sources: &DataSources<'_>,
    ) -> PlotResult<RenderFrame> {
        self.render_pass(sources, FailureHandling::Skip)
    }

    /// Renders and hands the frame to `renderer`.
    pub fn render_with<R>(&self, renderer: &mut R, sources: &DataSources<'_>) -> PlotResult<()>
    where
        R: Renderer + ?Sized,
    {
        let frame = self.render(sources)?;
        renderer.render(&frame)
    }

    fn render_pass(
        &self,
        sources: &DataSources<'_>,
        handling: FailureHandling,
    ) -> PlotResult<RenderFrame> {
        let mut frame = RenderFrame::new();

        for axis in &self.axes {
            let grid = axis.grid_primitives(&self.space)?;
            if !grid.is_empty() {
                frame.push_layer(LayerKind::Grid, axis.identifier(), grid);
            }
        }

        for bound in &self.plots {
            let identifier = bound.plot.identifier();
            let source = sources.require(&bound.source, identifier)?;
            let stream = bound.plot.generate_primitives(source, &self.space)?;
            let primitives: Vec<GeometricPrimitive> = match handling {
                FailureHandling::Abort => stream.collect_primitives()?,
                FailureHandling::Skip => stream.skip_failures().collect(),
            };
            frame.push_layer(LayerKind::Plot, identifier, primitives);
        }

        for axis in &self.axes {
            frame.push_layer(
                LayerKind::Axis,
                axis.identifier(),
                axis.axis_primitives(&self.space)?,
            );
        }

        debug!(
            graph = %self.identifier,
            layers = frame.layers.len(),
            primitives = frame.primitives().count(),
            "render pass complete"
        );
        Ok(frame)
    }

    /// Union of every plot's data extent along `axis`.
    pub fn data_extent(
        &self,
        sources: &DataSources<'_>,
        axis: Axis,
    ) -> PlotResult<Option<PlotRange>> {
        let mut extent: Option<PlotRange> = None;
        for bound in &self.plots {
            let source = sources.require(&bound.source, bound.plot.identifier())?;
            if let Some(plot_extent) = bound.plot.data_extent(source, axis)? {
                extent = Some(match extent {
                    Some(current) => current.union(plot_extent)?,
                    None => plot_extent,
                });
            }
        }
        Ok(extent)
    }

    /// Fits the plot space around the data of every plot.
    ///
    /// Axes without usable data keep their range. A fit rejected by the plot
    /// space leaves both ranges unchanged.
    pub fn scale_to_fit(
        &mut self,
        sources: &DataSources<'_>,
        tuning: FitTuning,
    ) -> PlotResult<()> {
        let x = self.data_extent(sources, Axis::X)?;
        let y = self.data_extent(sources, Axis::Y)?;
        if x.is_none() && y.is_none() {
            debug!(graph = %self.identifier, "scale to fit skipped: no plotted data");
            return Ok(());
        }
        self.space.scale_to_fit(x, y, tuning).inspect_err(|err| {
            warn!(graph = %self.identifier, error = %err, "scale to fit rejected");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DataSources, Graph};
    use crate::axis::AxisModel;
    use crate::core::{Axis, ClampMode, FitTuning, PlotRange, PlotSpace};
    use crate::data::ColumnDataSource;
    use crate::error::PlotError;
    use crate::plot::ScatterPlot;
    use crate::render::{LayerKind, NullRenderer};

    fn space() -> PlotSpace {
        PlotSpace::new(
            PlotRange::new(0.0, 10.0).expect("x"),
            PlotRange::new(0.0, 10.0).expect("y"),
        )
    }

    fn data() -> ColumnDataSource {
        ColumnDataSource::new()
            .with_field("x", vec![1.0, 2.0, 3.0])
            .with_field("y", vec![2.0, 4.0, 8.0])
    }

    #[test]
    fn layers_follow_grid_plot_axis_order() {
        let data = data();
        let sources = DataSources::new().with_source("main", &data);
        let mut graph = Graph::new("graph", space());
        graph
            .add_axis(AxisModel::new("x-axis", Axis::X).with_grid_lines(true, false))
            .expect("axis");
        graph.add_plot(ScatterPlot::new("first"), "main").expect("plot");
        graph.add_plot(ScatterPlot::new("second"), "main").expect("plot");

        let frame = graph.render(&sources).expect("frame");
        let order: Vec<_> = frame
            .layers
            .iter()
            .map(|layer| (layer.kind, layer.source.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                (LayerKind::Grid, "x-axis"),
                (LayerKind::Plot, "first"),
                (LayerKind::Plot, "second"),
                (LayerKind::Axis, "x-axis"),
            ]
        );
    }

    #[test]
    fn duplicate_plot_identifiers_are_rejected() {
        let mut graph = Graph::new("graph", space());
        graph.add_plot(ScatterPlot::new("a"), "main").expect("plot");
        assert!(matches!(
            graph.add_plot(ScatterPlot::new("a"), "main"),
            Err(PlotError::InvalidData(_))
        ));
        assert!(graph.remove_plot("a"));
        assert!(!graph.remove_plot("a"));
    }

    #[test]
    fn unknown_source_fails_the_pass() {
        let mut graph = Graph::new("graph", space());
        graph.add_plot(ScatterPlot::new("a"), "missing").expect("plot");
        let err = graph.render(&DataSources::new()).expect_err("unknown source");
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn reject_mode_failures_abort_or_skip() {
        let data = ColumnDataSource::new()
            .with_field("x", vec![1.0, 20.0, 3.0])
            .with_field("y", vec![1.0, 1.0, 1.0]);
        let sources = DataSources::new().with_source("main", &data);
        let mut graph = Graph::new("graph", space().with_clamp_mode(ClampMode::Reject));
        graph
            .add_plot(ScatterPlot::new("a").with_line_style(None), "main")
            .expect("plot");

        assert!(matches!(
            graph.render(&sources),
            Err(PlotError::OutOfRange { axis: Axis::X, .. })
        ));
        let frame = graph.render_skipping_failures(&sources).expect("frame");
        assert_eq!(frame.primitives().count(), 2);
    }

    #[test]
    fn scale_to_fit_covers_all_plots() {
        let data = data();
        let other = ColumnDataSource::new()
            .with_field("x", vec![-4.0])
            .with_field("y", vec![20.0]);
        let sources = DataSources::new()
            .with_source("main", &data)
            .with_source("other", &other);
        let mut graph = Graph::new("graph", space());
        graph.add_plot(ScatterPlot::new("a"), "main").expect("plot");
        graph.add_plot(ScatterPlot::new("b"), "other").expect("plot");

        let tuning = FitTuning {
            lower_padding_ratio: 0.0,
            upper_padding_ratio: 0.0,
            min_span_absolute: 1.0,
        };
        graph.scale_to_fit(&sources, tuning).expect("fit");
        assert_eq!(
            graph.plot_space().range(Axis::X),
            PlotRange::new(-4.0, 3.0).expect("x")
        );
        assert_eq!(
            graph.plot_space().range(Axis::Y),
            PlotRange::new(2.0, 20.0).expect("y")
        );
    }

    #[test]
    fn render_with_feeds_the_renderer() {
        let data = data();
        let sources = DataSources::new().with_source("main", &data);
        let mut graph = Graph::new("graph", space());
        graph.add_plot(ScatterPlot::new("a"), "main").expect("plot");
        graph
            .add_axis(AxisModel::new("y-axis", Axis::Y))
            .expect("axis");

        let mut renderer = NullRenderer::default();
        graph.render_with(&mut renderer, &sources).expect("render");
        assert_eq!(renderer.last_layer_count, 2);
        assert!(renderer.last_label_count > 0);
    }
}
