use plot_core::core::ClampMode;
use plot_core::data::{ColumnDataSource, FunctionDataSource};
use plot_core::plot::{
    AreaFill, BarPlot, DataLabels, Interpolation, Plot, ScatterPlot, TradingRangePlot,
};
use plot_core::render::{GeometricPrimitive, StyleRef};
use plot_core::{Axis, DataSources, Graph, NormalizedPoint, PlotError, PlotRange, PlotSpace};

fn range(min: f64, max: f64) -> PlotRange {
    PlotRange::new(min, max).expect("valid range")
}

fn unit_space(max: f64) -> PlotSpace {
    PlotSpace::new(range(0.0, max), range(0.0, max))
}

fn line_source(ys: Vec<f64>) -> ColumnDataSource {
    let xs = (0..ys.len()).map(|index| index as f64).collect();
    ColumnDataSource::new()
        .with_field("x", xs)
        .with_field("y", ys)
}

fn points_only(identifier: &str) -> ScatterPlot {
    ScatterPlot::new(identifier).with_line_style(None)
}

#[test]
fn nan_record_is_omitted_from_point_plot() {
    let source = line_source(vec![1.0, 2.0, 3.0, f64::NAN, 5.0, 6.0]);
    let space = unit_space(10.0);
    let primitives = points_only("points")
        .generate_primitives(&source, &space)
        .expect("stream")
        .collect_primitives()
        .expect("primitives");

    assert_eq!(primitives.len(), 5);
    let records: Vec<_> = primitives
        .iter()
        .map(|primitive| primitive.record().expect("record index"))
        .collect();
    assert_eq!(records, vec![0, 1, 2, 4, 5]);
}

#[test]
fn connecting_lines_break_at_skipped_records() {
    let source = line_source(vec![1.0, 2.0, f64::NAN, 4.0, 5.0]);
    let space = unit_space(10.0);
    let plot = ScatterPlot::new("line").with_symbol_style(None);
    let segments: Vec<_> = plot
        .generate_primitives(&source, &space)
        .expect("stream")
        .collect_primitives()
        .expect("primitives")
        .into_iter()
        .filter_map(|primitive| match primitive {
            GeometricPrimitive::LineSegment(segment) => Some(segment.record),
            _ => None,
        })
        .collect();
    assert_eq!(segments, vec![Some(1), Some(4)]);
}

#[test]
fn two_passes_are_identical() {
    let source = line_source(vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0]);
    let space = unit_space(10.0);
    let plot = ScatterPlot::new("scatter")
        .with_area_fill(Some(AreaFill {
            base_value: 0.0,
            style: StyleRef::DATA_FILL,
        }))
        .with_data_labels(Some(DataLabels::default()));

    let first = plot
        .generate_primitives(&source, &space)
        .expect("first stream")
        .collect_primitives()
        .expect("first pass");
    let second = plot
        .generate_primitives(&source, &space)
        .expect("second stream")
        .collect_primitives()
        .expect("second pass");
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn records_emit_fill_line_symbol_label_in_order() {
    let source = line_source(vec![1.0, 2.0]);
    let space = unit_space(10.0);
    let plot = ScatterPlot::new("scatter")
        .with_area_fill(Some(AreaFill {
            base_value: 0.0,
            style: StyleRef::DATA_FILL,
        }))
        .with_data_labels(Some(DataLabels::default()));

    let kinds: Vec<&str> = plot
        .generate_primitives(&source, &space)
        .expect("stream")
        .collect_primitives()
        .expect("primitives")
        .iter()
        .filter(|primitive| primitive.record() == Some(1))
        .map(|primitive| match primitive {
            GeometricPrimitive::Polygon(_) => "fill",
            GeometricPrimitive::LineSegment(_) => "line",
            GeometricPrimitive::Point(_) => "symbol",
            GeometricPrimitive::Label(_) => "label",
        })
        .collect();
    assert_eq!(kinds, vec!["fill", "line", "symbol", "label"]);
}

#[test]
fn stepped_interpolation_emits_two_segments() {
    let source = line_source(vec![0.0, 10.0]);
    let space = unit_space(10.0);
    let plot = ScatterPlot::new("steps")
        .with_symbol_style(None)
        .with_interpolation(Interpolation::Stepped);
    let primitives = plot
        .generate_primitives(&source, &space)
        .expect("stream")
        .collect_primitives()
        .expect("primitives");
    assert_eq!(primitives.len(), 2);
    let GeometricPrimitive::LineSegment(run) = &primitives[0] else {
        panic!("expected horizontal run");
    };
    assert_eq!(run.to, NormalizedPoint::new(0.1, 0.0));
}

#[test]
fn missing_required_field_fails_up_front() {
    let source = ColumnDataSource::new().with_field("x", vec![1.0, 2.0]);
    let space = unit_space(10.0);
    let err = ScatterPlot::new("scatter")
        .generate_primitives(&source, &space)
        .expect_err("missing y");
    assert_eq!(
        err,
        PlotError::MissingField {
            field: "y".to_owned()
        }
    );

    let bar_plot = BarPlot::new("bars");
    let bars = bar_plot.generate_primitives(&source, &space);
    assert!(matches!(bars, Err(PlotError::MissingField { .. })));
    let candle_plot = TradingRangePlot::new("candles");
    let candles = candle_plot.generate_primitives(&source, &space);
    assert!(matches!(candles, Err(PlotError::MissingField { .. })));
}

#[test]
fn reject_mode_surfaces_failures_per_record() {
    let source = line_source(vec![1.0, 20.0, 3.0]);
    let space = unit_space(10.0).with_clamp_mode(ClampMode::Reject);
    let items: Vec<_> = points_only("points")
        .generate_primitives(&source, &space)
        .expect("stream")
        .collect();
    assert_eq!(items.len(), 3);
    assert!(items[0].is_ok());
    assert!(matches!(
        items[1],
        Err(PlotError::OutOfRange { axis: Axis::Y, .. })
    ));
    assert!(items[2].is_ok());

    let kept: Vec<_> = points_only("points")
        .generate_primitives(&source, &space)
        .expect("stream")
        .skip_failures()
        .collect();
    assert_eq!(kept.len(), 2);
}

#[test]
fn clamp_mode_pins_out_of_range_points() {
    let source = line_source(vec![1.0, 20.0]);
    let space = unit_space(10.0);
    let primitives = points_only("points")
        .generate_primitives(&source, &space)
        .expect("stream")
        .collect_primitives()
        .expect("primitives");
    let GeometricPrimitive::Point(point) = &primitives[1] else {
        panic!("expected point");
    };
    assert_eq!(point.at.y, 1.0);
}

#[test]
fn data_labels_print_values_above_points() {
    let source = line_source(vec![2.5]);
    let space = unit_space(10.0);
    let plot = points_only("points").with_data_labels(Some(DataLabels::default()));
    let primitives = plot
        .generate_primitives(&source, &space)
        .expect("stream")
        .collect_primitives()
        .expect("primitives");
    let GeometricPrimitive::Label(label) = &primitives[1] else {
        panic!("expected label");
    };
    assert_eq!(label.text, "2.50");
    assert!(label.anchor.y > 0.25);
    assert_eq!(label.style, StyleRef::DATA_LABEL);
}

#[test]
fn nearest_index_prefers_lower_index_on_ties() {
    let source = line_source(vec![5.0, 5.0, 5.0]);
    let space = unit_space(2.0);
    let plot = points_only("points");
    let hit = plot
        .nearest_index(&source, &space, NormalizedPoint::new(0.25, 1.0))
        .expect("hit test");
    assert_eq!(hit, Some(0));
    let hit = plot
        .nearest_index(&source, &space, NormalizedPoint::new(0.9, 1.0))
        .expect("hit test");
    assert_eq!(hit, Some(2));
}

#[test]
fn function_source_feeds_scatter_plot() {
    let mut source = FunctionDataSource::new(|x| x * x, range(0.0, 2.0), 5).expect("source");
    let space = unit_space(4.0);
    let plot = points_only("parabola");
    let extent = plot
        .data_extent(&source, Axis::Y)
        .expect("extent")
        .expect("some");
    assert_eq!(extent, range(0.0, 4.0));

    source.resample(range(-1.0, 1.0));
    let extent = plot
        .data_extent(&source, Axis::X)
        .expect("extent")
        .expect("some");
    assert_eq!(extent, range(-1.0, 1.0));
    let count = plot
        .generate_primitives(&source, &space)
        .expect("stream")
        .count();
    assert_eq!(count, 5);
}

#[test]
fn plot_extent_ignores_nan_records() {
    let source = line_source(vec![f64::NAN, -3.0, 8.0]);
    let extent = points_only("points")
        .data_extent(&source, Axis::X)
        .expect("extent")
        .expect("some");
    assert_eq!(extent, range(1.0, 2.0));
    assert!(
        points_only("points")
            .data_extent(&line_source(vec![f64::NAN]), Axis::Y)
            .expect("extent")
            .is_none()
    );
}

#[test]
fn infinite_values_are_skipped_like_nan() {
    let source = line_source(vec![1.0, f64::INFINITY, 3.0, f64::NEG_INFINITY, 5.0]);
    let space = unit_space(10.0);
    let records: Vec<_> = points_only("points")
        .generate_primitives(&source, &space)
        .expect("stream")
        .collect_primitives()
        .expect("primitives")
        .iter()
        .map(|primitive| primitive.record().expect("record index"))
        .collect();
    assert_eq!(records, vec![0, 2, 4]);

    let mut graph = Graph::new("graph", space);
    graph
        .add_plot(ScatterPlot::new("line"), "data")
        .expect("add plot");
    let frame = graph
        .render(&DataSources::new().with_source("data", &source))
        .expect("render");
    // Every neighbour of a valid record is skipped, so no connecting lines.
    assert_eq!(frame.primitives().count(), 3);
    assert!(
        frame
            .primitives()
            .all(|primitive| matches!(primitive, GeometricPrimitive::Point(_)))
    );
}
