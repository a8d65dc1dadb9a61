use plot_core::{Axis, DataPoint, NormalizedPoint, PlotError, PlotRange, PlotSpace, ScaleType};
use proptest::prelude::*;

fn space_with(x: PlotRange, y: PlotRange, scale: ScaleType) -> PlotSpace {
    PlotSpace::new(x, y)
        .with_scale_type(Axis::X, scale)
        .expect("x scale")
        .with_scale_type(Axis::Y, scale)
        .expect("y scale")
}

proptest! {
    #[test]
    fn linear_mapping_round_trips(
        min in -1_000_000.0f64..1_000_000.0,
        span in 1.0f64..1_000_000.0,
        fx in 0.0f64..1.0,
        fy in 0.0f64..1.0
    ) {
        let range = PlotRange::new(min, min + span).expect("range");
        let space = space_with(range, range, ScaleType::Linear);
        let point = DataPoint::new(min + span * fx, min + span * fy);

        let normalized = space.map_to_plot_space(point).expect("map");
        prop_assert!((0.0..=1.0).contains(&normalized.x));
        prop_assert!((0.0..=1.0).contains(&normalized.y));

        let back = space.map_from_plot_space(normalized).expect("invert");
        let tolerance = span * 1e-9;
        prop_assert!((back.x - point.x).abs() <= tolerance);
        prop_assert!((back.y - point.y).abs() <= tolerance);
    }

    #[test]
    fn log_mapping_round_trips(
        min in 0.001f64..1_000.0,
        ratio in 10.0f64..1_000_000.0,
        fraction in 0.0f64..1.0
    ) {
        let range = PlotRange::new(min, min * ratio).expect("range");
        let space = space_with(range, range, ScaleType::Log);
        let value = min * ratio.powf(fraction);

        let normalized = space
            .map_value_to_plot_space(Axis::X, value)
            .expect("map");
        prop_assert!((normalized - fraction).abs() <= 1e-9);
        let back = space
            .map_value_from_plot_space(Axis::X, normalized)
            .expect("invert");
        prop_assert!((back - value).abs() <= value * 1e-9);
    }

    #[test]
    fn log_modulus_mapping_round_trips(
        min in -10_000.0f64..0.0,
        span in 1.0f64..20_000.0,
        fraction in 0.0f64..1.0
    ) {
        let range = PlotRange::new(min, min + span).expect("range");
        let space = space_with(range, range, ScaleType::LogModulus);
        let value = min + span * fraction;

        let normalized = space
            .map_value_to_plot_space(Axis::Y, value)
            .expect("map");
        let back = space
            .map_value_from_plot_space(Axis::Y, normalized)
            .expect("invert");
        prop_assert!((back - value).abs() <= (1.0 + value.abs()) * 1e-9);
    }

    #[test]
    fn inverted_bounds_are_rejected(
        max in -1_000.0f64..1_000.0,
        gap in 0.001f64..1_000.0
    ) {
        let result = PlotRange::new(max + gap, max);
        let rejected = matches!(result, Err(PlotError::InvalidRange { .. }));
        prop_assert!(rejected);
    }

    #[test]
    fn mapping_is_monotonic(
        a in -500.0f64..500.0,
        b in -500.0f64..500.0
    ) {
        let range = PlotRange::new(-500.0, 500.0).expect("range");
        let space = space_with(range, range, ScaleType::LogModulus);
        let na = space.map_value_to_plot_space(Axis::X, a).expect("map a");
        let nb = space.map_value_to_plot_space(Axis::X, b).expect("map b");
        if a < b {
            prop_assert!(na <= nb);
        } else if a > b {
            prop_assert!(na >= nb);
        }
    }

    #[test]
    fn global_range_holds_after_pan_and_zoom(
        start in -900.0f64..800.0,
        span in 1.0f64..100.0,
        pan_x in -3.0f64..3.0,
        pan_y in -3.0f64..3.0,
        factor in 0.05f64..20.0,
        anchor_x in 0.0f64..1.0,
        anchor_y in 0.0f64..1.0
    ) {
        let global = PlotRange::new(-1_000.0, 1_000.0).expect("global");
        let visible = PlotRange::new(start, start + span).expect("visible");
        let mut space = PlotSpace::new(visible, visible);
        space.set_global_range(Axis::X, Some(global)).expect("x global");
        space.set_global_range(Axis::Y, Some(global)).expect("y global");

        space.pan_by(NormalizedPoint::new(pan_x, pan_y)).expect("pan");
        space
            .scale_by(factor, NormalizedPoint::new(anchor_x, anchor_y))
            .expect("zoom");

        let tolerance = 1e-9 * global.length();
        for axis in [Axis::X, Axis::Y] {
            let range = space.range(axis);
            prop_assert!(range.min() >= global.min() - tolerance);
            prop_assert!(range.max() <= global.max() + tolerance);
        }
    }
}
