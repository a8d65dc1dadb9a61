use plot_core::PlotRange;
use plot_core::axis::{nice_step, nice_ticks};
use proptest::prelude::*;

proptest! {
    #[test]
    fn tick_count_never_exceeds_desired_plus_one(
        min in -1_000_000.0f64..1_000_000.0,
        span in 0.001f64..1_000_000.0,
        desired in 1usize..20
    ) {
        let range = PlotRange::new(min, min + span).expect("range");
        let (values, step) = nice_ticks(range, desired);

        prop_assert!(values.len() <= desired + 1);
        prop_assert!(step > 0.0);
        let slack = step * 1e-6;
        for value in &values {
            prop_assert!(*value >= range.min() - slack);
            prop_assert!(*value <= range.max() + slack);
        }
        for pair in values.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn nice_step_has_one_two_five_mantissa(raw in 1e-6f64..1e9) {
        let step = nice_step(raw);
        let exponent = (step.log10() + 1e-9).floor();
        let mantissa = (step / 10f64.powf(exponent)).round();
        prop_assert!([1.0, 2.0, 5.0].contains(&mantissa));
        prop_assert!(step >= raw / 5.0 && step <= raw * 5.0);
    }
}
