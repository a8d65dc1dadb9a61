use tracing::warn;

use crate::core::PlotRange;

/// Upper bound on ticks generated for one axis.
pub(super) const MAX_TICKS: usize = 10_000;

const TICK_INDEX_EPSILON: f64 = 1e-9;

/// Step of the form `mantissa * 10^exponent` with mantissa in `{1, 2, 5}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NiceStep {
    mantissa: i64,
    exponent: i32,
}

impl NiceStep {
    const MANTISSAS: [i64; 3] = [1, 2, 5];

    fn new(mantissa: i64, exponent: i32) -> Self {
        if mantissa == 10 {
            Self {
                mantissa: 1,
                exponent: exponent + 1,
            }
        } else {
            Self { mantissa, exponent }
        }
    }

    #[must_use]
    pub fn value(self) -> f64 {
        scaled(self.mantissa, self.exponent)
    }

    /// `k * step`, computed so decimal steps land on the closest double
    /// (`3 * 0.1` yields `0.3`).
    fn multiple(self, k: i64) -> f64 {
        match k.checked_mul(self.mantissa) {
            Some(units) => scaled(units, self.exponent),
            None => (k as f64) * self.value(),
        }
    }

    /// Nice steps immediately at or below and at or above `raw`.
    fn bracket(raw: f64) -> (Self, Self) {
        let mut exponent = raw.log10().floor() as i32;
        while scaled(1, exponent) > raw {
            exponent -= 1;
        }
        while scaled(1, exponent + 1) <= raw {
            exponent += 1;
        }

        let candidates = [
            Self::new(Self::MANTISSAS[0], exponent),
            Self::new(Self::MANTISSAS[1], exponent),
            Self::new(Self::MANTISSAS[2], exponent),
            Self::new(10, exponent),
        ];
        let lower = candidates
            .iter()
            .rev()
            .copied()
            .find(|step| step.value() <= raw)
            .unwrap_or(candidates[0]);
        let upper = candidates
            .iter()
            .copied()
            .find(|step| step.value() >= raw)
            .unwrap_or(candidates[3]);
        (lower, upper)
    }
}

fn scaled(units: i64, exponent: i32) -> f64 {
    if exponent >= 0 {
        (units as f64) * 10f64.powi(exponent)
    } else {
        (units as f64) / 10f64.powi(-exponent)
    }
}

/// Returns the `{1, 2, 5} x 10^n` value closest to `raw` (ties round up).
#[must_use]
pub fn nice_step(raw: f64) -> f64 {
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let (lower, upper) = NiceStep::bracket(raw);
    if raw - lower.value() < upper.value() - raw {
        lower.value()
    } else {
        upper.value()
    }
}

/// Clamps a requested tick count to what one axis may generate.
fn capped_count(desired_count: usize) -> usize {
    desired_count.min(MAX_TICKS - 1)
}

/// Inclusive index span of step multiples inside `range`.
fn multiple_indices(range: PlotRange, step: f64) -> (f64, f64) {
    let first = (range.min() / step - TICK_INDEX_EPSILON).ceil();
    let last = (range.max() / step + TICK_INDEX_EPSILON).floor();
    (first, last)
}

fn multiple_count(range: PlotRange, step: f64) -> usize {
    let (first, last) = multiple_indices(range, step);
    if last < first {
        0
    } else {
        ((last - first) as usize).saturating_add(1)
    }
}

/// Chooses the nice step closest to `length / desired_count` that still
/// yields at most `desired_count + 1` ticks.
///
/// `desired_count` is capped at `MAX_TICKS - 1`.
#[must_use]
pub fn select_nice_step(range: PlotRange, desired_count: usize) -> Option<NiceStep> {
    if desired_count == 0 || range.is_degenerate() {
        return None;
    }
    let desired_count = capped_count(desired_count);
    let raw = range.length() / desired_count as f64;
    if !raw.is_finite() || raw <= 0.0 {
        return None;
    }

    let (lower, upper) = NiceStep::bracket(raw);
    let closest = if raw - lower.value() < upper.value() - raw {
        lower
    } else {
        upper
    };
    if multiple_count(range, closest.value()) > desired_count.saturating_add(1) {
        Some(upper)
    } else {
        Some(closest)
    }
}

/// Major tick values for a linear axis: multiples of a nice step.
///
/// Returns the values together with the step used. A degenerate range yields
/// a single tick at its only value.
#[must_use]
pub fn nice_ticks(range: PlotRange, desired_count: usize) -> (Vec<f64>, f64) {
    if desired_count == 0 {
        return (Vec::new(), 0.0);
    }
    if range.is_degenerate() {
        return (vec![range.min()], 0.0);
    }
    let Some(step) = select_nice_step(range, desired_count) else {
        return (Vec::new(), 0.0);
    };

    let (first, last) = multiple_indices(range, step.value());
    let values = (first as i64..=last as i64)
        .take(MAX_TICKS)
        .map(|k| step.multiple(k))
        .map(|value| if value == 0.0 { 0.0 } else { value })
        .collect();
    (values, step.value())
}

/// Multiples of `interval` offset from `origin` that fall inside `range`.
#[must_use]
pub fn fixed_interval_ticks(range: PlotRange, interval: f64, origin: f64) -> Vec<f64> {
    if !interval.is_finite() || interval <= 0.0 || !origin.is_finite() {
        return Vec::new();
    }
    let first = ((range.min() - origin) / interval - TICK_INDEX_EPSILON).ceil();
    let last = ((range.max() - origin) / interval + TICK_INDEX_EPSILON).floor();
    if last < first {
        return Vec::new();
    }
    let count = (last - first) as usize + 1;
    if count > MAX_TICKS {
        warn!(
            count,
            interval, "fixed-interval tick count exceeds limit; truncating"
        );
    }
    (0..count.min(MAX_TICKS))
        .map(|offset| origin + (first + offset as f64) * interval)
        .collect()
}

/// `divisions + 1` evenly spaced values from `min` to `max`.
#[must_use]
pub fn equal_division_ticks(range: PlotRange, divisions: usize) -> Vec<f64> {
    if divisions == 0 {
        return Vec::new();
    }
    let divisions = divisions.min(MAX_TICKS - 1);
    let denominator = divisions as f64;
    (0..=divisions)
        .map(|index| {
            if index == divisions {
                range.max()
            } else {
                range.min() + range.length() * (index as f64) / denominator
            }
        })
        .collect()
}

/// Decade ticks (`10^k`) for a positive range, thinned to about
/// `desired_count + 1` entries. Returns `None` when fewer than two decades
/// fall inside the range.
#[must_use]
pub fn decade_ticks(range: PlotRange, desired_count: usize) -> Option<Vec<f64>> {
    if range.min() <= 0.0 || desired_count == 0 {
        return None;
    }
    let first = (range.min().log10() - TICK_INDEX_EPSILON).ceil() as i32;
    let last = (range.max().log10() + TICK_INDEX_EPSILON).floor() as i32;
    if last <= first {
        return None;
    }
    let decades = (last - first) as usize + 1;
    let stride = decades.div_ceil(capped_count(desired_count) + 1).max(1);
    Some(
        (first..=last)
            .step_by(stride)
            .map(|exponent| scaled(1, exponent))
            .collect(),
    )
}

/// Evenly spaced minor values strictly between consecutive majors.
#[must_use]
pub fn linear_minor_ticks(majors: &[f64], per_interval: usize) -> Vec<f64> {
    if per_interval == 0 {
        return Vec::new();
    }
    let per_interval = per_interval.min(MAX_TICKS);
    let denominator = (per_interval + 1) as f64;
    majors
        .windows(2)
        .flat_map(|pair| {
            let (start, end) = (pair[0], pair[1]);
            (1..=per_interval).map(move |index| start + (end - start) * (index as f64) / denominator)
        })
        .collect()
}

/// `m * 10^k` for `m` in `2..=9` inside `range`.
#[must_use]
pub fn decade_minor_ticks(range: PlotRange) -> Vec<f64> {
    if range.min() <= 0.0 {
        return Vec::new();
    }
    let first = range.min().log10().floor() as i32;
    let last = range.max().log10().ceil() as i32;
    (first..=last)
        .flat_map(|exponent| (2..=9).map(move |mantissa| scaled(mantissa, exponent)))
        .filter(|value| range.contains(*value))
        .collect()
}

/// Smallest positive gap between sorted values, or `0.0` when there is none.
#[must_use]
pub fn tick_step_hint_from_values(values: &[f64]) -> f64 {
    if values.len() <= 1 {
        return 0.0;
    }

    let mut best = f64::INFINITY;
    for pair in values.windows(2) {
        let step = (pair[1] - pair[0]).abs();
        if step.is_finite() && step > 0.0 {
            best = best.min(step);
        }
    }

    if best.is_finite() { best } else { 0.0 }
}
