use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};
use rust_decimal::prelude::{FromPrimitive, RoundingStrategy};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::Axis;
use crate::error::{PlotError, PlotResult};

const MAX_AUTO_PRECISION: u8 = 12;

/// Context handed to label formatters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelContext {
    pub axis: Axis,
    /// Spacing between neighbouring major ticks (`0.0` when unknown).
    pub step: f64,
}

/// Turns tick or data values into label text.
///
/// Any `Fn(f64, &LabelContext) -> String` closure is a formatter.
pub trait LabelFormatter: Send + Sync {
    fn format(&self, value: f64, context: &LabelContext) -> String;
}

impl<F> LabelFormatter for F
where
    F: Fn(f64, &LabelContext) -> String + Send + Sync,
{
    fn format(&self, value: f64, context: &LabelContext) -> String {
        self(value, context)
    }
}

pub type SharedLabelFormatter = Arc<dyn LabelFormatter + 'static>;

/// Number of decimals needed to print multiples of `step` exactly.
#[must_use]
pub fn decimals_for_step(step: f64) -> u8 {
    if !step.is_finite() || step <= 0.0 {
        return 0;
    }
    for decimals in 0..=MAX_AUTO_PRECISION {
        let scaled = step * 10f64.powi(i32::from(decimals));
        if (scaled - scaled.round()).abs() <= scaled.abs() * 1e-9 {
            return decimals;
        }
    }
    MAX_AUTO_PRECISION
}

fn format_decimal(value: f64, precision: u8) -> String {
    if !value.is_finite() {
        return "nan".to_owned();
    }
    let precision = usize::from(precision);
    match Decimal::from_f64(value) {
        Some(decimal) => {
            let rounded = decimal
                .round_dp_with_strategy(precision as u32, RoundingStrategy::MidpointAwayFromZero);
            let rounded = if rounded.is_zero() {
                Decimal::ZERO
            } else {
                rounded
            };
            format!("{rounded:.precision$}")
        }
        None => format!("{value:.precision$}"),
    }
}

/// Fixed-point decimal labels with an optional suffix.
///
/// Without an explicit precision, the number of decimals follows the tick
/// step so `0.1`-spaced ticks print one decimal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalFormatter {
    #[serde(default)]
    pub precision: Option<u8>,
    #[serde(default)]
    pub suffix: String,
}

impl DecimalFormatter {
    #[must_use]
    pub fn with_precision(precision: u8) -> Self {
        Self {
            precision: Some(precision),
            suffix: String::new(),
        }
    }

    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }
}

impl LabelFormatter for DecimalFormatter {
    fn format(&self, value: f64, context: &LabelContext) -> String {
        let precision = self
            .precision
            .unwrap_or_else(|| decimals_for_step(context.step));
        let mut text = format_decimal(value, precision);
        text.push_str(&self.suffix);
        text
    }
}

/// Labels values as percentages (`0.25` prints `25%`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PercentFormatter {
    #[serde(default)]
    pub precision: Option<u8>,
}

impl LabelFormatter for PercentFormatter {
    fn format(&self, value: f64, context: &LabelContext) -> String {
        let precision = self
            .precision
            .unwrap_or_else(|| decimals_for_step(context.step * 100.0));
        format!("{}%", format_decimal(value * 100.0, precision))
    }
}

/// Labels values as offsets in seconds from a reference instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFormatter {
    reference: DateTime<Utc>,
    offset: FixedOffset,
    pattern: String,
}

impl TimeFormatter {
    /// `pattern` uses `chrono` strftime syntax.
    pub fn new(reference: DateTime<Utc>, pattern: impl Into<String>) -> PlotResult<Self> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(PlotError::InvalidData(
                "time label pattern must not be empty".to_owned(),
            ));
        }
        if chrono::format::StrftimeItems::new(&pattern)
            .any(|item| matches!(item, chrono::format::Item::Error))
        {
            return Err(PlotError::InvalidData(format!(
                "invalid time label pattern `{pattern}`"
            )));
        }
        Ok(Self {
            reference,
            offset: Utc.fix(),
            pattern,
        })
    }

    /// Reference instant given as unix seconds.
    pub fn from_unix_reference(
        reference_seconds: i64,
        pattern: impl Into<String>,
    ) -> PlotResult<Self> {
        let reference = DateTime::<Utc>::from_timestamp(reference_seconds, 0).ok_or_else(|| {
            PlotError::InvalidData(format!(
                "reference time {reference_seconds} is out of range"
            ))
        })?;
        Self::new(reference, pattern)
    }

    /// Renders labels in a fixed UTC offset instead of UTC.
    pub fn with_utc_offset_seconds(mut self, seconds: i32) -> PlotResult<Self> {
        self.offset = FixedOffset::east_opt(seconds).ok_or_else(|| {
            PlotError::InvalidData(format!("utc offset {seconds}s is out of range"))
        })?;
        Ok(self)
    }

    #[must_use]
    pub fn reference(&self) -> DateTime<Utc> {
        self.reference
    }
}

impl LabelFormatter for TimeFormatter {
    fn format(&self, value: f64, context: &LabelContext) -> String {
        if !value.is_finite() {
            return "nan".to_owned();
        }
        let millis = (value * 1_000.0).round() as i64;
        let instant = Duration::try_milliseconds(millis)
            .and_then(|offset| self.reference.checked_add_signed(offset));
        match instant {
            Some(instant) => instant
                .with_timezone(&self.offset)
                .format(&self.pattern)
                .to_string(),
            None => format_decimal(value, decimals_for_step(context.step)),
        }
    }
}
