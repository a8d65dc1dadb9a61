use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::{DataSource, fields};
use crate::core::PlotRange;
use crate::error::{PlotError, PlotResult};

pub type SampledFn = Arc<dyn Fn(f64) -> f64 + Send + Sync + 'static>;

/// Data source sampling `y = f(x)` evenly across an x range.
///
/// Samples are materialized on construction and on [`FunctionDataSource::resample`],
/// so render passes read plain columns. Non-finite function results are stored
/// as NaN and therefore skipped by plots.
#[derive(Clone)]
pub struct FunctionDataSource {
    function: SampledFn,
    sample_count: usize,
    range: PlotRange,
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl fmt::Debug for FunctionDataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDataSource")
            .field("sample_count", &self.sample_count)
            .field("range", &self.range)
            .finish_non_exhaustive()
    }
}

impl FunctionDataSource {
    pub fn new<F>(function: F, range: PlotRange, sample_count: usize) -> PlotResult<Self>
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        if sample_count < 2 {
            return Err(PlotError::InvalidData(
                "function data source needs at least 2 samples".to_owned(),
            ));
        }
        let mut source = Self {
            function: Arc::new(function),
            sample_count,
            range,
            xs: Vec::new(),
            ys: Vec::new(),
        };
        source.resample(range);
        Ok(source)
    }

    #[must_use]
    pub fn range(&self) -> PlotRange {
        self.range
    }

    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Re-evaluates the function over `range`.
    pub fn resample(&mut self, range: PlotRange) {
        let denominator = (self.sample_count - 1) as f64;
        self.xs = (0..self.sample_count)
            .map(|index| range.min() + range.length() * (index as f64) / denominator)
            .collect();
        self.ys = self
            .xs
            .iter()
            .map(|&x| {
                let y = (self.function)(x);
                if y.is_finite() { y } else { f64::NAN }
            })
            .collect();
        self.range = range;
        debug!(
            min = range.min(),
            max = range.max(),
            samples = self.sample_count,
            "resampled function data source"
        );
    }
}

impl DataSource for FunctionDataSource {
    fn record_count(&self) -> usize {
        self.xs.len()
    }

    fn field(&self, name: &str) -> Option<&[f64]> {
        match name {
            fields::X => Some(&self.xs),
            fields::Y => Some(&self.ys),
            _ => None,
        }
    }
}
