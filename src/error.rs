use thiserror::Error;

use crate::core::Axis;

pub type PlotResult<T> = Result<T, PlotError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlotError {
    #[error("value {value} is outside the {axis} plot range [{min}, {max}]")]
    OutOfRange {
        axis: Axis,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid plot range: min={min}, max={max}")]
    InvalidRange { min: f64, max: f64 },

    #[error("data source has no field `{field}`")]
    MissingField { field: String },

    #[error("invalid data: {0}")]
    InvalidData(String),
}
