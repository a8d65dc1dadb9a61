pub mod plot_space;
pub mod range;
pub mod scale;
pub mod types;

pub use plot_space::{AxisSpace, ClampMode, FitTuning, PlotSpace};
pub use range::{PlotRange, RangeComparison};
pub use scale::ScaleType;
pub use types::{Axis, DataPoint, NormalizedPoint};
