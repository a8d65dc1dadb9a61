//! Host-facing assembly: graphs, their serializable config and its JSON
//! contract.

mod graph;
mod graph_config;
mod json_contract;

pub use graph::{DataSources, Graph};
pub use graph_config::{
    AxisConfig, AxisSpaceConfig, BarConfig, DataLabelsConfig, GraphConfig, LabelFormatConfig,
    PlotConfig, RangeConfig, ScatterConfig, ThemePreset, TimeFormatConfig, TradingRangeConfig,
};
pub use json_contract::{GRAPH_CONFIG_JSON_SCHEMA_V1, GraphConfigJsonContractV1};
