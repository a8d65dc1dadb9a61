use serde::{Deserialize, Serialize};

use crate::error::{PlotError, PlotResult};

use super::GraphConfig;

pub const GRAPH_CONFIG_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfigJsonContractV1 {
    pub schema_version: u32,
    pub config: GraphConfig,
}

impl GraphConfig {
    pub fn to_json_pretty(&self) -> PlotResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            PlotError::InvalidData(format!("failed to serialize graph config json: {e}"))
        })
    }

    pub fn to_json_contract_v1_pretty(&self) -> PlotResult<String> {
        let payload = GraphConfigJsonContractV1 {
            schema_version: GRAPH_CONFIG_JSON_SCHEMA_V1,
            config: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            PlotError::InvalidData(format!("failed to serialize graph config contract v1: {e}"))
        })
    }

    /// Accepts either a bare config or a versioned contract payload.
    pub fn from_json_compat_str(input: &str) -> PlotResult<Self> {
        if let Ok(config) = serde_json::from_str::<GraphConfig>(input) {
            return Ok(config);
        }
        let payload: GraphConfigJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            PlotError::InvalidData(format!("failed to parse graph config json payload: {e}"))
        })?;
        if payload.schema_version != GRAPH_CONFIG_JSON_SCHEMA_V1 {
            return Err(PlotError::InvalidData(format!(
                "unsupported graph config schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.config)
    }
}

#[cfg(test)]
mod tests {
    use super::GRAPH_CONFIG_JSON_SCHEMA_V1;
    use crate::api::GraphConfig;
    use crate::core::PlotRange;

    fn config() -> GraphConfig {
        GraphConfig::new(
            PlotRange::new(0.0, 10.0).expect("x"),
            PlotRange::new(-1.0, 1.0).expect("y"),
        )
    }

    #[test]
    fn contract_carries_schema_version() {
        let json = config().to_json_contract_v1_pretty().expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("value");
        assert_eq!(
            value["schema_version"].as_u64(),
            Some(u64::from(GRAPH_CONFIG_JSON_SCHEMA_V1))
        );
        assert_eq!(
            GraphConfig::from_json_compat_str(&json).expect("parse"),
            config()
        );
    }

    #[test]
    fn unknown_schema_version_is_rejected() {
        let json = config()
            .to_json_contract_v1_pretty()
            .expect("json")
            .replace("\"schema_version\": 1", "\"schema_version\": 7");
        let err = GraphConfig::from_json_compat_str(&json).expect_err("version");
        assert!(err.to_string().contains("schema version: 7"));
    }

    #[test]
    fn inverted_range_in_json_is_rejected() {
        let json = r#"{ "x": { "range": { "min": 5.0, "max": 1.0 } },
                        "y": { "range": { "min": 0.0, "max": 1.0 } } }"#;
        assert!(GraphConfig::from_json_compat_str(json).is_err());
    }
}
