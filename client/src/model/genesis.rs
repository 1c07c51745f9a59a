use std::collections::BTreeMap;

use common::genesis::Genesis;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GenesisResponse {
    pub data: Genesis,
}

/// Most constants are decimal or hex strings, but newer forks add structured entries, so the
/// values are kept as raw JSON.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SpecResponse {
    pub data: BTreeMap<String, serde_json::Value>,
}
