use common::{util::deserialize_num, Epoch};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Fork {
    pub previous_version: String,
    pub current_version: String,
    #[serde(deserialize_with = "deserialize_num")]
    pub epoch: Epoch,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ForkResponse {
    pub execution_optimistic: Option<bool>,
    pub finalized: Option<bool>,
    pub data: Fork,
}
