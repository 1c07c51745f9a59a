use common::duty::{AttesterDuty, ProposerDuty};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProposerDutiesResponse {
    pub dependent_root: String,
    pub execution_optimistic: Option<bool>,
    pub data: Vec<ProposerDuty>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AttesterDutiesResponse {
    pub dependent_root: String,
    pub execution_optimistic: Option<bool>,
    pub data: Vec<AttesterDuty>,
}
