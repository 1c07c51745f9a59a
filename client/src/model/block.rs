use common::block::{BeaconBlock, BlockHeaderData};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BlockHeaderResponse {
    pub data: BlockHeaderData,
    pub execution_optimistic: Option<bool>,
    pub finalized: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BlockResponse {
    pub version: Option<String>,
    pub data: SignedBeaconBlock,
    pub execution_optimistic: Option<bool>,
    pub finalized: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SignedBeaconBlock {
    pub message: BeaconBlock,
    pub signature: String,
}
