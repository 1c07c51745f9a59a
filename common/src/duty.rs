use serde::{Deserialize, Serialize};

use crate::{util::deserialize_num, CommitteeIndex, Slot, ValidatorIndex};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProposerDuty {
    pub pubkey: String,
    #[serde(deserialize_with = "deserialize_num")]
    pub validator_index: ValidatorIndex,
    #[serde(deserialize_with = "deserialize_num")]
    pub slot: Slot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AttesterDuty {
    pub pubkey: String,
    #[serde(deserialize_with = "deserialize_num")]
    pub validator_index: ValidatorIndex,
    #[serde(deserialize_with = "deserialize_num")]
    pub committee_index: CommitteeIndex,
    #[serde(deserialize_with = "deserialize_num")]
    pub committee_length: u64,
    #[serde(deserialize_with = "deserialize_num")]
    pub committees_at_slot: u64,
    /// Position of the validator inside its committee, and so inside the aggregation bits.
    #[serde(deserialize_with = "deserialize_num")]
    pub validator_committee_index: u64,
    #[serde(deserialize_with = "deserialize_num")]
    pub slot: Slot,
}
