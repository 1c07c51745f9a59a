use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{attestation::Attestation, util::deserialize_num, Slot, ValidatorIndex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockId {
    Head,
    Genesis,
    Finalized,
    Slot(Slot),
    Root(String),
}

impl Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockId::Head => write!(f, "head"),
            BlockId::Genesis => write!(f, "genesis"),
            BlockId::Finalized => write!(f, "finalized"),
            BlockId::Slot(slot) => write!(f, "{slot}"),
            BlockId::Root(root) => write!(f, "{root}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BlockHeaderData {
    pub root: String,
    pub canonical: bool,
    pub header: SignedBlockHeader,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SignedBlockHeader {
    pub message: BlockHeader,
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BlockHeader {
    #[serde(deserialize_with = "deserialize_num")]
    pub slot: Slot,
    #[serde(deserialize_with = "deserialize_num")]
    pub proposer_index: ValidatorIndex,
    pub parent_root: String,
    pub state_root: String,
    pub body_root: String,
}

/// The parts of a beacon block the performance report reads. Everything else in the body is
/// skipped during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BeaconBlock {
    #[serde(deserialize_with = "deserialize_num")]
    pub slot: Slot,
    #[serde(deserialize_with = "deserialize_num")]
    pub proposer_index: ValidatorIndex,
    pub parent_root: String,
    pub state_root: String,
    pub body: BeaconBlockBody,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BeaconBlockBody {
    #[serde(default)]
    pub attestations: Vec<Attestation>,
}

impl BeaconBlockBody {
    /// Attestations in the Electra multi-committee format.
    pub fn committee_bits_attestations(&self) -> usize {
        self.attestations
            .iter()
            .filter(|attestation| attestation.has_committee_bits())
            .count()
    }
}
