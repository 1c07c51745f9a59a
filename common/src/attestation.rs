use anyhow::{anyhow, Result};
use bit_vec::BitVec;
use serde::{Deserialize, Serialize};

use crate::{util::deserialize_num, CommitteeIndex, Epoch, Slot};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Attestation {
    pub aggregation_bits: AggregationBits,
    pub data: AttestationData,
    pub signature: String,
    /// Set on Electra aggregates, which span several committees and leave `data.index` at 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committee_bits: Option<String>,
}

impl Attestation {
    pub fn has_committee_bits(&self) -> bool {
        self.committee_bits.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AttestationData {
    #[serde(deserialize_with = "deserialize_num")]
    pub slot: Slot,
    #[serde(deserialize_with = "deserialize_num")]
    pub index: CommitteeIndex,
    pub beacon_block_root: String,
    pub source: Checkpoint,
    pub target: Checkpoint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Checkpoint {
    #[serde(deserialize_with = "deserialize_num")]
    pub epoch: Epoch,
    pub root: String,
}

/// SSZ bitlist of committee members that signed an aggregate.
///
/// On the wire the bits are packed least significant bit first and terminated by a single
/// delimiter bit marking the list length. `bits` holds the members only, in committee order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AggregationBits {
    bits: BitVec,
}

impl AggregationBits {
    pub fn new(len: usize) -> Self {
        Self {
            bits: BitVec::from_elem(len, false),
        }
    }

    pub fn from_hex(encoded: &str) -> Result<Self> {
        let bytes = hex::decode(encoded.trim_start_matches("0x"))?;
        let raw = BitVec::from_bytes(&bytes);
        let delimiter = (0..raw.len())
            .rev()
            .find(|&position| raw[msb_first(position)])
            .ok_or_else(|| anyhow!("Aggregation bits {encoded} have no length delimiter"))?;
        let bits = (0..delimiter).map(|position| raw[msb_first(position)]).collect();
        Ok(Self { bits })
    }

    pub fn to_hex(&self) -> String {
        let len = self.bits.len();
        let mut bytes = vec![0u8; len / 8 + 1];
        for (position, bit) in self.bits.iter().enumerate() {
            if bit {
                bytes[position / 8] |= 1 << (position % 8);
            }
        }
        bytes[len / 8] |= 1 << (len % 8);
        format!("0x{}", hex::encode(bytes))
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Positions past the end of the list read as unset.
    pub fn is_set(&self, position: u64) -> bool {
        usize::try_from(position)
            .ok()
            .and_then(|position| self.bits.get(position))
            .unwrap_or(false)
    }

    /// Returns false and leaves the list untouched when `position` is out of range.
    pub fn set(&mut self, position: usize) -> bool {
        if position >= self.bits.len() {
            return false;
        }
        self.bits.set(position, true);
        true
    }
}

// `BitVec::from_bytes` numbers bits most significant first within each byte.
fn msb_first(position: usize) -> usize {
    (position / 8) * 8 + 7 - position % 8
}

impl TryFrom<String> for AggregationBits {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<AggregationBits> for String {
    fn from(value: AggregationBits) -> Self {
        value.to_hex()
    }
}
