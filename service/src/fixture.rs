//! In-memory beacon node: genesis at the Unix epoch, 12 second slots, 32 slots per epoch.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Mutex,
    time::{Duration, UNIX_EPOCH},
};

use anyhow::{bail, Result};
use async_trait::async_trait;
use client::BeaconClient;
use common::{
    attestation::{AggregationBits, Attestation, AttestationData, Checkpoint},
    block::{BeaconBlock, BeaconBlockBody, BlockHeader, BlockHeaderData, BlockId, SignedBlockHeader},
    duty::{AttesterDuty, ProposerDuty},
    genesis::Genesis,
    state::StateId,
    validator::{Validator, ValidatorData, ValidatorId, ValidatorStatus},
    CommitteeIndex, Epoch, Slot, ValidatorIndex,
};
use serde_json::{json, Value};

use crate::chain_time::ChainTime;

pub const COMMITTEE_LENGTH: usize = 4;

pub struct FakeChain {
    pub genesis_time: u64,
    pub spec: BTreeMap<String, Value>,
    pub validators: Vec<ValidatorData>,
    pub proposer_duties: BTreeMap<Epoch, Vec<ProposerDuty>>,
    pub attester_duties: BTreeMap<Epoch, Vec<AttesterDuty>>,
    pub blocks: BTreeMap<Slot, BeaconBlock>,
    pub headers: BTreeMap<Slot, BlockHeaderData>,
    pub failing_blocks: BTreeSet<Slot>,
    header_queries: Mutex<BTreeMap<Slot, usize>>,
    block_queries: Mutex<Vec<Slot>>,
}

impl FakeChain {
    pub fn new(validators: Vec<ValidatorData>) -> Self {
        let spec = [
            ("SECONDS_PER_SLOT", json!("12")),
            ("SLOTS_PER_EPOCH", json!("32")),
            ("EPOCHS_PER_SYNC_COMMITTEE_PERIOD", json!("256")),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
        Self {
            genesis_time: 0,
            spec,
            validators,
            proposer_duties: BTreeMap::new(),
            attester_duties: BTreeMap::new(),
            blocks: BTreeMap::new(),
            headers: BTreeMap::new(),
            failing_blocks: BTreeSet::new(),
            header_queries: Mutex::new(BTreeMap::new()),
            block_queries: Mutex::new(Vec::new()),
        }
    }

    pub fn chain_time(&self) -> ChainTime {
        ChainTime::new(
            UNIX_EPOCH + Duration::from_secs(self.genesis_time),
            Duration::from_secs(12),
            32,
            Some(256),
        )
        .unwrap()
    }

    pub fn add_header(&mut self, header: BlockHeaderData) {
        self.headers.insert(header.header.message.slot, header);
    }

    /// Adds a canonical block and its header.
    pub fn add_block(&mut self, slot: Slot, attestations: Vec<Attestation>) {
        self.add_header(header(slot, true));
        self.blocks.insert(
            slot,
            BeaconBlock {
                slot,
                proposer_index: 0,
                parent_root: "0x00".to_string(),
                state_root: "0x00".to_string(),
                body: BeaconBlockBody { attestations },
            },
        );
    }

    pub fn add_attester_duty(&mut self, epoch: Epoch, duty: AttesterDuty) {
        self.attester_duties.entry(epoch).or_default().push(duty);
    }

    pub fn add_proposer_duty(&mut self, epoch: Epoch, validator_index: ValidatorIndex, slot: Slot) {
        self.proposer_duties.entry(epoch).or_default().push(ProposerDuty {
            pubkey: pubkey(validator_index),
            validator_index,
            slot,
        });
    }

    pub fn header_queries(&self, slot: Slot) -> usize {
        self.header_queries.lock().unwrap().get(&slot).copied().unwrap_or(0)
    }

    pub fn all_header_queries(&self) -> BTreeMap<Slot, usize> {
        self.header_queries.lock().unwrap().clone()
    }

    pub fn block_queries(&self) -> Vec<Slot> {
        self.block_queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl BeaconClient for FakeChain {
    async fn get_genesis(&self) -> Result<Genesis> {
        Ok(Genesis {
            genesis_time: self.genesis_time,
            genesis_validators_root: "0x00".to_string(),
            genesis_fork_version: "0x00000000".to_string(),
        })
    }

    async fn get_spec(&self) -> Result<BTreeMap<String, Value>> {
        Ok(self.spec.clone())
    }

    async fn validators_for_state(&self, _state_id: StateId, id: &[ValidatorId]) -> Result<Vec<ValidatorData>> {
        Ok(self
            .validators
            .iter()
            .filter(|validator| {
                id.is_empty()
                    || id.iter().any(|id| match id {
                        ValidatorId::Index(index) => validator.index == *index,
                        ValidatorId::Pubkey(pubkey) => validator.validator.pubkey == *pubkey,
                    })
            })
            .cloned()
            .collect())
    }

    async fn get_proposer_duties(&self, epoch: Epoch) -> Result<Vec<ProposerDuty>> {
        Ok(self.proposer_duties.get(&epoch).cloned().unwrap_or_default())
    }

    async fn get_attester_duties(&self, epoch: Epoch, indices: &[ValidatorIndex]) -> Result<Vec<AttesterDuty>> {
        Ok(self
            .attester_duties
            .get(&epoch)
            .into_iter()
            .flatten()
            .filter(|duty| indices.contains(&duty.validator_index))
            .cloned()
            .collect())
    }

    async fn get_block(&self, block_id: BlockId) -> Result<Option<BeaconBlock>> {
        let BlockId::Slot(slot) = block_id else {
            bail!("fake chain only serves blocks by slot");
        };
        self.block_queries.lock().unwrap().push(slot);
        if self.failing_blocks.contains(&slot) {
            bail!("connection reset by peer");
        }
        Ok(self.blocks.get(&slot).cloned())
    }

    async fn get_header_for_block(&self, block_id: BlockId) -> Result<Option<BlockHeaderData>> {
        let BlockId::Slot(slot) = block_id else {
            bail!("fake chain only serves headers by slot");
        };
        *self.header_queries.lock().unwrap().entry(slot).or_default() += 1;
        Ok(self.headers.get(&slot).cloned())
    }
}

pub fn root(slot: Slot) -> String {
    format!("0x{slot:064x}")
}

pub fn pubkey(index: ValidatorIndex) -> String {
    format!("0x{index:096x}")
}

pub fn validator(index: ValidatorIndex, activation_epoch: Epoch, exit_epoch: Epoch) -> ValidatorData {
    ValidatorData {
        index,
        balance: 32_000_000_000,
        status: ValidatorStatus::ActiveOngoing,
        validator: Validator {
            pubkey: pubkey(index),
            slashed: false,
            activation_eligibility_epoch: activation_epoch.saturating_sub(1),
            activation_epoch,
            effective_balance: 32_000_000_000,
            exit_epoch,
            withdrawable_epoch: exit_epoch,
            withdrawal_credentials: "0x00".to_string(),
        },
    }
}

pub fn header(slot: Slot, canonical: bool) -> BlockHeaderData {
    BlockHeaderData {
        root: root(slot),
        canonical,
        header: SignedBlockHeader {
            message: BlockHeader {
                slot,
                proposer_index: 0,
                parent_root: "0x00".to_string(),
                state_root: "0x00".to_string(),
                body_root: "0x00".to_string(),
            },
            signature: "0x00".to_string(),
        },
    }
}

pub fn attestation_data(
    slot: Slot,
    index: CommitteeIndex,
    beacon_block_root: &str,
    target_epoch: Epoch,
    target_root: &str,
) -> AttestationData {
    AttestationData {
        slot,
        index,
        beacon_block_root: beacon_block_root.to_string(),
        source: Checkpoint {
            epoch: target_epoch.saturating_sub(1),
            root: root(0),
        },
        target: Checkpoint {
            epoch: target_epoch,
            root: target_root.to_string(),
        },
    }
}

pub fn attestation(data: AttestationData, positions: &[usize]) -> Attestation {
    let mut aggregation_bits = AggregationBits::new(COMMITTEE_LENGTH);
    for &position in positions {
        aggregation_bits.set(position);
    }
    Attestation {
        aggregation_bits,
        data,
        signature: "0x00".to_string(),
        committee_bits: None,
    }
}

pub fn attester_duty(
    validator_index: ValidatorIndex,
    slot: Slot,
    committee_index: CommitteeIndex,
    validator_committee_index: u64,
) -> AttesterDuty {
    AttesterDuty {
        pubkey: pubkey(validator_index),
        validator_index,
        committee_index,
        committee_length: COMMITTEE_LENGTH as u64,
        committees_at_slot: 2,
        validator_committee_index,
        slot,
    }
}
