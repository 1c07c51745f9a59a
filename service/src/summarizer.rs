use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use anyhow::{Context, Result};
use client::BeaconClient;
use common::{
    block::{BeaconBlock, BlockId},
    duty::AttesterDuty,
    state::StateId,
    validator::ValidatorData,
    CommitteeIndex, Epoch, Slot, ValidatorIndex,
};
use futures_util::{future::try_join_all, stream, StreamExt};
use itertools::Itertools;

use crate::{
    chain_time::ChainTime,
    epoch::resolve_epoch,
    header_cache::HeaderCache,
    model::{EpochProposal, EpochSummary, NonParticipatingValidator, ValidatorFault},
    selector::ValidatorSelector,
};

pub const DEFAULT_BLOCK_FETCH_CONCURRENCY: usize = 8;

const TIMELY_HEAD_DELAY: u64 = 1;
const TIMELY_SOURCE_DELAY: u64 = 5;
const TIMELY_TARGET_DELAY: u64 = 32;

/// Builds per-epoch proposal and attestation reports for a set of validators.
pub struct EpochSummarizer {
    client: Arc<dyn BeaconClient>,
    chain_time: ChainTime,
    selector: ValidatorSelector,
    block_fetch_concurrency: usize,
}

impl EpochSummarizer {
    pub fn new(client: Arc<dyn BeaconClient>, chain_time: ChainTime) -> Self {
        Self {
            selector: ValidatorSelector::new(client.clone()),
            client,
            chain_time,
            block_fetch_concurrency: DEFAULT_BLOCK_FETCH_CONCURRENCY,
        }
    }

    /// Number of blocks requested ahead while scanning for attestations. Results are still
    /// processed in slot order.
    pub fn with_block_fetch_concurrency(mut self, block_fetch_concurrency: usize) -> Self {
        self.block_fetch_concurrency = block_fetch_concurrency.max(1);
        self
    }

    pub fn chain_time(&self) -> &ChainTime {
        &self.chain_time
    }

    pub async fn summarize(&self, selectors: &[String], state_id: StateId, epoch: &str) -> Result<EpochSummary> {
        let epoch = resolve_epoch(epoch, self.chain_time.current_epoch())?;
        self.summarize_epoch(selectors, state_id, epoch).await
    }

    pub async fn summarize_epoch(&self, selectors: &[String], state_id: StateId, epoch: Epoch) -> Result<EpochSummary> {
        log::info!("Processing epoch {epoch}");
        let first_slot = self.chain_time.first_slot_of_epoch(epoch);
        let last_slot = self.chain_time.last_slot_of_epoch(epoch);
        let mut summary = EpochSummary::new(epoch, first_slot, last_slot);

        // Validator activity is judged as of the start of the epoch unless a state was given.
        let state_id = match state_id {
            StateId::Head => StateId::Slot(first_slot),
            state_id => state_id,
        };
        summary.validators = self.selector.select(selectors, state_id).await?;

        summary.proposals = self.process_proposer_duties(epoch, &summary.validators).await?;
        self.process_attester_duties(&mut summary).await?;
        log::info!(
            "Epoch {epoch}: {}/{} active validators participated",
            summary.participating_validators,
            summary.active_validators
        );
        Ok(summary)
    }

    async fn process_proposer_duties(&self, epoch: Epoch, validators: &[ValidatorData]) -> Result<Vec<EpochProposal>> {
        let selected = validators
            .iter()
            .map(|validator| (validator.index, validator))
            .collect::<HashMap<_, _>>();
        let duties = self
            .client
            .get_proposer_duties(epoch)
            .await
            .context("failed to obtain proposer duties")?;
        log::debug!("{} proposer duties in epoch {epoch}", duties.len());

        let proposals = duties.into_iter().filter_map(|duty| {
            let validator = selected.get(&duty.validator_index)?;
            let pubkey = validator.validator.pubkey.clone();
            let client = self.client.clone();
            Some(async move {
                let block = client
                    .get_block(BlockId::Slot(duty.slot))
                    .await
                    .with_context(|| format!("failed to obtain proposed block for slot {}", duty.slot))?;
                if block.is_none() {
                    log::info!("Validator {} missed its proposal at slot {}", duty.validator_index, duty.slot);
                }
                Ok::<_, anyhow::Error>(EpochProposal {
                    slot: duty.slot,
                    proposer: duty.validator_index,
                    pubkey,
                    block: block.is_some(),
                })
            })
        });
        try_join_all(proposals).await
    }

    async fn process_attester_duties(&self, summary: &mut EpochSummary) -> Result<()> {
        let epoch = summary.epoch;
        let active = summary
            .validators
            .iter()
            .filter(|validator| validator.validator.is_active_at(epoch))
            .map(|validator| validator.index)
            .collect::<Vec<_>>();
        summary.active_validators = active.len();
        if active.is_empty() {
            log::info!("No active validators in epoch {epoch}");
            return Ok(());
        }

        let duties = self
            .client
            .get_attester_duties(epoch, &active)
            .await
            .context("failed to obtain attester duties")?;
        log::debug!("{} attester duties in epoch {epoch}", duties.len());

        let mut duties_by_committee = BTreeMap::<(Slot, CommitteeIndex), Vec<AttesterDuty>>::new();
        let mut duties_by_validator = HashMap::<ValidatorIndex, (Slot, CommitteeIndex)>::new();
        for duty in duties {
            let Some(attestations) = summary.slot_attestations_mut(duty.slot) else {
                log::warn!(
                    "Ignoring attester duty of validator {} at slot {} outside epoch {epoch}",
                    duty.validator_index,
                    duty.slot
                );
                continue;
            };
            attestations.expected += 1;
            duties_by_validator.insert(duty.validator_index, (duty.slot, duty.committee_index));
            duties_by_committee
                .entry((duty.slot, duty.committee_index))
                .or_default()
                .push(duty);
        }

        let mut scan = InclusionScan {
            duties_by_committee,
            voted: HashSet::new(),
            headers: HeaderCache::new(self.client.clone()),
            chain_time: &self.chain_time,
        };
        if !duties_by_validator.is_empty() {
            self.scan_inclusion_window(&mut scan, summary, duties_by_validator.len())
                .await?;
        }
        log::debug!("Fetched {} block headers", scan.headers.len());

        summary.participating_validators = scan.voted.len();
        summary.non_participating_validators = active
            .iter()
            .filter(|index| !scan.voted.contains(*index))
            .filter_map(|&validator_index| {
                let &(slot, committee_index) = duties_by_validator.get(&validator_index)?;
                Some(NonParticipatingValidator {
                    validator_index,
                    slot,
                    committee_index,
                })
            })
            .sorted_by_key(|validator| (validator.slot, validator.committee_index, validator.validator_index))
            .collect();
        Ok(())
    }

    /// Walks the blocks that may include votes for the epoch, from its second slot to the start of
    /// the epoch after next, stopping early once every validator with a duty has voted.
    async fn scan_inclusion_window(
        &self,
        scan: &mut InclusionScan<'_>,
        summary: &mut EpochSummary,
        expected_voters: usize,
    ) -> Result<()> {
        let window_start = summary.first_slot + 1;
        let window_end = self
            .chain_time
            .first_slot_of_epoch(summary.epoch.saturating_add(2))
            .min(self.chain_time.current_slot());
        log::debug!("Scanning slots {window_start}..={window_end} for attestations");

        let client = &self.client;
        let mut blocks = stream::iter(window_start..=window_end)
            .map(|slot| async move {
                let block = client
                    .get_block(BlockId::Slot(slot))
                    .await
                    .with_context(|| format!("failed to obtain beacon block for slot {slot}"))?;
                Ok::<_, anyhow::Error>((slot, block))
            })
            .buffered(self.block_fetch_concurrency);

        while let Some(result) = blocks.next().await {
            let (slot, block) = result?;
            let Some(block) = block else {
                log::debug!("No block at slot {slot}");
                continue;
            };
            scan.process_block(slot, &block, summary).await?;
            if scan.voted.len() == expected_voters {
                log::debug!("All validators with duties voted by slot {slot}");
                break;
            }
        }
        Ok(())
    }
}

struct InclusionScan<'a> {
    duties_by_committee: BTreeMap<(Slot, CommitteeIndex), Vec<AttesterDuty>>,
    voted: HashSet<ValidatorIndex>,
    headers: HeaderCache,
    chain_time: &'a ChainTime,
}

impl InclusionScan<'_> {
    async fn process_block(&mut self, slot: Slot, block: &BeaconBlock, summary: &mut EpochSummary) -> Result<()> {
        log::debug!("{} attestations in block at slot {slot}", block.body.attestations.len());
        let multi_committee = block.body.committee_bits_attestations();
        if multi_committee > 0 {
            log::warn!(
                "Block at slot {slot} has {multi_committee} attestations with committee bits; they are matched on data.index only"
            );
        }
        for attestation in &block.body.attestations {
            let data = &attestation.data;
            let Some(duties) = self.duties_by_committee.get(&(data.slot, data.index)) else {
                continue;
            };
            for duty in duties {
                if !attestation.aggregation_bits.is_set(duty.validator_committee_index)
                    || self.voted.contains(&duty.validator_index)
                {
                    continue;
                }
                let Some(inclusion_delay) = slot.checked_sub(duty.slot) else {
                    log::warn!(
                        "Ignoring vote of validator {} for slot {} included earlier at slot {slot}",
                        duty.validator_index,
                        duty.slot
                    );
                    continue;
                };
                self.voted.insert(duty.validator_index);
                let head_correct = self
                    .headers
                    .head_correct(data)
                    .await
                    .context("failed to calculate if attestation had correct head vote")?;
                let target_correct = self
                    .headers
                    .target_correct(data, self.chain_time)
                    .await
                    .context("failed to calculate if attestation had correct target vote")?;
                let fault = ValidatorFault {
                    validator_index: duty.validator_index,
                    attestation_data: data.clone(),
                    inclusion_delay,
                };
                record_vote(summary, duty.slot, fault, head_correct, target_correct);
            }
        }
        Ok(())
    }
}

fn record_vote(summary: &mut EpochSummary, duty_slot: Slot, fault: ValidatorFault, head_correct: bool, target_correct: bool) {
    // A correct head only counts when included in the very next slot; an incorrect one is
    // additionally untimely once it is late.
    let timely_head = fault.inclusion_delay == TIMELY_HEAD_DELAY;
    let late_head = fault.inclusion_delay > TIMELY_HEAD_DELAY;
    let timely_source = fault.inclusion_delay <= TIMELY_SOURCE_DELAY;
    let timely_target = fault.inclusion_delay <= TIMELY_TARGET_DELAY;

    if let Some(attestations) = summary.slot_attestations_mut(duty_slot) {
        attestations.included += 1;
        if head_correct {
            attestations.correct_head += 1;
            if timely_head {
                attestations.timely_head += 1;
            }
        }
        if timely_source {
            attestations.timely_source += 1;
        }
        if target_correct {
            attestations.correct_target += 1;
            if timely_target {
                attestations.timely_target += 1;
            }
        }
    }

    if !head_correct {
        summary.incorrect_head_validators.push(fault.clone());
    }
    if (head_correct && !timely_head) || (!head_correct && late_head) {
        summary.untimely_head_validators.push(fault.clone());
    }
    if !timely_source {
        summary.untimely_source_validators.push(fault.clone());
    }
    if !target_correct {
        summary.incorrect_target_validators.push(fault.clone());
    }
    if !timely_target {
        summary.untimely_target_validators.push(fault);
    }
}
