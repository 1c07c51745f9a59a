use common::{
    attestation::AttestationData, validator::ValidatorData, CommitteeIndex, Epoch, Slot, ValidatorIndex,
};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlotAttestations {
    pub expected: u64,
    pub included: u64,
    pub correct_head: u64,
    pub timely_head: u64,
    pub correct_target: u64,
    pub timely_target: u64,
    pub timely_source: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotSummary {
    pub slot: Slot,
    pub attestations: SlotAttestations,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpochProposal {
    pub slot: Slot,
    pub proposer: ValidatorIndex,
    pub pubkey: String,
    /// False when the slot stayed empty.
    pub block: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatorFault {
    pub validator_index: ValidatorIndex,
    pub attestation_data: AttestationData,
    pub inclusion_delay: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NonParticipatingValidator {
    pub validator_index: ValidatorIndex,
    pub slot: Slot,
    pub committee_index: CommitteeIndex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpochSummary {
    pub epoch: Epoch,
    pub validators: Vec<ValidatorData>,
    pub first_slot: Slot,
    pub last_slot: Slot,
    pub active_validators: usize,
    pub participating_validators: usize,
    pub non_participating_validators: Vec<NonParticipatingValidator>,
    pub incorrect_head_validators: Vec<ValidatorFault>,
    pub untimely_head_validators: Vec<ValidatorFault>,
    pub untimely_source_validators: Vec<ValidatorFault>,
    pub incorrect_target_validators: Vec<ValidatorFault>,
    pub untimely_target_validators: Vec<ValidatorFault>,
    pub slots: Vec<SlotSummary>,
    pub proposals: Vec<EpochProposal>,
}

impl EpochSummary {
    pub(crate) fn new(epoch: Epoch, first_slot: Slot, last_slot: Slot) -> Self {
        let slots = (first_slot..=last_slot)
            .map(|slot| SlotSummary {
                slot,
                attestations: SlotAttestations::default(),
            })
            .collect();
        Self {
            epoch,
            validators: Vec::new(),
            first_slot,
            last_slot,
            active_validators: 0,
            participating_validators: 0,
            non_participating_validators: Vec::new(),
            incorrect_head_validators: Vec::new(),
            untimely_head_validators: Vec::new(),
            untimely_source_validators: Vec::new(),
            incorrect_target_validators: Vec::new(),
            untimely_target_validators: Vec::new(),
            slots,
            proposals: Vec::new(),
        }
    }

    pub fn slot_attestations(&self, slot: Slot) -> Option<&SlotAttestations> {
        let index = usize::try_from(slot.checked_sub(self.first_slot)?).ok()?;
        self.slots.get(index).map(|summary| &summary.attestations)
    }

    pub(crate) fn slot_attestations_mut(&mut self, slot: Slot) -> Option<&mut SlotAttestations> {
        let index = usize::try_from(slot.checked_sub(self.first_slot)?).ok()?;
        self.slots.get_mut(index).map(|summary| &mut summary.attestations)
    }
}
