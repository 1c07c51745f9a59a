use std::fmt::{self, Display, Formatter};

use crate::model::{EpochSummary, ValidatorFault};

impl Display for EpochSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Epoch {} (slots {}-{}):", self.epoch, self.first_slot, self.last_slot)?;
        writeln!(
            f,
            "  Active validators: {}, participating: {}",
            self.active_validators, self.participating_validators
        )?;
        if !self.proposals.is_empty() {
            writeln!(f, "  Proposer validators:")?;
            for proposal in &self.proposals {
                let outcome = if proposal.block { "proposed" } else { "missed" };
                writeln!(
                    f,
                    "    {} {} (slot {}, {outcome})",
                    proposal.proposer, proposal.pubkey, proposal.slot
                )?;
            }
        }
        if !self.non_participating_validators.is_empty() {
            writeln!(f, "  Non-participating validators:")?;
            for validator in &self.non_participating_validators {
                writeln!(
                    f,
                    "    {} (slot {}, committee {})",
                    validator.validator_index, validator.slot, validator.committee_index
                )?;
            }
        }
        write_faults(f, "Incorrect head validators", &self.incorrect_head_validators, false)?;
        write_faults(f, "Untimely head validators", &self.untimely_head_validators, true)?;
        write_faults(f, "Untimely source validators", &self.untimely_source_validators, true)?;
        write_faults(f, "Incorrect target validators", &self.incorrect_target_validators, false)?;
        write_faults(f, "Untimely target validators", &self.untimely_target_validators, true)
    }
}

fn write_faults(f: &mut Formatter<'_>, title: &str, faults: &[ValidatorFault], with_delay: bool) -> fmt::Result {
    if faults.is_empty() {
        return Ok(());
    }
    writeln!(f, "  {title}:")?;
    for fault in faults {
        let data = &fault.attestation_data;
        if with_delay {
            writeln!(
                f,
                "    {} (slot {}, committee {}, inclusion delay {})",
                fault.validator_index, data.slot, data.index, fault.inclusion_delay
            )?;
        } else {
            writeln!(
                f,
                "    {} (slot {}, committee {})",
                fault.validator_index, data.slot, data.index
            )?;
        }
    }
    Ok(())
}
