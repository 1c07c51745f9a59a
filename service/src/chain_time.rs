use std::{
    collections::BTreeMap,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use client::BeaconClient;
use common::{genesis::Genesis, Epoch, Slot};
use serde_json::Value;

use crate::error::Error;

const SECONDS_PER_SLOT: &str = "SECONDS_PER_SLOT";
const SLOTS_PER_EPOCH: &str = "SLOTS_PER_EPOCH";
const EPOCHS_PER_SYNC_COMMITTEE_PERIOD: &str = "EPOCHS_PER_SYNC_COMMITTEE_PERIOD";

/// Conversions between wall-clock time, slots and epochs for one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainTime {
    genesis_time: SystemTime,
    slot_duration: Duration,
    slots_per_epoch: u64,
    epochs_per_sync_committee_period: Option<u64>,
}

impl ChainTime {
    pub fn new(
        genesis_time: SystemTime,
        slot_duration: Duration,
        slots_per_epoch: u64,
        epochs_per_sync_committee_period: Option<u64>,
    ) -> Result<Self, Error> {
        if slot_duration.is_zero() {
            return Err(Error::MalformedSpecConstant {
                name: SECONDS_PER_SLOT,
                value: "0".to_string(),
            });
        }
        if slots_per_epoch == 0 {
            return Err(Error::MalformedSpecConstant {
                name: SLOTS_PER_EPOCH,
                value: "0".to_string(),
            });
        }
        if epochs_per_sync_committee_period == Some(0) {
            return Err(Error::MalformedSpecConstant {
                name: EPOCHS_PER_SYNC_COMMITTEE_PERIOD,
                value: "0".to_string(),
            });
        }
        Ok(Self {
            genesis_time,
            slot_duration,
            slots_per_epoch,
            epochs_per_sync_committee_period,
        })
    }

    /// Fetches genesis and the spec constants once.
    pub async fn from_client(client: &dyn BeaconClient) -> Result<Self> {
        let genesis = client.get_genesis().await.context("failed to obtain genesis time")?;
        log::debug!("Genesis time: {}", genesis.genesis_time);
        let spec = client.get_spec().await.context("failed to obtain spec")?;
        Ok(Self::from_spec(&genesis, &spec)?)
    }

    pub fn from_spec(genesis: &Genesis, spec: &BTreeMap<String, Value>) -> Result<Self, Error> {
        let seconds_per_slot = spec_constant(spec, SECONDS_PER_SLOT)?.ok_or(Error::MissingSpecConstant {
            name: SECONDS_PER_SLOT,
        })?;
        let slots_per_epoch = spec_constant(spec, SLOTS_PER_EPOCH)?.ok_or(Error::MissingSpecConstant {
            name: SLOTS_PER_EPOCH,
        })?;
        let epochs_per_sync_committee_period = spec_constant(spec, EPOCHS_PER_SYNC_COMMITTEE_PERIOD)?;
        Self::new(
            UNIX_EPOCH + Duration::from_secs(genesis.genesis_time),
            Duration::from_secs(seconds_per_slot),
            slots_per_epoch,
            epochs_per_sync_committee_period,
        )
    }

    pub fn genesis_time(&self) -> SystemTime {
        self.genesis_time
    }

    pub fn slot_duration(&self) -> Duration {
        self.slot_duration
    }

    pub fn slots_per_epoch(&self) -> u64 {
        self.slots_per_epoch
    }

    /// `None` when the slot starts later than `SystemTime` can represent.
    pub fn start_of_slot(&self, slot: Slot) -> Option<SystemTime> {
        self.genesis_time.checked_add(slot_offset(self.slot_duration, slot)?)
    }

    pub fn start_of_epoch(&self, epoch: Epoch) -> Option<SystemTime> {
        self.start_of_slot(self.first_slot_of_epoch(epoch))
    }

    /// Slot containing `timestamp`; anything before genesis is slot 0.
    pub fn timestamp_to_slot(&self, timestamp: SystemTime) -> Slot {
        match timestamp.duration_since(self.genesis_time) {
            Ok(elapsed) => (elapsed.as_nanos() / self.slot_duration.as_nanos()) as Slot,
            Err(_) => 0,
        }
    }

    pub fn timestamp_to_epoch(&self, timestamp: SystemTime) -> Epoch {
        self.slot_to_epoch(self.timestamp_to_slot(timestamp))
    }

    pub fn current_slot(&self) -> Slot {
        self.timestamp_to_slot(SystemTime::now())
    }

    pub fn current_epoch(&self) -> Epoch {
        self.slot_to_epoch(self.current_slot())
    }

    pub fn slot_to_epoch(&self, slot: Slot) -> Epoch {
        slot / self.slots_per_epoch
    }

    pub fn first_slot_of_epoch(&self, epoch: Epoch) -> Slot {
        epoch.saturating_mul(self.slots_per_epoch)
    }

    pub fn last_slot_of_epoch(&self, epoch: Epoch) -> Slot {
        self.first_slot_of_epoch(epoch).saturating_add(self.slots_per_epoch - 1)
    }

    pub fn epoch_to_sync_committee_period(&self, epoch: Epoch) -> Result<u64, Error> {
        let epochs_per_period = self
            .epochs_per_sync_committee_period
            .ok_or(Error::MissingSpecConstant {
                name: EPOCHS_PER_SYNC_COMMITTEE_PERIOD,
            })?;
        Ok(epoch / epochs_per_period)
    }

    pub fn slot_to_sync_committee_period(&self, slot: Slot) -> Result<u64, Error> {
        self.epoch_to_sync_committee_period(self.slot_to_epoch(slot))
    }

    pub fn current_sync_committee_period(&self) -> Result<u64, Error> {
        self.epoch_to_sync_committee_period(self.current_epoch())
    }
}

fn slot_offset(slot_duration: Duration, slot: Slot) -> Option<Duration> {
    let nanos = slot_duration.as_nanos().checked_mul(u128::from(slot))?;
    let secs = u64::try_from(nanos / 1_000_000_000).ok()?;
    Some(Duration::new(secs, (nanos % 1_000_000_000) as u32))
}

fn spec_constant(spec: &BTreeMap<String, Value>, name: &'static str) -> Result<Option<u64>, Error> {
    let Some(value) = spec.get(name) else {
        return Ok(None);
    };
    let parsed = match value {
        Value::String(value) => value.parse().ok(),
        Value::Number(value) => value.as_u64(),
        _ => None,
    };
    parsed.map(Some).ok_or_else(|| Error::MalformedSpecConstant {
        name,
        value: value.to_string(),
    })
}
