use std::{ops::RangeInclusive, str::FromStr};

use common::Epoch;

use crate::error::Error;

/// A user-supplied epoch, absolute or relative to the current one.
///
/// A non-negative literal is absolute, so `"0"` is the genesis epoch while `"-0"` is the
/// current epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpochRef {
    Current,
    Last,
    Absolute(Epoch),
    /// Number of epochs before the current one.
    Relative(u64),
}

impl EpochRef {
    pub fn resolve(self, current_epoch: Epoch) -> Epoch {
        match self {
            EpochRef::Current => current_epoch,
            EpochRef::Last => current_epoch.saturating_sub(1),
            EpochRef::Absolute(epoch) => epoch,
            EpochRef::Relative(back) => current_epoch.saturating_sub(back),
        }
    }
}

impl FromStr for EpochRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unparseable = || Error::UnparseableEpoch {
            descriptor: s.to_string(),
        };
        match s {
            "" | "current" | "head" | "-0" => Ok(Self::Current),
            "last" => Ok(Self::Last),
            _ => match s.strip_prefix('-') {
                Some(back) => back.parse().map(Self::Relative).map_err(|_| unparseable()),
                None => s.parse().map(Self::Absolute).map_err(|_| unparseable()),
            },
        }
    }
}

pub fn resolve_epoch(descriptor: &str, current_epoch: Epoch) -> Result<Epoch, Error> {
    Ok(descriptor.parse::<EpochRef>()?.resolve(current_epoch))
}

/// Inclusive span of epochs to report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochRange {
    pub start: Epoch,
    pub end: Epoch,
}

impl EpochRange {
    pub fn single(epoch: Epoch) -> Self {
        Self { start: epoch, end: epoch }
    }

    /// Combines a start descriptor, an end descriptor and an epoch count, at least one and at
    /// most two of which may be given.
    pub fn resolve(
        start: Option<&str>,
        end: Option<&str>,
        count: Option<u64>,
        current_epoch: Epoch,
    ) -> Result<Self, Error> {
        let resolve = |descriptor: &str| resolve_epoch(descriptor, current_epoch);
        let (start, end) = match (start, end, count) {
            (None, None, None) => {
                return Err(Error::InvalidEpochRange {
                    reason: "at least one of start, end or number of epochs must be specified".to_string(),
                })
            }
            (Some(_), Some(_), Some(_)) => {
                return Err(Error::InvalidEpochRange {
                    reason: "start, end and number of epochs cannot all be specified".to_string(),
                })
            }
            (Some(start), None, Some(count)) => {
                let start = resolve(start)?;
                (start, start.saturating_add(count))
            }
            (None, Some(end), Some(count)) => {
                let end = resolve(end)?;
                (end.saturating_sub(count), end)
            }
            (Some(start), Some(end), None) => (resolve(start)?, resolve(end)?),
            (Some(start), None, None) => (resolve(start)?, current_epoch),
            (None, Some(end), None) => {
                let end = resolve(end)?;
                (end, end)
            }
            (None, None, Some(count)) => (current_epoch.saturating_sub(count), current_epoch),
        };
        if start > end {
            return Err(Error::InvalidEpochRange {
                reason: format!("start epoch {start} is greater than end epoch {end}"),
            });
        }
        Ok(Self { start, end })
    }

    pub fn epochs(&self) -> RangeInclusive<Epoch> {
        self.start..=self.end
    }
}
