use std::{fmt::Display, str::FromStr};

use anyhow::anyhow;

use crate::Slot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateId {
    Head,
    Genesis,
    Finalized,
    Justified,
    Slot(Slot),
    StateRoot(String),
}

impl Display for StateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateId::Head => write!(f, "head"),
            StateId::Genesis => write!(f, "genesis"),
            StateId::Finalized => write!(f, "finalized"),
            StateId::Justified => write!(f, "justified"),
            StateId::Slot(slot) => write!(f, "{slot}"),
            StateId::StateRoot(root) => write!(f, "{root}"),
        }
    }
}

impl FromStr for StateId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "head" => Ok(Self::Head),
            "genesis" => Ok(Self::Genesis),
            "finalized" => Ok(Self::Finalized),
            "justified" => Ok(Self::Justified),
            root if root.starts_with("0x") => Ok(Self::StateRoot(root.to_string())),
            slot => slot
                .parse()
                .map(Self::Slot)
                .map_err(|_| anyhow!("Invalid state id: {}", s)),
        }
    }
}
