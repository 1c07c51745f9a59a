use std::fmt::Display;

use common::{util::deserialize_num, Slot};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VersionResponse {
    pub data: Version,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Version {
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SyncStatus {
    #[serde(deserialize_with = "deserialize_num")]
    pub head_slot: Slot,
    #[serde(deserialize_with = "deserialize_num")]
    pub sync_distance: u64,
    pub is_syncing: bool,
    #[serde(default)]
    pub is_optimistic: Option<bool>,
    #[serde(default)]
    pub el_offline: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SyncingResponse {
    pub data: SyncStatus,
}

/// Decoded from the status code of `/eth/v1/node/health`, which has no body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeHealth {
    Ready,
    Syncing,
    NotInitialized,
}

impl Display for NodeHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeHealth::Ready => write!(f, "ready"),
            NodeHealth::Syncing => write!(f, "syncing"),
            NodeHealth::NotInitialized => write!(f, "not initialized"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Peer {
    pub peer_id: String,
    #[serde(default)]
    pub enr: Option<String>,
    #[serde(default)]
    pub last_seen_p2p_address: Option<String>,
    pub state: String,
    pub direction: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PeersResponse {
    pub data: Vec<Peer>,
}
