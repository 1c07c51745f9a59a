use serde::{Deserialize, Serialize};

use crate::util::deserialize_num;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Genesis {
    /// Unix timestamp in seconds.
    #[serde(deserialize_with = "deserialize_num")]
    pub genesis_time: u64,
    pub genesis_validators_root: String,
    pub genesis_fork_version: String,
}
