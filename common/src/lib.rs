pub mod attestation;
pub mod block;
pub mod duty;
pub mod genesis;
pub mod state;
pub mod util;
pub mod validator;

pub type Slot = u64;
pub type Epoch = u64;
pub type ValidatorIndex = u64;
pub type CommitteeIndex = u64;
pub type Gwei = u64;
