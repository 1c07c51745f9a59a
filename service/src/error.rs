use common::Slot;
use thiserror::Error;

/// Failures the report can name precisely. Transport failures from the beacon node are not
/// listed here; they reach the caller as plain `anyhow` errors with context attached.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{name} not found in spec")]
    MissingSpecConstant { name: &'static str },
    #[error("{name} has unexpected value {value}")]
    MalformedSpecConstant { name: &'static str, value: String },
    #[error("unparseable epoch descriptor {descriptor:?}")]
    UnparseableEpoch { descriptor: String },
    #[error("invalid epoch range: {reason}")]
    InvalidEpochRange { reason: String },
    #[error("invalid range {selector:?}")]
    InvalidRange { selector: String },
    #[error("invalid index {selector:?}")]
    InvalidIndex { selector: String },
    #[error("bad public key length {length} for {selector:?}, expected 48 bytes")]
    BadPublicKeyLength { selector: String, length: usize },
    #[error("invalid public key {selector:?}")]
    InvalidPublicKey { selector: String },
    #[error("no validators specified")]
    NoValidators,
    #[error("unknown validator {selector}")]
    UnknownValidator { selector: String },
    #[error("no canonical block header at or before slot {slot} (searched back to slot 0)")]
    NoCanonicalHeader { slot: Slot },
}
