use std::{collections::BTreeSet, sync::Arc};

use anyhow::{Context, Result};
use client::BeaconClient;
use common::{
    state::StateId,
    validator::{ValidatorData, ValidatorId},
    ValidatorIndex,
};
use itertools::Itertools;

use crate::error::Error;

const PUBKEY_LENGTH: usize = 48;
/// Widest `A-B` range accepted, a few times the size of the mainnet validator set.
const MAX_RANGE_LENGTH: u64 = 1 << 23;

/// Resolves user-supplied validator selectors against a beacon state.
pub struct ValidatorSelector {
    client: Arc<dyn BeaconClient>,
}

impl ValidatorSelector {
    pub fn new(client: Arc<dyn BeaconClient>) -> Self {
        Self { client }
    }

    /// Expands indices and inclusive `A-B` ranges and fetches them with one state query.
    /// The records come back deduplicated and in ascending index order.
    pub async fn select<S: AsRef<str>>(&self, selectors: &[S], state_id: StateId) -> Result<Vec<ValidatorData>> {
        let indices = parse_indices(selectors)?;
        let ids = indices.iter().copied().map(ValidatorId::Index).collect::<Vec<_>>();
        log::info!("Fetching {} validators at state {state_id}", ids.len());
        let validators = self
            .client
            .validators_for_state(state_id, &ids)
            .await
            .with_context(|| format!("failed to obtain validators {}", describe(&indices)))?;
        let validators = validators
            .into_iter()
            .filter(|validator| indices.contains(&validator.index))
            .sorted_by_key(|validator| validator.index)
            .dedup_by(|a, b| a.index == b.index)
            .collect::<Vec<_>>();
        if validators.is_empty() {
            return Err(Error::UnknownValidator {
                selector: selectors.iter().map(AsRef::as_ref).join(","),
            }
            .into());
        }
        Ok(validators)
    }

    /// Looks up a single validator by index or by `0x`-prefixed public key.
    pub async fn select_one(&self, selector: &str, state_id: StateId) -> Result<ValidatorData> {
        let id = match selector.parse::<ValidatorIndex>() {
            Ok(index) => ValidatorId::Index(index),
            Err(_) => ValidatorId::Pubkey(parse_pubkey(selector)?),
        };
        let validators = self
            .client
            .validators_for_state(state_id, std::slice::from_ref(&id))
            .await
            .context("failed to obtain validator information")?;
        validators
            .into_iter()
            .find(|validator| match &id {
                ValidatorId::Index(index) => validator.index == *index,
                ValidatorId::Pubkey(pubkey) => validator.validator.pubkey.eq_ignore_ascii_case(pubkey),
            })
            .ok_or_else(|| {
                Error::UnknownValidator {
                    selector: selector.to_string(),
                }
                .into()
            })
    }
}

pub fn parse_indices<S: AsRef<str>>(selectors: &[S]) -> Result<BTreeSet<ValidatorIndex>, Error> {
    if selectors.is_empty() {
        return Err(Error::NoValidators);
    }
    let mut indices = BTreeSet::new();
    for selector in selectors.iter().map(AsRef::as_ref) {
        if selector.contains('-') {
            let invalid_range = || Error::InvalidRange {
                selector: selector.to_string(),
            };
            let bounds = selector.split('-').collect::<Vec<_>>();
            let [low, high] = bounds.as_slice() else {
                return Err(invalid_range());
            };
            let low = low.parse::<ValidatorIndex>().map_err(|_| invalid_range())?;
            let high = high.parse::<ValidatorIndex>().map_err(|_| invalid_range())?;
            if low > high || high - low >= MAX_RANGE_LENGTH {
                return Err(invalid_range());
            }
            indices.extend(low..=high);
        } else {
            let index = selector.parse().map_err(|_| Error::InvalidIndex {
                selector: selector.to_string(),
            })?;
            indices.insert(index);
        }
    }
    Ok(indices)
}

/// Normalizes a BLS public key to lowercase `0x` hex after checking it decodes to 48 bytes.
pub fn parse_pubkey(selector: &str) -> Result<String, Error> {
    let bytes = selector
        .strip_prefix("0x")
        .and_then(|encoded| hex::decode(encoded).ok())
        .ok_or_else(|| Error::InvalidPublicKey {
            selector: selector.to_string(),
        })?;
    if bytes.len() != PUBKEY_LENGTH {
        return Err(Error::BadPublicKeyLength {
            selector: selector.to_string(),
            length: bytes.len(),
        });
    }
    Ok(format!("0x{}", hex::encode(bytes)))
}

fn describe(indices: &BTreeSet<ValidatorIndex>) -> String {
    match (indices.first(), indices.last()) {
        (Some(first), Some(last)) if indices.len() > 8 => format!("{first}..={last} ({} total)", indices.len()),
        _ => indices.iter().join(","),
    }
}
