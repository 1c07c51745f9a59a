use std::{collections::HashMap, sync::Arc};

use anyhow::{Context, Result};
use client::BeaconClient;
use common::{
    attestation::AttestationData,
    block::{BlockHeaderData, BlockId},
    util::roots_match,
    Slot,
};

use crate::{chain_time::ChainTime, error::Error};

/// Block headers by slot, fetched on first use and kept for one summarizer run.
///
/// `None` entries record slots the node has no block for, so empty slots are not queried twice
/// either. The cache must not outlive the run: a reorg can change which headers are canonical.
pub struct HeaderCache {
    client: Arc<dyn BeaconClient>,
    headers: HashMap<Slot, Option<BlockHeaderData>>,
}

impl HeaderCache {
    pub fn new(client: Arc<dyn BeaconClient>) -> Self {
        Self {
            client,
            headers: HashMap::new(),
        }
    }

    pub async fn fetch(&mut self, slot: Slot) -> Result<Option<&BlockHeaderData>> {
        if !self.headers.contains_key(&slot) {
            let header = self
                .client
                .get_header_for_block(BlockId::Slot(slot))
                .await
                .with_context(|| format!("failed to obtain block header for slot {slot}"))?;
            self.headers.insert(slot, header);
        }
        Ok(self.headers.get(&slot).and_then(Option::as_ref))
    }

    /// Walks back from `slot` to the closest slot holding a canonical block and returns its root.
    pub async fn canonical_root_at_or_before(&mut self, slot: Slot) -> Result<String> {
        let mut current = slot;
        loop {
            if let Some(header) = self.fetch(current).await? {
                if header.canonical {
                    return Ok(header.root.clone());
                }
            }
            if current == 0 {
                return Err(Error::NoCanonicalHeader { slot }.into());
            }
            current -= 1;
        }
    }

    /// Whether the vote's head matches the canonical chain at the attested slot.
    pub async fn head_correct(&mut self, data: &AttestationData) -> Result<bool> {
        let root = self.canonical_root_at_or_before(data.slot).await?;
        Ok(roots_match(&root, &data.beacon_block_root))
    }

    /// Whether the vote's target matches the canonical block at the start of the target epoch.
    pub async fn target_correct(&mut self, data: &AttestationData, chain_time: &ChainTime) -> Result<bool> {
        let slot = chain_time.first_slot_of_epoch(data.target.epoch);
        let root = self.canonical_root_at_or_before(slot).await?;
        Ok(roots_match(&root, &data.target.root))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{attestation_data, header, root, FakeChain};

    fn chain() -> FakeChain {
        let mut chain = FakeChain::new(Vec::new());
        chain.add_header(header(0, true));
        chain.add_header(header(64, true));
        chain.add_header(header(66, true));
        chain.add_header(header(67, false));
        chain
    }

    #[tokio::test]
    async fn empty_slots_are_cached_as_absent() -> Result<()> {
        let chain = Arc::new(chain());
        let mut cache = HeaderCache::new(chain.clone());
        assert!(cache.fetch(65).await?.is_none());
        assert!(cache.fetch(65).await?.is_none());
        assert_eq!(cache.fetch(66).await?.map(|header| header.root.clone()), Some(root(66)));
        assert_eq!(chain.header_queries(65), 1);
        assert_eq!(cache.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn walk_skips_empty_and_orphaned_slots() -> Result<()> {
        let chain = Arc::new(chain());
        let mut cache = HeaderCache::new(chain.clone());
        assert_eq!(cache.canonical_root_at_or_before(68).await?, root(66));
        assert_eq!(cache.canonical_root_at_or_before(65).await?, root(64));
        assert_eq!(cache.canonical_root_at_or_before(66).await?, root(66));
        for slot in 64..=68 {
            assert_eq!(chain.header_queries(slot), 1, "slot {slot}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn head_and_target_votes() -> Result<()> {
        let chain = Arc::new(chain());
        let chain_time = chain.chain_time();
        let mut cache = HeaderCache::new(chain);

        let correct = attestation_data(67, 0, &root(66), 2, &root(64));
        assert!(cache.head_correct(&correct).await?);
        assert!(cache.target_correct(&correct, &chain_time).await?);

        // The orphaned block at 67 is not the canonical head.
        let orphan = attestation_data(67, 0, &root(67), 2, &root(66));
        assert!(!cache.head_correct(&orphan).await?);
        assert!(!cache.target_correct(&orphan, &chain_time).await?);
        Ok(())
    }

    #[tokio::test]
    async fn search_stops_at_slot_zero() {
        let mut chain = FakeChain::new(Vec::new());
        chain.add_header(header(3, false));
        let mut cache = HeaderCache::new(Arc::new(chain));
        let err = cache.canonical_root_at_or_before(5).await.unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::NoCanonicalHeader { slot: 5 }));
    }
}
