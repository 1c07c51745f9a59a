pub mod chain_time;
pub mod epoch;
pub mod error;
pub mod header_cache;
pub mod model;
pub mod report;
pub mod selector;
pub mod summarizer;

#[cfg(test)]
mod fixture;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chain_time::ChainTime;
use client::BeaconClient;
use common::{state::StateId, validator::ValidatorData};
use epoch::EpochRange;
use model::EpochSummary;
use selector::ValidatorSelector;
use summarizer::EpochSummarizer;

pub use error::Error;

#[async_trait]
pub trait Service: Sync + Send {
    fn chain_time(&self) -> &ChainTime;

    async fn summarize(&self, selectors: &[String], state_id: StateId, epoch: &str) -> Result<EpochSummary>;
    async fn summarize_range(
        &self,
        selectors: &[String],
        state_id: StateId,
        range: EpochRange,
    ) -> Result<Vec<EpochSummary>>;

    async fn validator(&self, selector: &str, state_id: StateId) -> Result<ValidatorData>;
}

pub struct ServiceImpl {
    summarizer: EpochSummarizer,
    selector: ValidatorSelector,
}

impl ServiceImpl {
    /// Reads genesis and the chain constants from the node once; they are fixed for the
    /// lifetime of the service.
    pub async fn new(client: Arc<dyn BeaconClient>) -> Result<Self> {
        let chain_time = ChainTime::from_client(client.as_ref()).await?;
        Ok(Self {
            summarizer: EpochSummarizer::new(client.clone(), chain_time),
            selector: ValidatorSelector::new(client),
        })
    }

    pub fn with_block_fetch_concurrency(mut self, block_fetch_concurrency: usize) -> Self {
        self.summarizer = self.summarizer.with_block_fetch_concurrency(block_fetch_concurrency);
        self
    }
}

#[async_trait]
impl Service for ServiceImpl {
    fn chain_time(&self) -> &ChainTime {
        self.summarizer.chain_time()
    }

    async fn summarize(&self, selectors: &[String], state_id: StateId, epoch: &str) -> Result<EpochSummary> {
        self.summarizer.summarize(selectors, state_id, epoch).await
    }

    async fn summarize_range(
        &self,
        selectors: &[String],
        state_id: StateId,
        range: EpochRange,
    ) -> Result<Vec<EpochSummary>> {
        let mut summaries = Vec::new();
        for epoch in range.epochs() {
            let summary = self
                .summarizer
                .summarize_epoch(selectors, state_id.clone(), epoch)
                .await?;
            summaries.push(summary);
        }
        Ok(summaries)
    }

    async fn validator(&self, selector: &str, state_id: StateId) -> Result<ValidatorData> {
        self.selector.select_one(selector, state_id).await
    }
}
