use std::{collections::BTreeMap, sync::Arc, time::Duration};

use anyhow::{bail, Result};
use async_trait::async_trait;
use common::{
    block::{BeaconBlock, BlockHeaderData, BlockId},
    duty::{AttesterDuty, ProposerDuty},
    genesis::Genesis,
    state::StateId,
    validator::{ValidatorData, ValidatorId},
    Epoch, ValidatorIndex,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::model::{
    block::{BlockHeaderResponse, BlockResponse},
    duty::{AttesterDutiesResponse, ProposerDutiesResponse},
    genesis::{GenesisResponse, SpecResponse},
    node::{NodeHealth, Peer, PeersResponse, SyncStatus, SyncingResponse, VersionResponse},
    state::{Fork, ForkResponse},
    validator::ValidatorResponse,
};

pub mod model;

// Keeps `?id=` query strings well below common URL length limits.
const VALIDATOR_IDS_PER_REQUEST: usize = 500;

/// The beacon node queries the performance report is built from.
///
/// Endpoints addressing a single block or header return `Ok(None)` when the node has nothing at
/// that slot, so an empty slot can be told apart from a failed request.
#[async_trait]
pub trait BeaconClient: Sync + Send {
    async fn get_genesis(&self) -> Result<Genesis>;
    async fn get_spec(&self) -> Result<BTreeMap<String, serde_json::Value>>;
    async fn validators_for_state(&self, state_id: StateId, id: &[ValidatorId]) -> Result<Vec<ValidatorData>>;
    async fn get_proposer_duties(&self, epoch: Epoch) -> Result<Vec<ProposerDuty>>;
    async fn get_attester_duties(&self, epoch: Epoch, indices: &[ValidatorIndex]) -> Result<Vec<AttesterDuty>>;
    async fn get_block(&self, block_id: BlockId) -> Result<Option<BeaconBlock>>;
    async fn get_header_for_block(&self, block_id: BlockId) -> Result<Option<BlockHeaderData>>;
}

/// Liveness and chain information used by the `ping` and `info` commands.
#[async_trait]
pub trait NodeClient: Sync + Send {
    async fn get_node_version(&self) -> Result<String>;
    async fn get_syncing(&self) -> Result<SyncStatus>;
    async fn get_health(&self) -> Result<NodeHealth>;
    async fn get_peers(&self, state: Option<&str>) -> Result<Vec<Peer>>;
    async fn get_fork(&self, state_id: StateId) -> Result<Fork>;
}

pub struct HttpClient {
    http_rpc_url: Url,
    client: Arc<reqwest::Client>,
}

impl HttpClient {
    pub fn new(http_rpc_url: Url, timeout: Duration) -> Result<Self> {
        let client = Arc::new(reqwest::Client::builder().timeout(timeout).build()?);
        Ok(Self { http_rpc_url, client })
    }

    pub fn url(&self) -> &Url {
        &self.http_rpc_url
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        log::debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        response.error_for_status_ref()?;
        Ok(response.json::<T>().await?)
    }

    async fn get_optional<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        log::debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        match response.error_for_status_ref() {
            Ok(_) => Ok(Some(response.json::<T>().await?)),
            Err(err) if err.status() == Some(StatusCode::NOT_FOUND) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl BeaconClient for HttpClient {
    async fn get_genesis(&self) -> Result<Genesis> {
        let url = self.http_rpc_url.join("eth/v1/beacon/genesis")?;
        Ok(self.get::<GenesisResponse>(url).await?.data)
    }

    async fn get_spec(&self) -> Result<BTreeMap<String, serde_json::Value>> {
        let url = self.http_rpc_url.join("eth/v1/config/spec")?;
        Ok(self.get::<SpecResponse>(url).await?.data)
    }

    async fn validators_for_state(&self, state_id: StateId, id: &[ValidatorId]) -> Result<Vec<ValidatorData>> {
        let url = self
            .http_rpc_url
            .join(&format!("eth/v1/beacon/states/{state_id}/validators"))?;
        if id.is_empty() {
            return Ok(self.get::<ValidatorResponse>(url).await?.data);
        }
        let mut validators = Vec::with_capacity(id.len());
        for chunk in id.chunks(VALIDATOR_IDS_PER_REQUEST) {
            let mut url = url.clone();
            let id = chunk.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(",");
            url.query_pairs_mut().append_pair("id", &id);
            validators.extend(self.get::<ValidatorResponse>(url).await?.data);
        }
        Ok(validators)
    }

    async fn get_proposer_duties(&self, epoch: Epoch) -> Result<Vec<ProposerDuty>> {
        let url = self
            .http_rpc_url
            .join(&format!("eth/v1/validator/duties/proposer/{epoch}"))?;
        Ok(self.get::<ProposerDutiesResponse>(url).await?.data)
    }

    async fn get_attester_duties(&self, epoch: Epoch, indices: &[ValidatorIndex]) -> Result<Vec<AttesterDuty>> {
        let url = self
            .http_rpc_url
            .join(&format!("eth/v1/validator/duties/attester/{epoch}"))?;
        let body = indices.iter().map(|index| index.to_string()).collect::<Vec<_>>();
        log::debug!("POST {url} ({} validators)", body.len());
        let response = self.client.post(url).json(&body).send().await?;
        response.error_for_status_ref()?;
        Ok(response.json::<AttesterDutiesResponse>().await?.data)
    }

    async fn get_block(&self, block_id: BlockId) -> Result<Option<BeaconBlock>> {
        let url = self.http_rpc_url.join(&format!("eth/v2/beacon/blocks/{block_id}"))?;
        let response = self.get_optional::<BlockResponse>(url).await?;
        Ok(response.map(|response| response.data.message))
    }

    async fn get_header_for_block(&self, block_id: BlockId) -> Result<Option<BlockHeaderData>> {
        let url = self.http_rpc_url.join(&format!("eth/v1/beacon/headers/{block_id}"))?;
        let response = self.get_optional::<BlockHeaderResponse>(url).await?;
        Ok(response.map(|response| response.data))
    }
}

#[async_trait]
impl NodeClient for HttpClient {
    async fn get_node_version(&self) -> Result<String> {
        let url = self.http_rpc_url.join("eth/v1/node/version")?;
        Ok(self.get::<VersionResponse>(url).await?.data.version)
    }

    async fn get_syncing(&self) -> Result<SyncStatus> {
        let url = self.http_rpc_url.join("eth/v1/node/syncing")?;
        Ok(self.get::<SyncingResponse>(url).await?.data)
    }

    async fn get_health(&self) -> Result<NodeHealth> {
        let url = self.http_rpc_url.join("eth/v1/node/health")?;
        log::debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(NodeHealth::Ready),
            StatusCode::PARTIAL_CONTENT => Ok(NodeHealth::Syncing),
            StatusCode::SERVICE_UNAVAILABLE => Ok(NodeHealth::NotInitialized),
            status => bail!("Unexpected node health status {status}"),
        }
    }

    async fn get_peers(&self, state: Option<&str>) -> Result<Vec<Peer>> {
        let mut url = self.http_rpc_url.join("eth/v1/node/peers")?;
        if let Some(state) = state {
            url.query_pairs_mut().append_pair("state", state);
        }
        Ok(self.get::<PeersResponse>(url).await?.data)
    }

    async fn get_fork(&self, state_id: StateId) -> Result<Fork> {
        let url = self.http_rpc_url.join(&format!("eth/v1/beacon/states/{state_id}/fork"))?;
        Ok(self.get::<ForkResponse>(url).await?.data)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::{Method, MockServer};
    use serde_json::json;

    use super::*;

    fn client_for(server: &MockServer) -> Result<HttpClient> {
        HttpClient::new(server.base_url().parse()?, Duration::from_secs(5))
    }

    fn block_json(slot: u64) -> serde_json::Value {
        json!({
            "version": "deneb",
            "execution_optimistic": false,
            "finalized": true,
            "data": {
                "message": {
                    "slot": slot.to_string(),
                    "proposer_index": "7",
                    "parent_root": "0x01",
                    "state_root": "0x02",
                    "body": {
                        "randao_reveal": "0x03",
                        "graffiti": "0x04",
                        "attestations": [{
                            "aggregation_bits": "0x05",
                            "data": {
                                "slot": (slot - 1).to_string(),
                                "index": "0",
                                "beacon_block_root": "0xaa",
                                "source": {"epoch": "1", "root": "0xbb"},
                                "target": {"epoch": "2", "root": "0xcc"}
                            },
                            "signature": "0x06"
                        }]
                    }
                },
                "signature": "0x07"
            }
        })
    }

    #[tokio::test]
    async fn missing_block_is_none() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(Method::GET).path("/eth/v2/beacon/blocks/65");
                then.status(404).json_body(json!({"code": 404, "message": "Block not found"}));
            })
            .await;

        let client = client_for(&server)?;
        assert_eq!(client.get_block(BlockId::Slot(65)).await?, None);
        mock.assert_async().await;
        Ok(())
    }

    #[tokio::test]
    async fn block_attestations_are_decoded() -> Result<()> {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(Method::GET).path("/eth/v2/beacon/blocks/66");
                then.status(200).json_body(block_json(66));
            })
            .await;

        let client = client_for(&server)?;
        let block = client.get_block(BlockId::Slot(66)).await?.expect("block at slot 66");
        assert_eq!(block.slot, 66);
        assert_eq!(block.proposer_index, 7);
        assert_eq!(block.body.attestations.len(), 1);
        let attestation = &block.body.attestations[0];
        assert_eq!(attestation.data.slot, 65);
        assert_eq!(attestation.data.target.epoch, 2);
        assert!(attestation.aggregation_bits.is_set(0));
        assert!(!attestation.aggregation_bits.is_set(1));
        Ok(())
    }

    #[tokio::test]
    async fn server_errors_are_not_absence() -> Result<()> {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(Method::GET).path("/eth/v1/beacon/headers/64");
                then.status(500).body("{}");
            })
            .await;

        let client = client_for(&server)?;
        assert!(client.get_header_for_block(BlockId::Slot(64)).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn attester_duties_are_requested_with_index_body() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(Method::POST)
                    .path("/eth/v1/validator/duties/attester/2")
                    .json_body(json!(["3", "5"]));
                then.status(200).json_body(json!({
                    "dependent_root": "0x00",
                    "execution_optimistic": false,
                    "data": [{
                        "pubkey": "0xaa",
                        "validator_index": "3",
                        "committee_index": "1",
                        "committee_length": "128",
                        "committees_at_slot": "4",
                        "validator_committee_index": "77",
                        "slot": "70"
                    }]
                }));
            })
            .await;

        let client = client_for(&server)?;
        let duties = client.get_attester_duties(2, &[3, 5]).await?;
        mock.assert_async().await;
        assert_eq!(duties.len(), 1);
        assert_eq!(duties[0].validator_index, 3);
        assert_eq!(duties[0].committee_index, 1);
        assert_eq!(duties[0].validator_committee_index, 77);
        assert_eq!(duties[0].slot, 70);
        Ok(())
    }

    #[tokio::test]
    async fn validators_are_requested_by_id() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(Method::GET)
                    .path("/eth/v1/beacon/states/64/validators")
                    .query_param("id", "3,0xab");
                then.status(200).json_body(json!({
                    "execution_optimistic": false,
                    "finalized": true,
                    "data": [{
                        "index": "3",
                        "balance": "32000000000",
                        "status": "active_ongoing",
                        "validator": {
                            "pubkey": "0xab",
                            "withdrawal_credentials": "0x00",
                            "effective_balance": "32000000000",
                            "slashed": false,
                            "activation_eligibility_epoch": "0",
                            "activation_epoch": "0",
                            "exit_epoch": "18446744073709551615",
                            "withdrawable_epoch": "18446744073709551615"
                        }
                    }]
                }));
            })
            .await;

        let client = client_for(&server)?;
        let validators = client
            .validators_for_state(
                StateId::Slot(64),
                &[ValidatorId::Index(3), ValidatorId::Pubkey("0xab".to_string())],
            )
            .await?;
        mock.assert_async().await;
        assert_eq!(validators.len(), 1);
        assert_eq!(validators[0].index, 3);
        Ok(())
    }

    #[tokio::test]
    async fn genesis_and_spec() -> Result<()> {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(Method::GET).path("/eth/v1/beacon/genesis");
                then.status(200).json_body(json!({"data": {
                    "genesis_time": "1606824023",
                    "genesis_validators_root": "0x4b36",
                    "genesis_fork_version": "0x00000000"
                }}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(Method::GET).path("/eth/v1/config/spec");
                then.status(200).json_body(json!({"data": {
                    "SECONDS_PER_SLOT": "12",
                    "SLOTS_PER_EPOCH": "32",
                    "BLOB_SCHEDULE": [{"EPOCH": "1", "MAX_BLOBS_PER_BLOCK": "9"}]
                }}));
            })
            .await;

        let client = client_for(&server)?;
        assert_eq!(client.get_genesis().await?.genesis_time, 1_606_824_023);
        let spec = client.get_spec().await?;
        assert_eq!(spec.get("SECONDS_PER_SLOT"), Some(&json!("12")));
        assert!(spec.contains_key("BLOB_SCHEDULE"));
        Ok(())
    }

    #[tokio::test]
    async fn health_follows_status_code() -> Result<()> {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(Method::GET).path("/eth/v1/node/health");
                then.status(206);
            })
            .await;

        let client = client_for(&server)?;
        assert_eq!(client.get_health().await?, NodeHealth::Syncing);
        Ok(())
    }
}
