use anyhow::{Context, Result};
use clap::Args;
use client::{model::node::NodeHealth, NodeClient};

#[derive(Debug, Args)]
pub struct Opts {}

pub async fn run(_opts: &Opts, client: &dyn NodeClient) -> Result<()> {
    let version = client
        .get_node_version()
        .await
        .context("beacon node is not reachable")?;
    let sync = client.get_syncing().await.context("failed to obtain sync status")?;
    let health = client.get_health().await.context("failed to obtain node health")?;

    println!("Node: {version}");
    println!("Health: {health}");
    println!("Head slot: {}", sync.head_slot);
    if sync.is_syncing {
        println!("Syncing, {} slots behind", sync.sync_distance);
    } else {
        println!("Synced");
    }
    if sync.is_optimistic == Some(true) {
        println!("Head is optimistic");
    }
    if sync.el_offline == Some(true) {
        println!("Execution client is offline");
    }
    if health != NodeHealth::Ready {
        log::warn!("Node is not ready: {health}");
    }
    Ok(())
}
