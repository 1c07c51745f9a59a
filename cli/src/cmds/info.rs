use anyhow::{Context, Result};
use clap::Args;
use client::{BeaconClient, NodeClient};
use common::state::StateId;
use serde_json::Value;

#[derive(Debug, Args)]
pub struct Opts {
    /// Genesis time, validators root and fork versions. Shown when no other section is picked.
    #[arg(long)]
    genesis: bool,

    /// Chain configuration constants.
    #[arg(long)]
    spec: bool,

    /// Connected peers.
    #[arg(long)]
    peers: bool,
}

pub async fn run(opts: &Opts, client: &(impl BeaconClient + NodeClient)) -> Result<()> {
    if opts.genesis || !(opts.spec || opts.peers) {
        print_genesis(client).await?;
    }
    if opts.spec {
        print_spec(client).await?;
    }
    if opts.peers {
        print_peers(client).await?;
    }
    Ok(())
}

async fn print_genesis(client: &(impl BeaconClient + NodeClient)) -> Result<()> {
    let genesis = client.get_genesis().await.context("failed to obtain genesis")?;
    let fork = client
        .get_fork(StateId::Head)
        .await
        .context("failed to obtain fork")?;
    println!("Genesis time: {}", genesis.genesis_time);
    println!("Genesis validators root: {}", genesis.genesis_validators_root);
    println!("Genesis fork version: {}", genesis.genesis_fork_version);
    println!("Current fork version: {} (since epoch {})", fork.current_version, fork.epoch);
    println!("Previous fork version: {}", fork.previous_version);
    Ok(())
}

async fn print_spec(client: &impl BeaconClient) -> Result<()> {
    let spec = client.get_spec().await.context("failed to obtain spec")?;
    for (name, value) in spec {
        match value {
            Value::String(value) => println!("{name}: {value}"),
            value => println!("{name}: {value}"),
        }
    }
    Ok(())
}

async fn print_peers(client: &impl NodeClient) -> Result<()> {
    let peers = client
        .get_peers(Some("connected"))
        .await
        .context("failed to obtain peers")?;
    let mut inbound = 0;
    let mut outbound = 0;
    for peer in &peers {
        match peer.direction.as_str() {
            "inbound" => inbound += 1,
            "outbound" => outbound += 1,
            _ => {}
        }
        println!(
            "{} {} {}",
            peer.peer_id,
            peer.direction,
            peer.last_seen_p2p_address.as_deref().unwrap_or("-")
        );
    }
    println!("{} peers ({inbound} inbound, {outbound} outbound)", peers.len());
    Ok(())
}
