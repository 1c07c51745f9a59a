use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use client::BeaconClient;
use common::{state::StateId, Gwei};
use service::{epoch::EpochRange, Service, ServiceImpl};

use crate::config::CliConfig;

const GWEI_PER_ETHER: Gwei = 1_000_000_000;

#[derive(Debug, Args)]
pub struct InfoOpts {
    /// Validator index or 0x-prefixed public key.
    validator: String,

    #[arg(long, default_value = "head")]
    state_id: String,
}

#[derive(Debug, Args)]
pub struct PerfOpts {
    /// Validator indices or inclusive ranges such as 100-131.
    #[arg(long = "validators", required = true, num_args = 1..)]
    validators: Vec<String>,

    #[arg(long, default_value = "head")]
    state_id: String,

    /// Epoch number, "current", "last" or a negative offset from the current epoch.
    #[arg(long, allow_hyphen_values = true, conflicts_with_all = ["start", "end", "epochs"])]
    epoch: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    start: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    end: Option<String>,

    /// Number of epochs, combined with --start or --end.
    #[arg(long)]
    epochs: Option<u64>,

    /// Print the summaries as JSON.
    #[arg(long)]
    json: bool,
}

impl PerfOpts {
    fn is_range(&self) -> bool {
        self.start.is_some() || self.end.is_some() || self.epochs.is_some()
    }
}

pub async fn info(opts: &InfoOpts, client: Arc<dyn BeaconClient>) -> Result<()> {
    let state_id = opts.state_id.parse::<StateId>()?;
    let service = ServiceImpl::new(client).await?;
    let data = service.validator(&opts.validator, state_id).await?;

    println!("Index: {}", data.index);
    println!("Public key: {}", data.validator.pubkey);
    println!("Status: {}", data.status);
    println!("Slashed: {}", data.validator.slashed);
    println!("Activation eligibility epoch: {}", data.validator.activation_eligibility_epoch);
    println!("Activation epoch: {}", data.validator.activation_epoch);
    println!("Exit epoch: {}", format_epoch(data.validator.exit_epoch));
    println!("Withdrawable epoch: {}", format_epoch(data.validator.withdrawable_epoch));
    println!("Balance: {}", format_gwei(data.balance));
    println!("Effective balance: {}", format_gwei(data.validator.effective_balance));
    println!("Withdrawal credentials: {}", data.validator.withdrawal_credentials);
    Ok(())
}

pub async fn perf(opts: &PerfOpts, client: Arc<dyn BeaconClient>, config: &CliConfig) -> Result<()> {
    let state_id = opts.state_id.parse::<StateId>()?;
    let service = ServiceImpl::new(client)
        .await?
        .with_block_fetch_concurrency(config.block_fetch_concurrency);

    let summaries = if opts.is_range() {
        let range = EpochRange::resolve(
            opts.start.as_deref(),
            opts.end.as_deref(),
            opts.epochs,
            service.chain_time().current_epoch(),
        )?;
        service.summarize_range(&opts.validators, state_id, range).await?
    } else {
        let epoch = opts.epoch.as_deref().unwrap_or("last");
        vec![service.summarize(&opts.validators, state_id, epoch).await?]
    };

    if opts.json {
        match summaries.as_slice() {
            [summary] => println!("{}", serde_json::to_string_pretty(summary)?),
            summaries => println!("{}", serde_json::to_string_pretty(summaries)?),
        }
    } else {
        for summary in &summaries {
            print!("{summary}");
        }
    }
    Ok(())
}

fn format_gwei(gwei: Gwei) -> String {
    format!("{}.{:09}", gwei / GWEI_PER_ETHER, gwei % GWEI_PER_ETHER)
}

fn format_epoch(epoch: u64) -> String {
    if epoch == u64::MAX {
        "never".to_string()
    } else {
        epoch.to_string()
    }
}
