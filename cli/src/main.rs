mod cmds;
mod config;

use std::{future::Future, sync::Arc};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use client::HttpClient;
use config::CliConfig;
use envconfig::Envconfig;
use url::Url;

#[derive(Parser)]
#[command(name = "beacon-perf", version)]
#[command(about = "Validator performance reports from a beacon node", long_about = None)]
struct Cli {
    /// Beacon node REST endpoint, overrides BEACON_HTTP_URL.
    #[arg(long, global = true)]
    beacon_url: Option<Url>,

    /// Seconds allowed for the whole command, overrides REQUEST_TIMEOUT_SECS.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Checks that the beacon node is reachable and synced.
    Ping(cmds::ping::Opts),

    /// Prints chain and node information.
    Info(cmds::info::Opts),

    #[command(subcommand)]
    Validator(ValidatorCommands),
}

#[derive(Subcommand)]
enum ValidatorCommands {
    /// Prints a single validator's record.
    Info(cmds::validator::InfoOpts),

    /// Reports proposals and attestation performance per epoch.
    Perf(cmds::validator::PerfOpts),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.debug {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let mut config = CliConfig::init_from_env()?;
    if let Some(beacon_url) = cli.beacon_url {
        config.beacon_http_url = beacon_url;
    }
    if let Some(timeout) = cli.timeout {
        config.request_timeout_secs = timeout;
    }
    log::debug!("{config:?}");

    let client = Arc::new(HttpClient::new(
        config.beacon_http_url.clone(),
        config.request_timeout(),
    )?);
    log::debug!("Using beacon node at {}", client.url());

    match cli.command {
        Commands::Ping(opts) => with_deadline(&config, cmds::ping::run(&opts, client.as_ref())).await,
        Commands::Info(opts) => with_deadline(&config, cmds::info::run(&opts, client.as_ref())).await,
        Commands::Validator(ValidatorCommands::Info(opts)) => {
            with_deadline(&config, cmds::validator::info(&opts, client)).await
        }
        Commands::Validator(ValidatorCommands::Perf(opts)) => {
            with_deadline(&config, cmds::validator::perf(&opts, client, &config)).await
        }
    }
}

async fn with_deadline<F: Future<Output = Result<()>>>(config: &CliConfig, command: F) -> Result<()> {
    tokio::time::timeout(config.request_timeout(), command)
        .await
        .map_err(|_| anyhow!("command did not complete within {}s", config.request_timeout_secs))?
}
