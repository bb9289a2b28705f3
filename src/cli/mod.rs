//! Command-line interface for TFChain and RMB.
//!
//! # Commands
//!
//! - `rmb` - calls to a node's RPC endpoint through the relay
//! - `substrate` - contracts, twins and signing on TFChain
//!
//! Results go to stdout without a trailing newline; logs go to stderr.

use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};

use crate::config::{Config, Network, DEFAULT_NETWORK};
use crate::error::{Error, Result};
use crate::logging::{self, LogFormat, LoggingConfig};

pub mod commands;
pub mod session;
pub mod utils;

/// TFGrid client
#[derive(Parser, Debug)]
#[command(name = "tfvclient")]
#[command(author = "ThreeFold Tech")]
#[command(version)]
#[command(about = "TFChain contracts and RMB node calls", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Network presets for the substrate and relay endpoints (dev, qa, test, main)
    #[arg(long, global = true, env = "TFGRID_NETWORK", default_value = DEFAULT_NETWORK)]
    pub network: Network,

    /// Substrate websocket endpoint (overrides --network)
    #[arg(long, global = true, env = "TFGRID_SUBSTRATE_URL")]
    pub substrate: Option<String>,

    /// Mnemonic phrase or secret URI of the signing identity
    #[arg(
        long,
        global = true,
        env = "TFGRID_MNEMONICS",
        hide_env_values = true,
        default_value = ""
    )]
    pub mnemonics: String,

    /// Relay websocket endpoint (overrides --network)
    #[arg(long, global = true, env = "TFGRID_RELAY_URL")]
    pub relay: Option<String>,

    /// Deadline for each remote call, in seconds
    #[arg(long, global = true, default_value_t = 120, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Log format (text, json, compact)
    #[arg(long, alias = "log_format", global = true, env = "TFGRID_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, alias = "log_dir", global = true, env = "TFGRID_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Calls to node RPC endpoints through the relay
    Rmb(commands::rmb::RmbCommand),

    /// TFChain operations
    #[command(alias = "sub")]
    Substrate(commands::substrate::SubstrateCommand),
}

impl Cli {
    /// Endpoints and deadline for this invocation
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::for_network(self.network);
        if let Some(url) = &self.substrate {
            config = config.with_substrate_url(url.clone());
        }
        if let Some(url) = &self.relay {
            config = config.with_relay_url(url.clone());
        }
        config
            .with_timeout(Duration::from_secs(self.timeout))
            .map_err(Error::payload)
    }

    pub fn logging_config(&self) -> LoggingConfig {
        let mut config = LoggingConfig::new()
            .with_verbosity(self.verbose)
            .with_format(self.log_format);
        if let Some(dir) = &self.log_dir {
            config = config.with_logging_dir(dir.clone()).with_file_logging(true);
        }
        config
    }
}

/// Run the CLI application
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.logging_config());

    match &cli.command {
        Commands::Rmb(cmd) => commands::rmb::execute(cmd.clone(), &cli).await,
        Commands::Substrate(cmd) => commands::substrate::execute(cmd.clone(), &cli).await,
    }
}
