//! CLI Commands
//!
//! Argument definitions for the `inscription-ledger` binary.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::application::BalanceStrategy;

/// Inscription Ledger - BRC-20 balances from a wallet's inscriptions
#[derive(Parser, Debug)]
#[command(
    name = "inscription-ledger",
    version = env!("CARGO_PKG_VERSION"),
    about = "BRC-20 ticker balances aggregated from a Bitcoin wallet's inscriptions",
    long_about = "Inscription Ledger pages through every inscription a connected wallet \
                  holds, reads each BRC-20 payload and sums mint and transfer amounts per \
                  ticker. Balances can also be taken from an authenticated indexer."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load balances once and print them
    Balances(BalancesCmd),

    /// Reload balances whenever the wallet connection or network changes
    Watch(WatchCmd),

    /// Show the connected account, BTC balance and network
    Status(StatusCmd),

    /// Toggle the wallet between livenet and testnet
    SwitchNetwork(SwitchNetworkCmd),
}

impl Command {
    /// Configuration file of the selected command
    pub fn config_path(&self) -> &PathBuf {
        match self {
            Command::Balances(cmd) => &cmd.config,
            Command::Watch(cmd) => &cmd.config,
            Command::Status(cmd) => &cmd.config,
            Command::SwitchNetwork(cmd) => &cmd.config,
        }
    }
}

/// Output format for balance tables
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Load balances once
#[derive(Parser, Debug)]
pub struct BalancesCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/ledger.toml")]
    pub config: PathBuf,

    /// Override the configured strategy (content, indexer)
    #[arg(short, long, value_name = "STRATEGY")]
    pub strategy: Option<BalanceStrategy>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// List each ticker's inscriptions and payloads (text format)
    #[arg(short, long)]
    pub details: bool,

    /// Ask the wallet for account access if none is exposed yet
    #[arg(long)]
    pub connect: bool,
}

/// Watch for connection changes
#[derive(Parser, Debug)]
pub struct WatchCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/ledger.toml")]
    pub config: PathBuf,

    /// Override the configured strategy (content, indexer)
    #[arg(short, long, value_name = "STRATEGY")]
    pub strategy: Option<BalanceStrategy>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// List each ticker's inscriptions and payloads (text format)
    #[arg(short, long)]
    pub details: bool,

    /// Ask the wallet for account access if none is exposed yet
    #[arg(long)]
    pub connect: bool,
}

/// Show wallet status
#[derive(Parser, Debug)]
pub struct StatusCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/ledger.toml")]
    pub config: PathBuf,

    /// Ask the wallet for account access if none is exposed yet
    #[arg(long)]
    pub connect: bool,
}

/// Toggle network
#[derive(Parser, Debug)]
pub struct SwitchNetworkCmd {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "config/ledger.toml")]
    pub config: PathBuf,
}
