//! CLI Adapter
//!
//! Command-line interface for Inscription Ledger.
//! Uses clap derive macros for argument parsing.

mod commands;
mod notices;
pub mod table;

pub use commands::{
    BalancesCmd, CliApp, Command, OutputFormat, StatusCmd, SwitchNetworkCmd, WatchCmd,
};
pub use notices::ConsoleNotices;
