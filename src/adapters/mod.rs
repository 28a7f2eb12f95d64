//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - Wallet bridge: HTTP access to the browser wallet
//! - Content: inscription payload downloads
//! - Indexer: authenticated BRC-20 balance lookups
//! - CLI: Command-line interface and rendering

pub mod wallet_bridge;
pub mod content;
pub mod indexer;
pub mod cli;

pub use wallet_bridge::WalletBridgeClient;
pub use content::HttpContentFetcher;
pub use indexer::UnisatIndexerClient;
pub use cli::CliApp;
