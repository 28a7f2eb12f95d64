//! Inscription Ledger Library
//!
//! Aggregates BRC-20 ticker balances from the inscriptions held by a Bitcoin
//! wallet.
//!
//! # Modules
//!
//! - `domain`: Core types (Inscription, payload classification, BalanceLedger)
//! - `ports`: Trait abstractions (WalletPort, ContentFetcher, IndexerPort)
//! - `adapters`: External implementations (wallet bridge, content, indexer, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Aggregation pipeline, connection manager and watcher

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
