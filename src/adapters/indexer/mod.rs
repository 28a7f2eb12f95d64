//! BRC-20 Indexer Adapter
//!
//! Implements `IndexerPort` against the Unisat open API.

mod client;
mod types;

pub use client::{IndexerClientConfig, UnisatIndexerClient};
