//! Domain Layer - Inscription aggregation types
//!
//! Pure types and logic with no I/O:
//! - `inscription`: listing records and id deduplication
//! - `payload`: BRC-20 payload classification
//! - `ledger`: per-ticker accumulation and the dashboard snapshot
//! - `wallet`: network, wallet balance and connection state

pub mod inscription;
pub mod payload;
pub mod ledger;
pub mod wallet;

pub use inscription::{dedupe_by_id, DedupOutcome, Inscription, InscriptionPage};
pub use payload::{classify, parse_amount, ticker_of, Classification, Operation, SkipReason};
pub use ledger::{BalanceLedger, DashboardSnapshot, IndexerBalance, LedgerError, TickerBalance};
pub use wallet::{ConnectionState, Network, UnknownNetwork, WalletBalance};
