//! Ports Layer - Trait definitions for external dependencies
//!
//! The aggregation core only talks to the outside world through these traits:
//! - Wallet (inscription listing, accounts, network)
//! - Content fetching (inscription JSON payloads)
//! - BRC-20 indexer (server-side balances)
//! - Notices (user-facing messages)

pub mod wallet;
pub mod content;
pub mod indexer;
pub mod notice;
pub mod mocks;

pub use wallet::{InscriptionSource, WalletError, WalletPort};
pub use content::ContentFetcher;
pub use indexer::{IndexerError, IndexerPort, TokenBalanceInfo};
pub use notice::{Notice, NoticeSink, TracingNotices};
