pub mod stages;
pub mod pipeline;
pub mod indexer_strategy;
pub mod strategy;
pub mod connection;
pub mod watcher;

pub use stages::{
    PipelineError, PipelineSettings, RunOutcome, DEFAULT_PAGE_SIZE, LOAD_FAILED_NOTICE,
    MAX_LISTING_PAGES, NOT_CONNECTED_NOTICE,
};
pub use pipeline::{AggregationPipeline, RunReport};
pub use indexer_strategy::IndexerBalanceStrategy;
pub use strategy::{BalanceStrategy, BalanceTable, StrategyRunner};
pub use connection::ConnectionManager;
pub use watcher::BalanceWatcher;
