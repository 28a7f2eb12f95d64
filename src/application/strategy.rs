use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::indexer_strategy::IndexerBalanceStrategy;
use super::pipeline::AggregationPipeline;
use crate::domain::{ConnectionState, IndexerBalance, TickerBalance};

/// How ticker balances are obtained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceStrategy {
    /// Sum `amt` over the account's own mint and transfer payloads
    #[default]
    Content,
    /// Trust the balances reported by the BRC-20 indexer
    Indexer,
}

impl fmt::Display for BalanceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceStrategy::Content => write!(f, "content"),
            BalanceStrategy::Indexer => write!(f, "indexer"),
        }
    }
}

impl FromStr for BalanceStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "content" => Ok(BalanceStrategy::Content),
            "indexer" => Ok(BalanceStrategy::Indexer),
            other => Err(format!("unknown strategy '{}', expected 'content' or 'indexer'", other)),
        }
    }
}

/// Rows produced by one run of either strategy
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BalanceTable {
    Tickers(Vec<TickerBalance>),
    Indexer(Vec<IndexerBalance>),
}

impl BalanceTable {
    pub fn len(&self) -> usize {
        match self {
            BalanceTable::Tickers(rows) => rows.len(),
            BalanceTable::Indexer(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The configured strategy, ready to run
pub enum StrategyRunner {
    Content(AggregationPipeline),
    Indexer(IndexerBalanceStrategy),
}

impl StrategyRunner {
    pub fn strategy(&self) -> BalanceStrategy {
        match self {
            StrategyRunner::Content(_) => BalanceStrategy::Content,
            StrategyRunner::Indexer(_) => BalanceStrategy::Indexer,
        }
    }

    pub async fn run(&self, state: &ConnectionState) -> BalanceTable {
        match self {
            StrategyRunner::Content(pipeline) => BalanceTable::Tickers(pipeline.run(state).await),
            StrategyRunner::Indexer(strategy) => BalanceTable::Indexer(strategy.run(state).await),
        }
    }

    pub fn cancel(&self) {
        match self {
            StrategyRunner::Content(pipeline) => pipeline.cancel(),
            StrategyRunner::Indexer(strategy) => strategy.cancel(),
        }
    }
}
