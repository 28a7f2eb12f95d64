use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::inscription::Inscription;

#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("Balance overflow for ticker {tick}")]
    Overflow { tick: String },
}

/// Aggregated balance of one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerBalance {
    /// Lower-cased ticker symbol
    pub tick: String,
    /// Sum of `amt` over the contributing inscriptions
    pub balance: Decimal,
    /// Contributing inscriptions with their payload attached, in credit order
    pub inscriptions: Vec<Inscription>,
}

/// Balance reported by an indexer for one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexerBalance {
    pub tick: String,
    pub available_balance: Decimal,
    pub transferable_balance: Decimal,
}

impl IndexerBalance {
    pub fn zero(tick: impl Into<String>) -> Self {
        Self {
            tick: tick.into(),
            available_balance: Decimal::ZERO,
            transferable_balance: Decimal::ZERO,
        }
    }
}

/// Per-ticker accumulator for one aggregation run.
///
/// Tickers are emitted in the order they were first credited.
#[derive(Debug, Default)]
pub struct BalanceLedger {
    entries: Vec<TickerBalance>,
    index: HashMap<String, usize>,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `tick` (case-folded) and record the contributing inscription
    pub fn credit(
        &mut self,
        tick: &str,
        amount: Decimal,
        inscription: Inscription,
    ) -> Result<(), LedgerError> {
        let tick = tick.to_lowercase();
        let slot = match self.index.get(&tick) {
            Some(&slot) => slot,
            None => {
                self.index.insert(tick.clone(), self.entries.len());
                self.entries.push(TickerBalance {
                    tick: tick.clone(),
                    balance: Decimal::ZERO,
                    inscriptions: Vec::new(),
                });
                self.entries.len() - 1
            }
        };

        let entry = &mut self.entries[slot];
        entry.balance = entry
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow { tick })?;
        entry.inscriptions.push(inscription);
        Ok(())
    }

    pub fn get(&self, tick: &str) -> Option<&TickerBalance> {
        self.index
            .get(&tick.to_lowercase())
            .map(|&slot| &self.entries[slot])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_balances(self) -> Vec<TickerBalance> {
        self.entries
    }
}

/// State read by the presentation layer, replaced wholesale after every run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot<T> {
    pub total_inscriptions: u64,
    pub rows: Vec<T>,
    pub loading: bool,
    pub last_updated: Option<DateTime<Utc>>,
}

impl<T> Default for DashboardSnapshot<T> {
    fn default() -> Self {
        Self {
            total_inscriptions: 0,
            rows: Vec::new(),
            loading: false,
            last_updated: None,
        }
    }
}

impl<T> DashboardSnapshot<T> {
    /// Clear the results after a failed run
    pub fn reset(&mut self) {
        self.total_inscriptions = 0;
        self.rows.clear();
    }
}
