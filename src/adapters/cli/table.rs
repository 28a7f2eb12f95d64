//! Text and JSON rendering of balances and wallet status

use std::fmt::Write;

use crate::application::BalanceTable;
use crate::domain::{ConnectionState, IndexerBalance, TickerBalance};

const EMPTY_TABLE: &str = "No BRC-20 balances found";

/// Render either kind of table as aligned text. With `details`, every ticker
/// row is followed by its contributing inscriptions and their payloads.
pub fn render_table(table: &BalanceTable, details: bool) -> String {
    match table {
        BalanceTable::Tickers(rows) => render_tickers(rows, details),
        BalanceTable::Indexer(rows) => render_indexer(rows),
    }
}

pub fn render_tickers(rows: &[TickerBalance], details: bool) -> String {
    if rows.is_empty() {
        return EMPTY_TABLE.to_string();
    }

    let width = tick_width(rows.iter().map(|row| row.tick.as_str()));
    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  {:>24}  {:>12}", "TICKER", "BALANCE", "INSCRIPTIONS");
    for row in rows {
        let _ = writeln!(
            out,
            "{:<width$}  {:>24}  {:>12}",
            row.tick,
            row.balance.normalize().to_string(),
            row.inscriptions.len()
        );
        if details {
            for inscription in &row.inscriptions {
                let payload = inscription
                    .json_data
                    .as_ref()
                    .map(|payload| payload.to_string())
                    .unwrap_or_default();
                let _ = writeln!(out, "    {}  {}", inscription.inscription_id, payload);
            }
        }
    }
    out.truncate(out.trim_end().len());
    out
}

pub fn render_indexer(rows: &[IndexerBalance]) -> String {
    if rows.is_empty() {
        return EMPTY_TABLE.to_string();
    }

    let width = tick_width(rows.iter().map(|row| row.tick.as_str()));
    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  {:>24}  {:>24}", "TICKER", "AVAILABLE", "TRANSFERABLE");
    for row in rows {
        let _ = writeln!(
            out,
            "{:<width$}  {:>24}  {:>24}",
            row.tick,
            row.available_balance.normalize().to_string(),
            row.transferable_balance.normalize().to_string()
        );
    }
    out.truncate(out.trim_end().len());
    out
}

pub fn render_json(table: &BalanceTable) -> serde_json::Result<String> {
    serde_json::to_string_pretty(table)
}

/// Account, BTC balance, network and explorer link
pub fn render_status(state: &ConnectionState) -> String {
    if !state.wallet_installed {
        return "Wallet: not reachable".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Network: {}", state.network);
    match state.ready_account() {
        Some(account) => {
            let _ = writeln!(out, "Account: {} ({})", state.account_label(), account);
            let _ = writeln!(out, "Balance: {} BTC", state.balance.total_btc());
            let _ = write!(out, "Explorer: {}", state.network.explorer_address_url(account));
        }
        None => {
            let _ = write!(out, "Account: not connected");
        }
    }
    out
}

fn tick_width<'a>(ticks: impl Iterator<Item = &'a str>) -> usize {
    ticks
        .map(|tick| tick.chars().count())
        .max()
        .unwrap_or(0)
        .max("TICKER".len())
}
