//! Indexer-trusting balance aggregation
//!
//! Discovers which tickers the account holds from its inscription payloads,
//! then asks an authenticated BRC-20 indexer for each ticker's available and
//! transferable balance instead of summing amounts locally.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use serde_json::Value;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::stages::{
    self, PipelineError, PipelineSettings, RunOutcome, LOAD_FAILED_NOTICE, NOT_CONNECTED_NOTICE,
};
use crate::domain::{ticker_of, ConnectionState, DashboardSnapshot, IndexerBalance};
use crate::ports::{ContentFetcher, IndexerPort, InscriptionSource, Notice, NoticeSink};

pub struct IndexerBalanceStrategy {
    source: Arc<dyn InscriptionSource>,
    fetcher: Arc<dyn ContentFetcher>,
    indexer: Arc<dyn IndexerPort>,
    api_token: String,
    notices: Arc<dyn NoticeSink>,
    settings: PipelineSettings,
    snapshot: Arc<RwLock<DashboardSnapshot<IndexerBalance>>>,
    shutdown: CancellationToken,
}

impl IndexerBalanceStrategy {
    pub fn new(
        source: Arc<dyn InscriptionSource>,
        fetcher: Arc<dyn ContentFetcher>,
        indexer: Arc<dyn IndexerPort>,
        api_token: impl Into<String>,
        notices: Arc<dyn NoticeSink>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            fetcher,
            indexer,
            api_token: api_token.into(),
            notices,
            settings,
            snapshot: Arc::new(RwLock::new(DashboardSnapshot::default())),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn cancel(&self) {
        self.shutdown.cancel();
    }

    pub async fn snapshot(&self) -> DashboardSnapshot<IndexerBalance> {
        self.snapshot.read().await.clone()
    }

    pub async fn run(&self, state: &ConnectionState) -> Vec<IndexerBalance> {
        match self.try_run(state).await {
            Ok(RunOutcome::Completed(balances)) => balances,
            Ok(RunOutcome::NotConnected) => {
                self.notices.notify(Notice::info(NOT_CONNECTED_NOTICE));
                Vec::new()
            }
            Err(e) => {
                tracing::error!("Failed to load inscriptions: {}", e);
                self.notices.notify(Notice::error(LOAD_FAILED_NOTICE));
                Vec::new()
            }
        }
    }

    pub async fn try_run(
        &self,
        state: &ConnectionState,
    ) -> Result<RunOutcome<Vec<IndexerBalance>>, PipelineError> {
        let Some(account) = state.ready_account() else {
            return Ok(RunOutcome::NotConnected);
        };

        self.snapshot.write().await.loading = true;

        let cancel = self.shutdown.child_token();
        let result = stages::bounded(
            self.aggregate(account),
            self.settings.run_timeout,
            &cancel,
        )
        .await;

        let mut snapshot = self.snapshot.write().await;
        match &result {
            Ok(balances) => {
                snapshot.rows = balances.clone();
                snapshot.last_updated = Some(Utc::now());
            }
            Err(_) => snapshot.reset(),
        }
        snapshot.loading = false;

        result.map(RunOutcome::Completed)
    }

    async fn aggregate(&self, account: &str) -> Result<Vec<IndexerBalance>, PipelineError> {
        let total = stages::read_total(self.source.as_ref(), &self.settings).await?;
        self.snapshot.write().await.total_inscriptions = total;
        if total == 0 {
            return Ok(Vec::new());
        }

        let listing = stages::fetch_all_pages(self.source.as_ref(), total, &self.settings).await?;
        let payloads = stages::fetch_contents(
            self.fetcher.as_ref(),
            &listing.inscriptions,
            self.settings.request_timeout,
        )
        .await;

        let tickers = collect_tickers(&payloads);
        tracing::info!(account, tickers = tickers.len(), "Querying indexer balances");

        let lookups = tickers.into_iter().map(|ticker| self.lookup(account, ticker));
        Ok(join_all(lookups).await)
    }

    /// A failed lookup is logged and reported as a zero balance.
    async fn lookup(&self, account: &str, ticker: String) -> IndexerBalance {
        let request = self
            .indexer
            .get_token_balance(account, &ticker, &self.api_token);

        match tokio::time::timeout(self.settings.request_timeout, request).await {
            Ok(Ok(info)) => IndexerBalance {
                tick: ticker,
                available_balance: info.available_balance,
                transferable_balance: info.transferable_balance,
            },
            Ok(Err(e)) => {
                tracing::warn!(ticker = %ticker, "Error fetching balance data: {}", e);
                IndexerBalance::zero(ticker)
            }
            Err(_) => {
                tracing::warn!(ticker = %ticker, "Balance lookup timed out");
                IndexerBalance::zero(ticker)
            }
        }
    }
}

/// Distinct case-folded tickers of all payloads carrying a `tick`, in
/// first-seen order.
pub fn collect_tickers(payloads: &[Option<Value>]) -> Vec<String> {
    let mut seen = HashSet::new();
    payloads
        .iter()
        .flatten()
        .filter_map(ticker_of)
        .filter(|tick| seen.insert(tick.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Inscription;
    use crate::ports::indexer::{IndexerError, MockIndexerPort, TokenBalanceInfo};
    use crate::ports::mocks::{MockContentFetcher, MockWallet, RecordingNotices};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn connected() -> ConnectionState {
        ConnectionState {
            connected: true,
            current_account: Some("bc1qholder".to_string()),
            ..Default::default()
        }
    }

    fn wallet_and_content() -> (MockWallet, MockContentFetcher) {
        let wallet = MockWallet::new().with_inscriptions(vec![
            Inscription::new("a", "https://c/a"),
            Inscription::new("b", "https://c/b"),
            Inscription::new("c", "https://c/c"),
            Inscription::new("d", "https://c/d"),
        ]);
        let fetcher = MockContentFetcher::new()
            .with_content("https://c/a", json!({ "op": "transfer", "tick": "ORDI", "amt": "1" }))
            .with_content("https://c/b", json!({ "op": "deploy", "tick": "sats" }))
            .with_content("https://c/c", json!({ "op": "mint", "tick": "ordi", "amt": "2" }))
            .with_content("https://c/d", json!({ "text": "hello" }));
        (wallet, fetcher)
    }

    #[test]
    fn test_collect_tickers_dedupes_in_order() {
        let payloads = vec![
            Some(json!({ "tick": "PEPE" })),
            None,
            Some(json!({ "tick": "ordi", "op": "deploy" })),
            Some(json!({ "tick": "pepe" })),
            Some(json!({ "op": "mint" })),
        ];
        assert_eq!(collect_tickers(&payloads), vec!["pepe", "ordi"]);
    }

    #[tokio::test]
    async fn test_queries_indexer_per_ticker() {
        let (wallet, fetcher) = wallet_and_content();
        let mut indexer = MockIndexerPort::new();
        indexer
            .expect_get_token_balance()
            .withf(|address, _, token| address == "bc1qholder" && token == "secret")
            .times(2)
            .returning(|_, ticker, _| {
                let available = if ticker == "ordi" { dec!(3) } else { dec!(7) };
                Ok(TokenBalanceInfo {
                    available_balance: available,
                    transferable_balance: dec!(1),
                })
            });

        let strategy = IndexerBalanceStrategy::new(
            Arc::new(wallet),
            Arc::new(fetcher),
            Arc::new(indexer),
            "secret",
            Arc::new(RecordingNotices::new()),
            PipelineSettings::default(),
        );

        let balances = strategy.run(&connected()).await;

        assert_eq!(
            balances,
            vec![
                IndexerBalance {
                    tick: "ordi".to_string(),
                    available_balance: dec!(3),
                    transferable_balance: dec!(1),
                },
                IndexerBalance {
                    tick: "sats".to_string(),
                    available_balance: dec!(7),
                    transferable_balance: dec!(1),
                },
            ]
        );
        assert_eq!(strategy.snapshot().await.total_inscriptions, 4);
    }

    #[tokio::test]
    async fn test_failed_lookup_yields_zero() {
        let (wallet, fetcher) = wallet_and_content();
        let mut indexer = MockIndexerPort::new();
        indexer
            .expect_get_token_balance()
            .returning(|_, ticker, _| {
                if ticker == "sats" {
                    Err(IndexerError::Unauthorized)
                } else {
                    Ok(TokenBalanceInfo {
                        available_balance: dec!(5),
                        transferable_balance: dec!(0),
                    })
                }
            });
        let notices = Arc::new(RecordingNotices::new());

        let strategy = IndexerBalanceStrategy::new(
            Arc::new(wallet),
            Arc::new(fetcher),
            Arc::new(indexer),
            "secret",
            notices.clone(),
            PipelineSettings::default(),
        );

        let balances = strategy.run(&connected()).await;

        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].available_balance, dec!(5));
        assert_eq!(balances[1], IndexerBalance::zero("sats"));
        assert!(notices.notices().is_empty());
    }

    #[tokio::test]
    async fn test_not_connected_skips_indexer() {
        let (wallet, fetcher) = wallet_and_content();
        let wallet = Arc::new(wallet);
        let mut indexer = MockIndexerPort::new();
        indexer.expect_get_token_balance().never();
        let notices = Arc::new(RecordingNotices::new());

        let strategy = IndexerBalanceStrategy::new(
            wallet.clone(),
            Arc::new(fetcher),
            Arc::new(indexer),
            "secret",
            notices.clone(),
            PipelineSettings::default(),
        );

        assert!(strategy.run(&ConnectionState::default()).await.is_empty());
        assert!(wallet.get_calls().is_empty());
        assert_eq!(notices.notices(), vec![Notice::info(NOT_CONNECTED_NOTICE)]);
    }
}
