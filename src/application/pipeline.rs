//! Content-derived balance aggregation
//!
//! Lists every inscription of the connected account, fetches each payload,
//! and sums `amt` per ticker over the `mint` and `transfer` payloads.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::stages::{
    self, PipelineError, PipelineSettings, RunOutcome, LOAD_FAILED_NOTICE, NOT_CONNECTED_NOTICE,
};
use crate::domain::{
    classify, BalanceLedger, Classification, ConnectionState, DashboardSnapshot, TickerBalance,
};
use crate::ports::{ContentFetcher, InscriptionSource, Notice, NoticeSink};

/// What a completed run saw, besides the balances themselves
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Total reported by the first page
    pub total_inscriptions: u64,
    /// Inscriptions left after collapsing repeated identifiers
    pub unique_inscriptions: usize,
    pub balances: Vec<TickerBalance>,
    /// Inscriptions whose content could not be fetched or parsed
    pub missing_content: usize,
    /// Payloads that are not a mint or transfer
    pub skipped_payloads: usize,
    /// Mints or transfers dropped because `amt` was unusable
    pub malformed_amounts: usize,
    /// Mints or transfers dropped because the ticker total would overflow
    pub overflowed_amounts: usize,
    pub duplicate_ids: usize,
    /// Duplicates whose content URL differed from the entry they replaced
    pub mismatched_duplicates: usize,
}

impl RunReport {
    fn empty(total_inscriptions: u64) -> Self {
        Self {
            total_inscriptions,
            ..Default::default()
        }
    }
}

/// Aggregation pipeline over an injected inscription source and content fetcher
pub struct AggregationPipeline {
    source: Arc<dyn InscriptionSource>,
    fetcher: Arc<dyn ContentFetcher>,
    notices: Arc<dyn NoticeSink>,
    settings: PipelineSettings,
    snapshot: Arc<RwLock<DashboardSnapshot<TickerBalance>>>,
    shutdown: CancellationToken,
}

impl AggregationPipeline {
    pub fn new(
        source: Arc<dyn InscriptionSource>,
        fetcher: Arc<dyn ContentFetcher>,
        notices: Arc<dyn NoticeSink>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            fetcher,
            notices,
            settings,
            snapshot: Arc::new(RwLock::new(DashboardSnapshot::default())),
            shutdown: CancellationToken::new(),
        }
    }

    /// Derive run cancellation from an existing shutdown token
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Cancel the current run and every later one
    pub fn cancel(&self) {
        self.shutdown.cancel();
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Latest presentation state
    pub async fn snapshot(&self) -> DashboardSnapshot<TickerBalance> {
        self.snapshot.read().await.clone()
    }

    /// Run the pipeline, reporting problems as notices.
    ///
    /// Returns the balances in first-seen ticker order, or an empty list when
    /// the wallet is not connected or the listing failed.
    pub async fn run(&self, state: &ConnectionState) -> Vec<TickerBalance> {
        match self.try_run(state).await {
            Ok(RunOutcome::Completed(report)) => report.balances,
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

    /// Run the pipeline, returning the typed failure instead of a notice.
    pub async fn try_run(
        &self,
        state: &ConnectionState,
    ) -> Result<RunOutcome<RunReport>, PipelineError> {
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
            Ok(report) => {
                snapshot.total_inscriptions = report.total_inscriptions;
                snapshot.rows = report.balances.clone();
                snapshot.last_updated = Some(Utc::now());
            }
            Err(_) => snapshot.reset(),
        }
        snapshot.loading = false;

        result.map(RunOutcome::Completed)
    }

    async fn aggregate(&self, account: &str) -> Result<RunReport, PipelineError> {
        tracing::info!(account, "Loading inscriptions");

        let total = stages::read_total(self.source.as_ref(), &self.settings).await?;
        self.snapshot.write().await.total_inscriptions = total;

        let mut report = RunReport::empty(total);
        if total == 0 {
            tracing::info!(account, "No inscriptions found");
            return Ok(report);
        }

        let listing = stages::fetch_all_pages(self.source.as_ref(), total, &self.settings).await?;
        report.unique_inscriptions = listing.inscriptions.len();
        report.duplicate_ids = listing.duplicates;
        report.mismatched_duplicates = listing.mismatches;

        let payloads = stages::fetch_contents(
            self.fetcher.as_ref(),
            &listing.inscriptions,
            self.settings.request_timeout,
        )
        .await;

        let mut ledger = BalanceLedger::new();
        for (inscription, payload) in listing.inscriptions.iter().zip(payloads) {
            let Some(payload) = payload else {
                report.missing_content += 1;
                continue;
            };

            match classify(&payload) {
                Classification::Qualifying { tick, amount, .. } => {
                    if let Err(e) = ledger.credit(&tick, amount, inscription.with_payload(payload)) {
                        tracing::warn!(
                            inscription_id = %inscription.inscription_id,
                            "Skipping inscription: {}",
                            e
                        );
                        report.overflowed_amounts += 1;
                    }
                }
                Classification::MalformedAmount { tick, raw } => {
                    tracing::warn!(
                        inscription_id = %inscription.inscription_id,
                        tick = %tick,
                        amt = %raw,
                        "Skipping inscription with unparsable amount"
                    );
                    report.malformed_amounts += 1;
                }
                Classification::Skipped(reason) => {
                    tracing::trace!(
                        inscription_id = %inscription.inscription_id,
                        ?reason,
                        "Payload does not move a balance"
                    );
                    report.skipped_payloads += 1;
                }
            }
        }

        report.balances = ledger.into_balances();
        tracing::info!(
            account,
            total,
            unique = report.unique_inscriptions,
            tickers = report.balances.len(),
            missing_content = report.missing_content,
            malformed = report.malformed_amounts,
            overflowed = report.overflowed_amounts,
            "Inscriptions aggregated"
        );

        Ok(report)
    }
}
