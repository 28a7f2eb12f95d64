//! Pipeline stages shared by both balance strategies
//!
//! Every stage is a barrier: requests are fanned out concurrently on the
//! current task and joined before the next stage starts. Results are consumed
//! in request order, never completion order.

use std::future::Future;
use std::time::Duration;

use futures::future::{join_all, try_join_all};
use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::{dedupe_by_id, DedupOutcome, Inscription, InscriptionPage};
use crate::ports::{ContentFetcher, InscriptionSource, WalletError};

pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Most pages a single listing may span
pub const MAX_LISTING_PAGES: u64 = 10_000;

pub const NOT_CONNECTED_NOTICE: &str = "Please connect to load inscriptions.";
pub const LOAD_FAILED_NOTICE: &str = "Failed to load inscriptions";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to list inscriptions: {0}")]
    Listing(#[from] WalletError),
    #[error("Wallet reported {total} inscriptions, more than {max_pages} pages of {page_size}")]
    ImplausibleTotal {
        total: u64,
        page_size: u64,
        max_pages: u64,
    },
    #[error("Run did not finish within {0:?}")]
    RunTimeout(Duration),
    #[error("Run cancelled")]
    Cancelled,
}

/// Tuning shared by both strategies
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Inscriptions requested per page, fixed for a whole run
    pub page_size: u64,
    /// Bound on every wallet, content and indexer call
    pub request_timeout: Duration,
    /// Bound on a whole run
    pub run_timeout: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: Duration::from_secs(30),
            run_timeout: Duration::from_secs(300),
        }
    }
}

/// Result of a gated run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome<T> {
    /// The wallet is not connected; nothing was requested
    NotConnected,
    Completed(T),
}

/// Read the listing total from the first page.
pub async fn read_total(
    source: &dyn InscriptionSource,
    settings: &PipelineSettings,
) -> Result<u64, WalletError> {
    let first = fetch_page(source, 0, settings).await?;
    Ok(first.total)
}

/// Request every page of a listing of `total` inscriptions concurrently,
/// flatten them in offset order and collapse repeated identifiers.
///
/// Any failed page fails the whole listing. A `total` spanning more than
/// [`MAX_LISTING_PAGES`] pages is rejected before anything is requested.
pub async fn fetch_all_pages(
    source: &dyn InscriptionSource,
    total: u64,
    settings: &PipelineSettings,
) -> Result<DedupOutcome, PipelineError> {
    let pages = total.div_ceil(settings.page_size);
    if pages > MAX_LISTING_PAGES {
        return Err(PipelineError::ImplausibleTotal {
            total,
            page_size: settings.page_size,
            max_pages: MAX_LISTING_PAGES,
        });
    }
    tracing::debug!(total, pages, page_size = settings.page_size, "Requesting inscription pages");

    let requests = (0..pages).map(|page| fetch_page(source, page * settings.page_size, settings));
    let responses = try_join_all(requests).await?;

    Ok(dedupe_by_id(responses.into_iter().flat_map(|page| page.list)))
}

async fn fetch_page(
    source: &dyn InscriptionSource,
    offset: u64,
    settings: &PipelineSettings,
) -> Result<InscriptionPage, WalletError> {
    tokio::time::timeout(
        settings.request_timeout,
        source.get_inscriptions(offset, settings.page_size),
    )
    .await
    .map_err(|_| WalletError::Timeout(settings.request_timeout))?
}

/// Fetch every inscription's payload concurrently.
///
/// The result is index-aligned with `inscriptions`; a failed or timed out
/// fetch yields `None`.
pub async fn fetch_contents(
    fetcher: &dyn ContentFetcher,
    inscriptions: &[Inscription],
    request_timeout: Duration,
) -> Vec<Option<Value>> {
    let fetches = inscriptions.iter().map(|inscription| async move {
        match tokio::time::timeout(request_timeout, fetcher.fetch(&inscription.content)).await {
            Ok(payload) => payload,
            Err(_) => {
                tracing::warn!(
                    inscription_id = %inscription.inscription_id,
                    url = %inscription.content,
                    "Content fetch timed out after {:?}",
                    request_timeout
                );
                None
            }
        }
    });
    join_all(fetches).await
}

/// Bound a run by the configured timeout and a cancellation token.
pub async fn bounded<F, T>(
    run: F,
    run_timeout: Duration,
    cancel: &CancellationToken,
) -> Result<T, PipelineError>
where
    F: Future<Output = Result<T, PipelineError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PipelineError::Cancelled),
        outcome = tokio::time::timeout(run_timeout, run) => match outcome {
            Ok(result) => result,
            Err(_) => Err(PipelineError::RunTimeout(run_timeout)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mocks::{MockContentFetcher, MockWallet};
    use serde_json::json;

    fn inscriptions(n: usize) -> Vec<Inscription> {
        (0..n)
            .map(|i| Inscription::new(format!("id{}", i), format!("https://c/{}", i)))
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_all_pages_requests_every_offset() {
        let wallet = MockWallet::new().with_inscriptions(inscriptions(250));
        let settings = PipelineSettings::default();

        let outcome = fetch_all_pages(&wallet, 250, &settings).await.unwrap();

        assert_eq!(outcome.inscriptions.len(), 250);
        let mut offsets = wallet.page_offsets();
        offsets.sort_unstable();
        assert_eq!(offsets, vec![0, 100, 200]);
    }

    #[tokio::test]
    async fn test_fetch_all_pages_exact_multiple() {
        let wallet = MockWallet::new().with_inscriptions(inscriptions(200));
        let settings = PipelineSettings::default();

        fetch_all_pages(&wallet, 200, &settings).await.unwrap();
        assert_eq!(wallet.page_offsets().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_page_fails_listing() {
        let wallet = MockWallet::new()
            .with_inscriptions(inscriptions(250))
            .failing_at_offset(100);
        let settings = PipelineSettings::default();

        let result = fetch_all_pages(&wallet, 250, &settings).await;
        assert!(matches!(
            result,
            Err(PipelineError::Listing(WalletError::RequestFailed(_)))
        ));
    }

    #[tokio::test]
    async fn test_oversized_total_is_rejected_without_requests() {
        let wallet = MockWallet::new().with_total(u64::MAX);
        let settings = PipelineSettings::default();

        let result = fetch_all_pages(&wallet, u64::MAX, &settings).await;

        assert!(matches!(
            result,
            Err(PipelineError::ImplausibleTotal { total: u64::MAX, page_size: 100, .. })
        ));
        assert!(wallet.page_offsets().is_empty());
    }

    #[tokio::test]
    async fn test_largest_allowed_listing_is_accepted() {
        let settings = PipelineSettings {
            page_size: 1,
            ..Default::default()
        };
        let wallet = MockWallet::new().with_total(MAX_LISTING_PAGES);

        let outcome = fetch_all_pages(&wallet, MAX_LISTING_PAGES, &settings).await.unwrap();

        assert!(outcome.inscriptions.is_empty());
        assert_eq!(wallet.page_offsets().len() as u64, MAX_LISTING_PAGES);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_page_times_out() {
        let wallet = MockWallet::new()
            .with_inscriptions(inscriptions(10))
            .hanging_at_offset(0);
        let settings = PipelineSettings {
            request_timeout: Duration::from_secs(5),
            ..Default::default()
        };

        let result = read_total(&wallet, &settings).await;
        assert!(matches!(result, Err(WalletError::Timeout(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_contents_keeps_input_order() {
        let list = inscriptions(3);
        let fetcher = MockContentFetcher::new()
            .with_content("https://c/0", json!({ "n": 0 }))
            .with_content("https://c/1", json!({ "n": 1 }))
            .with_content("https://c/2", json!({ "n": 2 }))
            .with_delay("https://c/0", Duration::from_millis(50));

        let payloads = fetch_contents(&fetcher, &list, Duration::from_secs(1)).await;
        assert_eq!(
            payloads,
            vec![Some(json!({ "n": 0 })), Some(json!({ "n": 1 })), Some(json!({ "n": 2 }))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_contents_timeout_yields_none() {
        let list = inscriptions(1);
        let fetcher = MockContentFetcher::new()
            .with_content("https://c/0", json!({ "n": 0 }))
            .with_delay("https://c/0", Duration::from_secs(60));

        let payloads = fetch_contents(&fetcher, &list, Duration::from_secs(1)).await;
        assert_eq!(payloads, vec![None]);
    }

    #[tokio::test]
    async fn test_bounded_respects_cancellation() {
        let token = CancellationToken::new();
        token.cancel();

        let result: Result<(), PipelineError> = bounded(
            std::future::pending(),
            Duration::from_secs(60),
            &token,
        )
        .await;
        assert!(matches!(result, Err(PipelineError::Cancelled)));
    }
}
