//! BRC-20 Indexer Client
//!
//! Reads per-ticker balances from the Unisat open API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::types::{ApiEnvelope, TickerInfoData};
use crate::ports::{IndexerError, IndexerPort, TokenBalanceInfo};

/// Indexer client configuration
#[derive(Debug, Clone)]
pub struct IndexerClientConfig {
    /// API base URL
    pub api_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for IndexerClientConfig {
    fn default() -> Self {
        Self {
            api_url: "https://open-api.unisat.io".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UnisatIndexerClient {
    config: IndexerClientConfig,
    http: Client,
}

impl UnisatIndexerClient {
    pub fn new() -> Result<Self, IndexerError> {
        Self::with_config(IndexerClientConfig::default())
    }

    pub fn with_config(config: IndexerClientConfig) -> Result<Self, IndexerError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| IndexerError::HttpError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// `{api_url}/v1/indexer/address/{address}/brc20/{ticker}/info`
    fn ticker_info_url(&self, address: &str, ticker: &str) -> Result<Url, IndexerError> {
        let mut url = Url::parse(&self.config.api_url)
            .map_err(|e| IndexerError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| IndexerError::InvalidUrl(self.config.api_url.clone()))?
            .pop_if_empty()
            .extend(["v1", "indexer", "address", address, "brc20", ticker, "info"]);
        Ok(url)
    }

    /// Unwrap the `{code, msg, data}` envelope
    fn into_balance(envelope: ApiEnvelope<TickerInfoData>) -> Result<TokenBalanceInfo, IndexerError> {
        if envelope.code != 0 {
            return Err(IndexerError::ApiError {
                code: envelope.code,
                message: envelope.msg,
            });
        }

        envelope
            .data
            .map(|data| data.balance)
            .ok_or_else(|| IndexerError::ParseError("response has no data".to_string()))
    }
}

#[async_trait]
impl IndexerPort for UnisatIndexerClient {
    async fn get_token_balance(
        &self,
        address: &str,
        ticker: &str,
        token: &str,
    ) -> Result<TokenBalanceInfo, IndexerError> {
        let url = self.ticker_info_url(address, ticker)?;
        tracing::debug!(%url, "Fetching indexer balance");

        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    IndexerError::Timeout
                } else {
                    IndexerError::HttpError(e.to_string())
                }
            })?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(IndexerError::Unauthorized);
            }
            status if !status.is_success() => {
                let text = response.text().await.unwrap_or_default();
                return Err(IndexerError::HttpError(format!("Indexer error {}: {}", status, text)));
            }
            _ => {}
        }

        let envelope: ApiEnvelope<TickerInfoData> = response
            .json()
            .await
            .map_err(|e| IndexerError::ParseError(e.to_string()))?;

        Self::into_balance(envelope)
    }
}
