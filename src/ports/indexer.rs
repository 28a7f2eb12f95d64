use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexerError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),
    #[error("Indexer rejected the API token")]
    Unauthorized,
    #[error("Indexer API error {code}: {message}")]
    ApiError { code: i64, message: String },
    #[error("Failed to parse indexer response: {0}")]
    ParseError(String),
    #[error("Invalid indexer URL: {0}")]
    InvalidUrl(String),
    #[error("Indexer did not answer in time")]
    Timeout,
}

/// Server-side BRC-20 balance of one ticker for one address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceInfo {
    pub available_balance: Decimal,
    pub transferable_balance: Decimal,
}

/// Authenticated BRC-20 indexer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IndexerPort: Send + Sync {
    async fn get_token_balance(
        &self,
        address: &str,
        ticker: &str,
        token: &str,
    ) -> Result<TokenBalanceInfo, IndexerError>;
}
