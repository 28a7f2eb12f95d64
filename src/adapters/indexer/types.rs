//! Indexer API wire types

use serde::Deserialize;

use crate::ports::TokenBalanceInfo;

/// Envelope wrapping every indexer response: `{code, msg, data}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
    pub data: Option<T>,
}

/// `data` of `/v1/indexer/address/{address}/brc20/{ticker}/info`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerInfoData {
    pub ticker: Option<String>,
    #[serde(flatten)]
    pub balance: TokenBalanceInfo,
}
