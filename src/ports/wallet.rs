use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{InscriptionPage, Network, WalletBalance};

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Wallet request failed: {0}")]
    RequestFailed(String),
    #[error("Wallet rejected the request: {0}")]
    Rejected(String),
    #[error("Failed to parse wallet response: {0}")]
    ParseError(String),
    #[error("Wallet did not answer within {0:?}")]
    Timeout(Duration),
}

/// Paginated listing of the inscriptions held by the connected account
#[async_trait]
pub trait InscriptionSource: Send + Sync {
    async fn get_inscriptions(&self, offset: u64, limit: u64)
        -> Result<InscriptionPage, WalletError>;
}

/// Wallet capability, injected wherever account or network state is needed
#[async_trait]
pub trait WalletPort: InscriptionSource {
    async fn get_network(&self) -> Result<Network, WalletError>;

    /// Accounts the wallet already exposes to us (no prompt)
    async fn get_accounts(&self) -> Result<Vec<String>, WalletError>;

    async fn get_balance(&self, address: &str) -> Result<WalletBalance, WalletError>;

    /// Ask the user to expose their accounts
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError>;

    async fn switch_network(&self, network: Network) -> Result<(), WalletError>;
}
