//! Wallet Bridge Client
//!
//! HTTP client for a local bridge that exposes the browser wallet extension's
//! methods as JSON endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::{BridgeErrorBody, NetworkBody};
use crate::domain::{InscriptionPage, Network, WalletBalance};
use crate::ports::{InscriptionSource, WalletError, WalletPort};

/// Wallet bridge client configuration
#[derive(Debug, Clone)]
pub struct WalletBridgeConfig {
    /// Base URL of the bridge
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for WalletBridgeConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3300".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WalletBridgeClient {
    config: WalletBridgeConfig,
    http: Client,
}

impl WalletBridgeClient {
    pub fn new() -> Result<Self, WalletError> {
        Self::with_config(WalletBridgeConfig::default())
    }

    pub fn with_config(config: WalletBridgeConfig) -> Result<Self, WalletError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| WalletError::RequestFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, WalletError> {
        Self::with_config(WalletBridgeConfig {
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    /// Get the configured bridge URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Bridge URL with `segments` appended as escaped path segments
    fn endpoint(&self, segments: &[&str]) -> Result<Url, WalletError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| WalletError::RequestFailed(format!("Invalid bridge URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| WalletError::RequestFailed("Bridge URL cannot be a base".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn request<T, B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T, WalletError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        tracing::debug!(%method, %url, "Wallet bridge request");

        let mut req = self.http.request(method, url);
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req
            .send()
            .await
            .map_err(|e| WalletError::RequestFailed(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Handle bridge response and deserialize
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, WalletError> {
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<BridgeErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or(text);

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => WalletError::Rejected(message),
                _ => WalletError::RequestFailed(format!("Bridge error {}: {}", status, message)),
            });
        }

        response
            .json()
            .await
            .map_err(|e| WalletError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl InscriptionSource for WalletBridgeClient {
    async fn get_inscriptions(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<InscriptionPage, WalletError> {
        let mut url = self.endpoint(&["inscriptions"])?;
        url.query_pairs_mut()
            .append_pair("offset", &offset.to_string())
            .append_pair("limit", &limit.to_string());

        self.request::<_, ()>(Method::GET, url, None).await
    }
}

#[async_trait]
impl WalletPort for WalletBridgeClient {
    async fn get_network(&self) -> Result<Network, WalletError> {
        let url = self.endpoint(&["network"])?;
        let body: NetworkBody = self.request::<_, ()>(Method::GET, url, None).await?;
        Ok(body.network)
    }

    async fn get_accounts(&self) -> Result<Vec<String>, WalletError> {
        let url = self.endpoint(&["accounts"])?;
        self.request::<_, ()>(Method::GET, url, None).await
    }

    async fn get_balance(&self, address: &str) -> Result<WalletBalance, WalletError> {
        let url = self.endpoint(&["balance", address])?;
        self.request::<_, ()>(Method::GET, url, None).await
    }

    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        let url = self.endpoint(&["accounts", "request"])?;
        self.request::<_, ()>(Method::POST, url, None).await
    }

    async fn switch_network(&self, network: Network) -> Result<(), WalletError> {
        let url = self.endpoint(&["network"])?;
        let _: NetworkBody = self
            .request(Method::PUT, url, Some(&NetworkBody { network }))
            .await?;
        Ok(())
    }
}
