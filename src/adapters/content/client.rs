use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::warn;

use crate::ports::ContentFetcher;

/// Content fetcher configuration
#[derive(Debug, Clone)]
pub struct HttpContentConfig {
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for HttpContentConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Fetches inscription payloads over plain HTTP GET
#[derive(Debug, Clone)]
pub struct HttpContentFetcher {
    http: Client,
}

impl HttpContentFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(HttpContentConfig::default())
    }

    pub fn with_config(config: HttpContentConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch(&self, url: &str) -> Option<Value> {
        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url, "Error fetching content data: {}", e);
                return None;
            }
        };

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => {
                warn!(url, status = ?e.status(), "Content request rejected");
                return None;
            }
        };

        match response.json::<Value>().await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(url, "Content is not JSON: {}", e);
                None
            }
        }
    }
}
