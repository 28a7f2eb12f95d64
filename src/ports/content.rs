use async_trait::async_trait;
use serde_json::Value;

/// Retrieves an inscription's JSON payload.
///
/// Implementations never fail outward: transport, status and parse failures
/// are logged and reported as `None`. One attempt per call, no caching.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Option<Value>;
}
