//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config/ledger.toml.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::application::{BalanceStrategy, PipelineSettings, DEFAULT_PAGE_SIZE};

/// Largest page the wallet is asked for
const MAX_PAGE_SIZE: u64 = 1_000;

/// Main configuration structure matching config/ledger.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub wallet: WalletSection,
    #[serde(default)]
    pub indexer: IndexerSection,
    #[serde(default)]
    pub pipeline: PipelineSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Wallet bridge configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct WalletSection {
    /// Base URL of the HTTP bridge exposing the wallet extension
    pub bridge_url: String,
}

impl WalletSection {
    /// Get bridge URL with environment variable override
    /// Checks WALLET_BRIDGE_URL env var first, falls back to config value
    pub fn get_bridge_url(&self) -> String {
        std::env::var("WALLET_BRIDGE_URL").unwrap_or_else(|_| self.bridge_url.clone())
    }
}

/// BRC-20 indexer configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct IndexerSection {
    /// Indexer REST base URL
    #[serde(default = "default_indexer_url")]
    pub api_url: String,
    /// Bearer token (better kept in .env as INDEXER_API_TOKEN)
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Default for IndexerSection {
    fn default() -> Self {
        Self {
            api_url: default_indexer_url(),
            api_token: None,
        }
    }
}

impl IndexerSection {
    /// Get API token with environment variable fallback
    /// Checks INDEXER_API_TOKEN env var if config value is empty/None
    pub fn get_api_token(&self) -> Option<String> {
        if let Some(ref token) = self.api_token {
            if !token.is_empty() {
                return Some(token.clone());
            }
        }
        std::env::var("INDEXER_API_TOKEN").ok().filter(|t| !t.is_empty())
    }
}

/// Aggregation pipeline configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSection {
    /// "content" sums inscription payloads, "indexer" trusts the indexer
    #[serde(default)]
    pub strategy: BalanceStrategy,
    /// Inscriptions requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Timeout for every wallet, content and indexer request
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Timeout for a whole aggregation run
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,
    /// How often `watch` polls the wallet for changes
    #[serde(default = "default_watch_poll_secs")]
    pub watch_poll_secs: u64,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            strategy: BalanceStrategy::default(),
            page_size: default_page_size(),
            request_timeout_secs: default_request_timeout_secs(),
            run_timeout_secs: default_run_timeout_secs(),
            watch_poll_secs: default_watch_poll_secs(),
        }
    }
}

impl PipelineSection {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn watch_poll_interval(&self) -> Duration {
        Duration::from_secs(self.watch_poll_secs)
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_indexer_url() -> String {
    "https://open-api.unisat.io".to_string()
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_run_timeout_secs() -> u64 {
    300
}

fn default_watch_poll_secs() -> u64 {
    15
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wallet.get_bridge_url().is_empty() {
            return Err(ConfigError::ValidationError(
                "bridge_url cannot be empty".to_string(),
            ));
        }

        if self.pipeline.page_size == 0 || self.pipeline.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::ValidationError(format!(
                "page_size must be 1-{}, got {}",
                MAX_PAGE_SIZE, self.pipeline.page_size
            )));
        }

        if self.pipeline.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".to_string(),
            ));
        }

        if self.pipeline.run_timeout_secs < self.pipeline.request_timeout_secs {
            return Err(ConfigError::ValidationError(format!(
                "run_timeout_secs ({}) must be >= request_timeout_secs ({})",
                self.pipeline.run_timeout_secs, self.pipeline.request_timeout_secs
            )));
        }

        if self.pipeline.watch_poll_secs == 0 {
            return Err(ConfigError::ValidationError(
                "watch_poll_secs must be > 0".to_string(),
            ));
        }

        if self.indexer.api_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "indexer api_url cannot be empty".to_string(),
            ));
        }

        if self.pipeline.strategy == BalanceStrategy::Indexer && self.indexer.get_api_token().is_none() {
            return Err(ConfigError::ValidationError(
                "the indexer strategy needs indexer.api_token or INDEXER_API_TOKEN".to_string(),
            ));
        }

        Ok(())
    }
}

// Conversion from Config to PipelineSettings
impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        PipelineSettings {
            page_size: config.pipeline.page_size,
            request_timeout: config.pipeline.request_timeout(),
            run_timeout: Duration::from_secs(config.pipeline.run_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_config() -> String {
        r#"
[wallet]
bridge_url = "http://127.0.0.1:3300"

[indexer]
api_url = "https://open-api.unisat.io"
api_token = "token-from-file"

[pipeline]
strategy = "content"
page_size = 100
request_timeout_secs = 20
run_timeout_secs = 120
watch_poll_secs = 10

[logging]
level = "info"
"#
        .to_string()
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let file = write_config(&create_valid_config());

        let config = load_config(file.path()).unwrap();

        assert_eq!(config.wallet.bridge_url, "http://127.0.0.1:3300");
        assert_eq!(config.pipeline.strategy, BalanceStrategy::Content);
        assert_eq!(config.pipeline.page_size, 100);
        assert_eq!(config.indexer.get_api_token().as_deref(), Some("token-from-file"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let file = write_config(
            r#"
[wallet]
bridge_url = "http://127.0.0.1:3300"
"#,
        );

        let config = load_config(file.path()).unwrap();

        assert_eq!(config.pipeline.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.pipeline.request_timeout_secs, 30);
        assert_eq!(config.pipeline.run_timeout_secs, 300);
        assert_eq!(config.indexer.api_url, "https://open-api.unisat.io");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/ledger.toml");

        let config = load_config(path).unwrap();
        assert_eq!(config.pipeline.strategy, BalanceStrategy::Content);
        assert_eq!(config.pipeline.watch_poll_interval(), Duration::from_secs(15));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/path/ledger.toml");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_missing_wallet_section_is_parse_error() {
        let file = write_config("[pipeline]\npage_size = 100\n");

        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_invalid_page_size() {
        let file = write_config(
            r#"
[wallet]
bridge_url = "http://127.0.0.1:3300"

[pipeline]
page_size = 0
"#,
        );

        let result = load_config(file.path());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn test_run_timeout_shorter_than_request_timeout() {
        let file = write_config(
            r#"
[wallet]
bridge_url = "http://127.0.0.1:3300"

[pipeline]
request_timeout_secs = 60
run_timeout_secs = 30
"#,
        );

        let result = load_config(file.path());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn test_unknown_strategy_is_parse_error() {
        let file = write_config(
            r#"
[wallet]
bridge_url = "http://127.0.0.1:3300"

[pipeline]
strategy = "oracle"
"#,
        );

        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_indexer_strategy_with_token() {
        let file = write_config(
            r#"
[wallet]
bridge_url = "http://127.0.0.1:3300"

[indexer]
api_token = "abc"

[pipeline]
strategy = "indexer"
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.pipeline.strategy, BalanceStrategy::Indexer);
    }

    #[test]
    fn test_config_to_pipeline_settings() {
        let file = write_config(&create_valid_config());

        let config = load_config(file.path()).unwrap();
        let settings = PipelineSettings::from(&config);

        assert_eq!(settings.page_size, 100);
        assert_eq!(settings.request_timeout, Duration::from_secs(20));
        assert_eq!(settings.run_timeout, Duration::from_secs(120));
    }
}
