use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SATS_PER_BTC_SCALE: u32 = 8;

#[derive(Debug, Error, PartialEq)]
#[error("Unknown network '{0}', expected 'livenet' or 'testnet'")]
pub struct UnknownNetwork(pub String);

/// Bitcoin network the wallet is pointed at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Livenet,
    Testnet,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Livenet => "livenet",
            Network::Testnet => "testnet",
        }
    }

    /// The other network
    pub fn toggled(&self) -> Self {
        match self {
            Network::Livenet => Network::Testnet,
            Network::Testnet => Network::Livenet,
        }
    }

    /// mempool.space page for an address on this network
    pub fn explorer_address_url(&self, address: &str) -> String {
        match self {
            Network::Livenet => format!("https://mempool.space/address/{}", address),
            Network::Testnet => format!("https://mempool.space/testnet/address/{}", address),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "livenet" => Ok(Network::Livenet),
            "testnet" => Ok(Network::Testnet),
            other => Err(UnknownNetwork(other.to_string())),
        }
    }
}

/// Wallet balance in satoshis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletBalance {
    #[serde(default)]
    pub confirmed: u64,
    #[serde(default)]
    pub unconfirmed: u64,
    #[serde(default)]
    pub total: u64,
}

impl WalletBalance {
    /// Total balance in BTC, always carrying 8 decimal places
    pub fn total_btc(&self) -> Decimal {
        Decimal::from_i128_with_scale(self.total as i128, SATS_PER_BTC_SCALE)
    }
}

/// Wallet connection as seen by the rest of the application
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    /// The wallet answered at least once
    pub wallet_installed: bool,
    pub connected: bool,
    pub current_account: Option<String>,
    pub balance: WalletBalance,
    pub network: Network,
}

impl ConnectionState {
    /// Account to aggregate for, if the wallet is connected to one
    pub fn ready_account(&self) -> Option<&str> {
        if !self.connected {
            return None;
        }
        self.current_account
            .as_deref()
            .filter(|account| !account.is_empty())
    }

    pub fn is_ready(&self) -> bool {
        self.ready_account().is_some()
    }

    /// Forget the account and balance, keeping network and install status
    pub fn disconnect(&mut self) {
        self.connected = false;
        self.current_account = None;
        self.balance = WalletBalance::default();
    }

    /// Short account label, e.g. `bc1qxy...`
    pub fn account_label(&self) -> String {
        match self.current_account.as_deref() {
            Some(account) if !account.is_empty() => {
                let prefix: String = account.chars().take(6).collect();
                format!("{}...", prefix)
            }
            _ => "Select Account".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_network_roundtrip_and_toggle() {
        assert_eq!("livenet".parse::<Network>(), Ok(Network::Livenet));
        assert_eq!(" Testnet ".parse::<Network>(), Ok(Network::Testnet));
        assert!("signet".parse::<Network>().is_err());
        assert_eq!(Network::Livenet.toggled(), Network::Testnet);
        assert_eq!(Network::Testnet.toggled().to_string(), "livenet");
    }

    #[test]
    fn test_network_serde_is_lowercase() {
        let json = serde_json::to_string(&Network::Testnet).unwrap();
        assert_eq!(json, "\"testnet\"");
        let parsed: Network = serde_json::from_str("\"livenet\"").unwrap();
        assert_eq!(parsed, Network::Livenet);
    }

    #[test]
    fn test_explorer_links() {
        assert_eq!(
            Network::Livenet.explorer_address_url("bc1qabc"),
            "https://mempool.space/address/bc1qabc"
        );
        assert_eq!(
            Network::Testnet.explorer_address_url("tb1qabc"),
            "https://mempool.space/testnet/address/tb1qabc"
        );
    }

    #[test]
    fn test_total_btc_has_eight_decimals() {
        let balance = WalletBalance { confirmed: 12_345, unconfirmed: 0, total: 12_345 };
        assert_eq!(balance.total_btc(), dec!(0.00012345));
        assert_eq!(WalletBalance::default().total_btc().to_string(), "0.00000000");
    }

    #[test]
    fn test_ready_requires_connected_account() {
        let mut state = ConnectionState::default();
        assert!(!state.is_ready());

        state.connected = true;
        assert!(!state.is_ready());

        state.current_account = Some(String::new());
        assert!(!state.is_ready());

        state.current_account = Some("bc1qabc".to_string());
        assert_eq!(state.ready_account(), Some("bc1qabc"));

        state.disconnect();
        assert!(!state.is_ready());
        assert_eq!(state.account_label(), "Select Account");
    }

    #[test]
    fn test_account_label_truncates() {
        let state = ConnectionState {
            connected: true,
            current_account: Some("bc1qxyz2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh".to_string()),
            ..Default::default()
        };
        assert_eq!(state.account_label(), "bc1qxy...");
    }
}
