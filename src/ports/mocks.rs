//! In-memory test doubles for the ports
//!
//! Each double records its calls and answers from builder-configured data, so
//! pipeline behaviour can be asserted without a wallet or network.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::content::ContentFetcher;
use super::notice::{Notice, NoticeSink};
use super::wallet::{InscriptionSource, WalletError, WalletPort};
use crate::domain::{Inscription, InscriptionPage, Network, WalletBalance};

/// A call received by [`MockWallet`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletCall {
    GetInscriptions { offset: u64, limit: u64 },
    GetNetwork,
    GetAccounts,
    GetBalance(String),
    RequestAccounts,
    SwitchNetwork(Network),
}

/// Mock wallet serving a fixed inscription set and per-network accounts
#[derive(Debug, Default)]
pub struct MockWallet {
    calls: Arc<Mutex<Vec<WalletCall>>>,
    inscriptions: Vec<Inscription>,
    total: Option<u64>,
    pages: HashMap<u64, Vec<Inscription>>,
    failing_offsets: HashSet<u64>,
    hanging_offsets: HashSet<u64>,
    failing_methods: HashSet<&'static str>,
    network: Arc<Mutex<Network>>,
    accounts: Arc<Mutex<HashMap<Network, Vec<String>>>>,
    requestable: Vec<String>,
    balance: WalletBalance,
}

impl MockWallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve these inscriptions, sliced by offset/limit
    pub fn with_inscriptions(mut self, inscriptions: Vec<Inscription>) -> Self {
        self.inscriptions = inscriptions;
        self
    }

    /// Report this total instead of the number of configured inscriptions
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Serve exactly this list for a page offset
    pub fn with_page(mut self, offset: u64, list: Vec<Inscription>) -> Self {
        self.pages.insert(offset, list);
        self
    }

    pub fn failing_at_offset(mut self, offset: u64) -> Self {
        self.failing_offsets.insert(offset);
        self
    }

    /// Never answer requests for this offset
    pub fn hanging_at_offset(mut self, offset: u64) -> Self {
        self.hanging_offsets.insert(offset);
        self
    }

    /// Make a `WalletPort` method fail, by name (e.g. `"get_balance"`)
    pub fn failing_method(mut self, method: &'static str) -> Self {
        self.failing_methods.insert(method);
        self
    }

    pub fn with_network(self, network: Network) -> Self {
        *self.network.lock().unwrap() = network;
        self
    }

    /// Accounts already exposed on a network
    pub fn with_accounts(self, network: Network, accounts: &[&str]) -> Self {
        self.set_accounts(network, accounts);
        self
    }

    /// Accounts granted by `request_accounts` on the current network
    pub fn with_requestable_accounts(mut self, accounts: &[&str]) -> Self {
        self.requestable = accounts.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_balance(mut self, balance: WalletBalance) -> Self {
        self.balance = balance;
        self
    }

    /// Simulate the user switching network inside the wallet
    pub fn set_network(&self, network: Network) {
        *self.network.lock().unwrap() = network;
    }

    pub fn set_accounts(&self, network: Network, accounts: &[&str]) {
        self.accounts
            .lock()
            .unwrap()
            .insert(network, accounts.iter().map(|a| a.to_string()).collect());
    }

    pub fn current_network(&self) -> Network {
        *self.network.lock().unwrap()
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<WalletCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Offsets of all recorded `get_inscriptions` calls, in call order
    pub fn page_offsets(&self) -> Vec<u64> {
        self.get_calls()
            .into_iter()
            .filter_map(|call| match call {
                WalletCall::GetInscriptions { offset, .. } => Some(offset),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: WalletCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, method: &'static str) -> Result<(), WalletError> {
        if self.failing_methods.contains(method) {
            return Err(WalletError::RequestFailed(format!("{} unavailable", method)));
        }
        Ok(())
    }
}

#[async_trait]
impl InscriptionSource for MockWallet {
    async fn get_inscriptions(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<InscriptionPage, WalletError> {
        self.record(WalletCall::GetInscriptions { offset, limit });

        if self.hanging_offsets.contains(&offset) {
            std::future::pending::<()>().await;
        }
        if self.failing_offsets.contains(&offset) {
            return Err(WalletError::RequestFailed(format!("page at offset {} failed", offset)));
        }

        let total = self.total.unwrap_or(self.inscriptions.len() as u64);
        let list = match self.pages.get(&offset) {
            Some(list) => list.clone(),
            None => self
                .inscriptions
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect(),
        };

        Ok(InscriptionPage { total, list })
    }
}

#[async_trait]
impl WalletPort for MockWallet {
    async fn get_network(&self) -> Result<Network, WalletError> {
        self.record(WalletCall::GetNetwork);
        self.check("get_network")?;
        Ok(self.current_network())
    }

    async fn get_accounts(&self) -> Result<Vec<String>, WalletError> {
        self.record(WalletCall::GetAccounts);
        self.check("get_accounts")?;
        let network = self.current_network();
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .get(&network)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_balance(&self, address: &str) -> Result<WalletBalance, WalletError> {
        self.record(WalletCall::GetBalance(address.to_string()));
        self.check("get_balance")?;
        Ok(self.balance)
    }

    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        self.record(WalletCall::RequestAccounts);
        self.check("request_accounts")?;
        if self.requestable.is_empty() {
            return Err(WalletError::Rejected("User rejected the request".into()));
        }
        let network = self.current_network();
        self.accounts
            .lock()
            .unwrap()
            .insert(network, self.requestable.clone());
        Ok(self.requestable.clone())
    }

    async fn switch_network(&self, network: Network) -> Result<(), WalletError> {
        self.record(WalletCall::SwitchNetwork(network));
        self.check("switch_network")?;
        self.set_network(network);
        Ok(())
    }
}

/// Mock content fetcher answering from a URL -> JSON map
#[derive(Debug, Default)]
pub struct MockContentFetcher {
    calls: Arc<Mutex<Vec<String>>>,
    responses: HashMap<String, Value>,
    delays: HashMap<String, Duration>,
}

impl MockContentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the payload served for a URL
    pub fn with_content(mut self, url: &str, payload: Value) -> Self {
        self.responses.insert(url.to_string(), payload);
        self
    }

    /// Delay the answer for a URL, to shuffle completion order
    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// Get all recorded calls
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentFetcher for MockContentFetcher {
    async fn fetch(&self, url: &str) -> Option<Value> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        self.responses.get(url).cloned()
    }
}

/// Notice sink that keeps everything it receives
#[derive(Debug, Default)]
pub struct RecordingNotices {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl NoticeSink for RecordingNotices {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}
