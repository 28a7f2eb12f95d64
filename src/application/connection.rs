//! Wallet connection management
//!
//! Owns the [`ConnectionState`] and publishes every change on a watch
//! channel. Wallet failures never propagate: they are logged and turned into
//! an error notice, leaving the state as far as it got.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::domain::{ConnectionState, WalletBalance};
use crate::ports::{Notice, NoticeSink, WalletError, WalletPort};

pub struct ConnectionManager {
    wallet: Arc<dyn WalletPort>,
    notices: Arc<dyn NoticeSink>,
    state: watch::Sender<ConnectionState>,
    request_timeout: Duration,
}

impl ConnectionManager {
    pub fn new(
        wallet: Arc<dyn WalletPort>,
        notices: Arc<dyn NoticeSink>,
        request_timeout: Duration,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::default());
        Self {
            wallet,
            notices,
            state,
            request_timeout,
        }
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// mempool.space link for the current account
    pub fn explorer_link(&self) -> Option<String> {
        let state = self.state.borrow();
        state
            .current_account
            .as_deref()
            .map(|account| state.network.explorer_address_url(account))
    }

    /// Initial check: read the network and pick up already exposed accounts.
    pub async fn probe(&self) -> ConnectionState {
        if let Err(e) = self.try_probe().await {
            tracing::error!("Error checking wallet status: {}", e);
            self.notices.notify(Notice::error("Could not check wallet status"));
        }
        self.state()
    }

    async fn try_probe(&self) -> Result<(), WalletError> {
        let network = self.call(self.wallet.get_network()).await?;
        self.state.send_modify(|state| {
            state.wallet_installed = true;
            state.network = network;
        });

        let accounts = self.call(self.wallet.get_accounts()).await?;
        if let Some(account) = accounts.into_iter().next() {
            self.adopt_account(account).await?;
        }
        Ok(())
    }

    /// Ask the wallet for accounts and connect to the first one.
    pub async fn connect(&self) -> ConnectionState {
        if let Err(e) = self.try_connect().await {
            tracing::error!("Error connecting to wallet: {}", e);
            self.notices.notify(Notice::error("Could not connect to wallet"));
        }
        self.state()
    }

    async fn try_connect(&self) -> Result<(), WalletError> {
        let accounts = self.call(self.wallet.request_accounts()).await?;
        if let Some(account) = accounts.into_iter().next() {
            self.adopt_account(account).await?;
        }
        Ok(())
    }

    pub fn disconnect(&self) -> ConnectionState {
        self.state.send_modify(ConnectionState::disconnect);
        self.state()
    }

    /// Toggle between livenet and testnet, then refresh the account. Without
    /// an account on the new network the connection is dropped.
    pub async fn switch_network(&self) -> ConnectionState {
        if let Err(e) = self.try_switch_network().await {
            tracing::error!("Error switching network: {}", e);
            self.notices.notify(Notice::error("Could not switch network"));
        }
        self.state()
    }

    async fn try_switch_network(&self) -> Result<(), WalletError> {
        let target = self.state.borrow().network.toggled();
        self.call(self.wallet.switch_network(target)).await?;
        tracing::info!(network = %target, "Switched network");

        // Network and account change in a single publish
        let account = match self.call(self.wallet.get_accounts()).await {
            Ok(accounts) => accounts.into_iter().next(),
            Err(e) => {
                self.state.send_modify(|state| {
                    state.network = target;
                    state.disconnect();
                });
                return Err(e);
            }
        };
        self.state.send_modify(|state| {
            state.network = target;
            match &account {
                Some(account) => state.current_account = Some(account.clone()),
                None => state.disconnect(),
            }
        });

        if let Some(account) = account {
            let balance = self.call(self.wallet.get_balance(&account)).await?;
            self.state.send_modify(|state| state.balance = balance);
        }
        Ok(())
    }

    /// Pick up changes made inside the wallet (network, account) without
    /// connecting on the user's behalf.
    pub async fn refresh(&self) -> ConnectionState {
        if let Err(e) = self.try_refresh().await {
            tracing::warn!("Error refreshing wallet status: {}", e);
        }
        self.state()
    }

    async fn try_refresh(&self) -> Result<(), WalletError> {
        let network = self.call(self.wallet.get_network()).await?;
        self.state.send_if_modified(|state| {
            let changed = !state.wallet_installed || state.network != network;
            state.wallet_installed = true;
            state.network = network;
            changed
        });

        if !self.state.borrow().connected {
            return Ok(());
        }

        let accounts = self.call(self.wallet.get_accounts()).await?;
        match accounts.into_iter().next() {
            None => self.state.send_modify(ConnectionState::disconnect),
            Some(account) => {
                let current = self.state.borrow().current_account.clone();
                if current.as_deref() != Some(account.as_str()) {
                    self.adopt_account(account).await?;
                }
            }
        }
        Ok(())
    }

    async fn adopt_account(&self, account: String) -> Result<(), WalletError> {
        self.state.send_modify(|state| {
            state.connected = true;
            state.current_account = Some(account.clone());
        });
        let balance: WalletBalance = self.call(self.wallet.get_balance(&account)).await?;
        self.state.send_modify(|state| state.balance = balance);
        tracing::info!(account = %account, "Wallet connected");
        Ok(())
    }

    async fn call<T, F>(&self, request: F) -> Result<T, WalletError>
    where
        F: Future<Output = Result<T, WalletError>>,
    {
        tokio::time::timeout(self.request_timeout, request)
            .await
            .map_err(|_| WalletError::Timeout(self.request_timeout))?
    }
}
