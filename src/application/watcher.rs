//! Re-runs the balance strategy when the wallet connection changes
//!
//! The connected flag, the network and the current account trigger a re-run;
//! balance updates alone do not.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::connection::ConnectionManager;
use super::strategy::{BalanceTable, StrategyRunner};
use crate::domain::{ConnectionState, Network};

#[derive(Debug, Clone, PartialEq, Eq)]
struct RunTrigger {
    connected: bool,
    network: Network,
    account: Option<String>,
}

impl RunTrigger {
    fn of(state: &ConnectionState) -> Self {
        Self {
            connected: state.connected,
            network: state.network,
            account: state.current_account.clone(),
        }
    }
}

pub struct BalanceWatcher {
    runner: Arc<StrategyRunner>,
    connection: Arc<ConnectionManager>,
    poll_interval: Duration,
    shutdown: CancellationToken,
}

impl BalanceWatcher {
    pub fn new(
        runner: Arc<StrategyRunner>,
        connection: Arc<ConnectionManager>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            runner,
            connection,
            poll_interval,
            shutdown: CancellationToken::new(),
        }
    }

    /// Stop watching and cancel any run in flight
    pub fn stop(&self) {
        self.shutdown.cancel();
        self.runner.cancel();
    }

    /// Run once, then again after every relevant connection change, until
    /// [`stop`](Self::stop) is called. The wallet is polled every
    /// `poll_interval` so changes made inside the wallet are noticed.
    pub async fn run<F>(&self, mut on_update: F)
    where
        F: FnMut(&ConnectionState, BalanceTable),
    {
        let mut changes = self.connection.subscribe();
        let mut poll = tokio::time::interval(self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        poll.tick().await;

        let state = changes.borrow_and_update().clone();
        let mut trigger = RunTrigger::of(&state);
        tracing::info!(
            strategy = %self.runner.strategy(),
            network = %state.network,
            "Watching wallet for changes"
        );
        on_update(&state, self.runner.run(&state).await);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = poll.tick() => {
                    self.connection.refresh().await;
                }
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = changes.borrow_and_update().clone();
                    let next = RunTrigger::of(&state);
                    if next == trigger {
                        continue;
                    }
                    trigger = next;
                    tracing::info!(
                        connected = state.connected,
                        network = %state.network,
                        account = ?state.current_account,
                        "Connection changed, reloading balances"
                    );
                    on_update(&state, self.runner.run(&state).await);
                }
            }
        }

        tracing::info!("Balance watcher stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pipeline::AggregationPipeline;
    use crate::application::stages::PipelineSettings;
    use crate::domain::Inscription;
    use crate::ports::mocks::{MockContentFetcher, MockWallet, RecordingNotices};
    use serde_json::json;
    use std::sync::Mutex;

    async fn wait_for(updates: &Mutex<Vec<(ConnectionState, BalanceTable)>>, count: usize) {
        for _ in 0..200 {
            if updates.lock().unwrap().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {} updates", count);
    }

    #[tokio::test]
    async fn test_reruns_on_network_and_connection_changes() {
        let wallet = Arc::new(
            MockWallet::new()
                .with_inscriptions(vec![Inscription::new("a", "https://c/a")])
                .with_accounts(Network::Livenet, &["bc1qmain"])
                .with_accounts(Network::Testnet, &["tb1qtest"]),
        );
        let fetcher = MockContentFetcher::new()
            .with_content("https://c/a", json!({ "op": "mint", "tick": "ordi", "amt": "1" }));
        let notices = Arc::new(RecordingNotices::new());

        let connection = Arc::new(ConnectionManager::new(
            wallet.clone(),
            notices.clone(),
            Duration::from_secs(5),
        ));
        connection.probe().await;

        let pipeline = AggregationPipeline::new(
            wallet.clone(),
            Arc::new(fetcher),
            notices.clone(),
            PipelineSettings::default(),
        );
        let watcher = Arc::new(BalanceWatcher::new(
            Arc::new(StrategyRunner::Content(pipeline)),
            connection.clone(),
            Duration::from_secs(3600),
        ));

        let updates = Arc::new(Mutex::new(Vec::new()));
        let handle = {
            let watcher = watcher.clone();
            let updates = updates.clone();
            tokio::spawn(async move {
                watcher
                    .run(move |state, table| updates.lock().unwrap().push((state.clone(), table)))
                    .await;
            })
        };

        wait_for(&updates, 1).await;
        assert_eq!(updates.lock().unwrap()[0].1.len(), 1);

        connection.switch_network().await;
        wait_for(&updates, 2).await;
        assert_eq!(updates.lock().unwrap()[1].0.network, Network::Testnet);

        connection.disconnect();
        wait_for(&updates, 3).await;
        assert!(updates.lock().unwrap()[2].1.is_empty());

        watcher.stop();
        handle.await.unwrap();
        assert_eq!(updates.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_reruns_when_wallet_account_changes() {
        let wallet = Arc::new(
            MockWallet::new()
                .with_inscriptions(vec![Inscription::new("a", "https://c/a")])
                .with_accounts(Network::Livenet, &["bc1qmain"]),
        );
        let notices = Arc::new(RecordingNotices::new());
        let connection = Arc::new(ConnectionManager::new(
            wallet.clone(),
            notices.clone(),
            Duration::from_secs(5),
        ));
        connection.probe().await;

        let pipeline = AggregationPipeline::new(
            wallet.clone(),
            Arc::new(MockContentFetcher::new()),
            notices,
            PipelineSettings::default(),
        );
        let watcher = Arc::new(BalanceWatcher::new(
            Arc::new(StrategyRunner::Content(pipeline)),
            connection.clone(),
            Duration::from_secs(3600),
        ));

        let updates = Arc::new(Mutex::new(Vec::new()));
        let handle = {
            let watcher = watcher.clone();
            let updates = updates.clone();
            tokio::spawn(async move {
                watcher
                    .run(move |state, table| updates.lock().unwrap().push((state.clone(), table)))
                    .await;
            })
        };

        wait_for(&updates, 1).await;
        assert_eq!(
            updates.lock().unwrap()[0].0.current_account.as_deref(),
            Some("bc1qmain")
        );

        wallet.set_accounts(Network::Livenet, &["bc1qother"]);
        connection.refresh().await;
        wait_for(&updates, 2).await;
        assert_eq!(
            updates.lock().unwrap()[1].0.current_account.as_deref(),
            Some("bc1qother")
        );

        // Nothing changed in the wallet: no further reload
        connection.refresh().await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        watcher.stop();
        handle.await.unwrap();
        assert_eq!(updates.lock().unwrap().len(), 2);
        assert_eq!(wallet.page_offsets().len(), 4);
    }
}
