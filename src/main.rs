//! Inscription Ledger - BRC-20 balances from a wallet's inscriptions

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use inscription_ledger::adapters::cli::{
    table, BalancesCmd, CliApp, Command, ConsoleNotices, OutputFormat, StatusCmd,
    SwitchNetworkCmd, WatchCmd,
};
use inscription_ledger::adapters::content::{HttpContentConfig, HttpContentFetcher};
use inscription_ledger::adapters::indexer::{IndexerClientConfig, UnisatIndexerClient};
use inscription_ledger::adapters::wallet_bridge::{WalletBridgeClient, WalletBridgeConfig};
use inscription_ledger::application::{
    AggregationPipeline, BalanceStrategy, BalanceTable, BalanceWatcher, ConnectionManager,
    IndexerBalanceStrategy, PipelineSettings, StrategyRunner,
};
use inscription_ledger::config::{load_config, Config};
use inscription_ledger::domain::ConnectionState;
use inscription_ledger::ports::NoticeSink;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (tokens go here, not in ledger.toml)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    let config = load(app.command.config_path())?;
    init_logging(app.verbose, app.debug, &config.logging.level)?;

    match app.command {
        Command::Balances(cmd) => balances_command(cmd, config).await,
        Command::Watch(cmd) => watch_command(cmd, config).await,
        Command::Status(cmd) => status_command(cmd, config).await,
        Command::SwitchNetwork(cmd) => switch_network_command(cmd, config).await,
    }
}

/// `--debug` and `--verbose` win over RUST_LOG, which wins over the config file
fn init_logging(verbose: bool, debug: bool, level: &str) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .with_context(|| format!("Invalid log level '{}'", level))?
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn load(path: &Path) -> Result<Config> {
    // Expand config path (handles ~ for home directory)
    let path = shellexpand::tilde(&path.to_string_lossy()).to_string();
    load_config(&path).with_context(|| format!("Failed to load configuration from {}", path))
}

async fn balances_command(cmd: BalancesCmd, config: Config) -> Result<()> {
    let notices: Arc<dyn NoticeSink> = Arc::new(ConsoleNotices);
    let wallet = wallet_client(&config)?;
    let connection = connection_manager(&config, wallet.clone(), notices.clone());

    let state = open(&connection, cmd.connect).await;
    let strategy = cmd.strategy.unwrap_or(config.pipeline.strategy);
    let runner = Arc::new(build_runner(&config, strategy, wallet, notices)?);

    let handle = runner.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        handle.cancel();
    });

    tracing::info!(%strategy, "Loading balances");
    let table = runner.run(&state).await;
    print_table(&table, cmd.format, cmd.details)
}

async fn watch_command(cmd: WatchCmd, config: Config) -> Result<()> {
    let notices: Arc<dyn NoticeSink> = Arc::new(ConsoleNotices);
    let wallet = wallet_client(&config)?;
    let connection = Arc::new(connection_manager(&config, wallet.clone(), notices.clone()));

    open(&connection, cmd.connect).await;
    let strategy = cmd.strategy.unwrap_or(config.pipeline.strategy);
    let runner = Arc::new(build_runner(&config, strategy, wallet, notices)?);

    let watcher = Arc::new(BalanceWatcher::new(
        runner,
        connection,
        config.pipeline.watch_poll_interval(),
    ));

    // Setup Ctrl+C handler
    let handle = watcher.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        handle.stop();
    });

    let (format, details) = (cmd.format, cmd.details);
    watcher
        .run(|state, table| {
            if format == OutputFormat::Text {
                println!("\n== {} {} ==", state.network, state.account_label());
            }
            if let Err(e) = print_table(&table, format, details) {
                tracing::error!("Failed to print balances: {:#}", e);
            }
        })
        .await;

    Ok(())
}

async fn status_command(cmd: StatusCmd, config: Config) -> Result<()> {
    let notices: Arc<dyn NoticeSink> = Arc::new(ConsoleNotices);
    let wallet = wallet_client(&config)?;
    let connection = connection_manager(&config, wallet, notices);

    let state = open(&connection, cmd.connect).await;
    println!("{}", table::render_status(&state));
    Ok(())
}

async fn switch_network_command(_cmd: SwitchNetworkCmd, config: Config) -> Result<()> {
    let notices: Arc<dyn NoticeSink> = Arc::new(ConsoleNotices);
    let wallet = wallet_client(&config)?;
    let connection = connection_manager(&config, wallet, notices);

    let before = connection.probe().await;
    if !before.wallet_installed {
        bail!(
            "Wallet bridge at {} is not reachable",
            config.wallet.get_bridge_url()
        );
    }

    let after = connection.switch_network().await;
    if after.network == before.network {
        bail!("Network is still {}", after.network);
    }

    println!("{}", table::render_status(&after));
    Ok(())
}

/// Probe the wallet and, when asked, request account access
async fn open(connection: &ConnectionManager, connect: bool) -> ConnectionState {
    let state = connection.probe().await;
    if connect && state.wallet_installed && !state.is_ready() {
        return connection.connect().await;
    }
    state
}

fn wallet_client(config: &Config) -> Result<Arc<WalletBridgeClient>> {
    let client = WalletBridgeClient::with_config(WalletBridgeConfig {
        base_url: config.wallet.get_bridge_url(),
        timeout: config.pipeline.request_timeout(),
    })
    .context("Failed to create wallet bridge client")?;
    Ok(Arc::new(client))
}

fn connection_manager(
    config: &Config,
    wallet: Arc<WalletBridgeClient>,
    notices: Arc<dyn NoticeSink>,
) -> ConnectionManager {
    ConnectionManager::new(wallet, notices, config.pipeline.request_timeout())
}

fn build_runner(
    config: &Config,
    strategy: BalanceStrategy,
    wallet: Arc<WalletBridgeClient>,
    notices: Arc<dyn NoticeSink>,
) -> Result<StrategyRunner> {
    let settings = PipelineSettings::from(config);
    let fetcher = Arc::new(
        HttpContentFetcher::with_config(HttpContentConfig {
            timeout: config.pipeline.request_timeout(),
        })
        .context("Failed to create content client")?,
    );

    match strategy {
        BalanceStrategy::Content => Ok(StrategyRunner::Content(AggregationPipeline::new(
            wallet, fetcher, notices, settings,
        ))),
        BalanceStrategy::Indexer => {
            let token = config
                .indexer
                .get_api_token()
                .context("The indexer strategy needs indexer.api_token or INDEXER_API_TOKEN")?;
            let indexer = Arc::new(
                UnisatIndexerClient::with_config(IndexerClientConfig {
                    api_url: config.indexer.api_url.clone(),
                    timeout: config.pipeline.request_timeout(),
                })
                .context("Failed to create indexer client")?,
            );
            Ok(StrategyRunner::Indexer(IndexerBalanceStrategy::new(
                wallet, fetcher, indexer, token, notices, settings,
            )))
        }
    }
}

fn print_table(balances: &BalanceTable, format: OutputFormat, details: bool) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", table::render_table(balances, details)),
        OutputFormat::Json => {
            println!("{}", table::render_json(balances).context("Failed to encode balances")?)
        }
    }
    Ok(())
}
