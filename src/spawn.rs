//! Dashboard spawn utilities.
use crate::{
    account::{AccountWatcher, AccountWatcherHandle},
    cli::Args,
    client::PaymentProcessorClient,
    config::DashboardConfig,
    error::TransactionError,
    history::HistoryReader,
    orchestrator::PaymentOrchestrator,
    constants::PRICE_FETCH_INTERVAL,
    price::{ChainlinkFeed, PriceCalculator, PriceOracle, PriceOracleConfig},
    transactions::{PendingTransaction, ReceiptMonitor},
    transport::connect_http,
    wallet::{NetworkAdapter, Receipt, RpcWallet, WalletProvider, WalletSession},
};
use alloy::signers::local::PrivateKeySigner;
use std::{future::IntoFuture, path::Path, sync::Arc};
use tracing::{info, warn};

/// Components of a running dashboard.
#[derive(Debug, Clone)]
pub struct Dashboard {
    /// The configuration the dashboard was spawned with.
    pub config: DashboardConfig,
    /// The wallet session.
    pub session: Arc<WalletSession>,
    /// Payment processor client.
    pub client: PaymentProcessorClient,
    /// Payment history reader.
    pub history: HistoryReader,
    /// Payment orchestrator.
    pub orchestrator: Arc<PaymentOrchestrator>,
    /// Receipt monitor.
    pub monitor: ReceiptMonitor,
    /// Native price oracle.
    pub price_oracle: PriceOracle,
    /// Connected account overview.
    pub account: AccountWatcherHandle,
}

impl Dashboard {
    /// Waits for a transaction submitted outside of the payment flow to be included.
    pub async fn confirm(&self, pending: &PendingTransaction) -> Result<Receipt, TransactionError> {
        self.monitor.watch_transaction(pending.tx_hash, self.config.payments.receipt_timeout).await
    }
}

/// Attempts to spawn the dashboard using CLI arguments and a configuration file.
///
/// If the configuration file is missing, the merged configuration is written to `config_path`.
pub async fn try_spawn_with_args<P: AsRef<Path>>(
    args: &Args,
    config_path: P,
) -> eyre::Result<Dashboard> {
    let config = if !config_path.as_ref().exists() {
        let config = args.merge_dashboard_config(DashboardConfig::default());
        config.save_to_file(&config_path)?;
        config
    } else {
        // File exists: load and override with CLI values.
        args.merge_dashboard_config(DashboardConfig::load_from_file(&config_path)?)
    };

    let signer = args.secret_key.as_deref().map(str::parse::<PrivateKeySigner>).transpose()?;
    let signer_address = signer.as_ref().map(|signer| signer.address());
    let has_wallet = signer.is_some() || args.remote_signer;

    let provider = connect_http(
        config.network.rpc_url.clone(),
        config.payments.request_timeout,
        signer,
    );
    let wallet = RpcWallet::new(provider, signer_address);
    if let Some(address) = signer_address {
        info!(%address, "Using local signer");
    }
    if has_wallet {
        wallet.spawn_chain_watcher(config.payments.poll_interval);
    }

    let provider: Arc<dyn WalletProvider> = Arc::new(wallet);
    let dashboard = spawn(config, provider.clone(), has_wallet.then_some(provider.clone()));

    // Commands run once, so the first feed answer is awaited rather than raced.
    if let Some(feed) = dashboard.config.payments.price_feed
        && let Ok(rate) = ChainlinkFeed::new(provider, feed).latest_rate().await
    {
        dashboard.price_oracle.update(rate);
    }

    Ok(dashboard)
}

/// Spawns the dashboard components.
///
/// Reads go through `provider`. Sessions can only be established if a `wallet` is given, and the
/// network check and signing both go through it.
pub fn spawn(
    config: DashboardConfig,
    provider: Arc<dyn WalletProvider>,
    wallet: Option<Arc<dyn WalletProvider>>,
) -> Dashboard {
    let network = NetworkAdapter::new(
        wallet.clone().unwrap_or_else(|| provider.clone()),
        config.network.clone(),
    );
    let session = Arc::new(WalletSession::new(wallet));
    session.spawn_event_listener();

    let client = PaymentProcessorClient::new(provider.clone(), config.contract);
    let history = HistoryReader::new(client.clone(), session.clone());
    let monitor = ReceiptMonitor::new(provider.clone(), config.payments.poll_interval);

    let mut price_oracle = PriceOracle::new(PriceOracleConfig::default());
    if let Some(rate) = config.payments.native_rate {
        warn!(%rate, "Using a constant native price");
        price_oracle = price_oracle.with_constant_rate(Some(rate));
    }
    if let Some(feed) = config.payments.price_feed {
        info!(%feed, "Reading native price from feed");
        ChainlinkFeed::new(provider.clone(), feed)
            .launch(price_oracle.clone(), PRICE_FETCH_INTERVAL);
    }
    let calculator = PriceCalculator::new(
        Arc::new(price_oracle.clone()),
        config.network.native_currency.decimals,
    );

    let orchestrator = Arc::new(PaymentOrchestrator::new(
        session.clone(),
        network,
        client.clone(),
        calculator,
        monitor.clone(),
        config.payments.receipt_timeout,
    ));

    let (watcher, account) = AccountWatcher::new(&session, client.clone(), history.clone());
    tokio::spawn(watcher.into_future());

    info!(
        chain = %config.network.chain_name,
        contract = %config.contract,
        "Dashboard ready"
    );

    Dashboard { config, session, client, history, orchestrator, monitor, price_oracle, account }
}
