//! Dashboard test environment.

use alloy::{
    primitives::{Address, U256, address},
    sol_types::SolValue,
};
use payflow::{
    config::DashboardConfig,
    orchestrator::{PaymentState, PaymentStateChange},
    spawn::{Dashboard, spawn},
    types::{IERC20, IPaymentProcessor, TokenDescriptor},
    wallet::{InMemoryWallet, Session, WalletProvider},
};
use rust_decimal::Decimal;
use std::{sync::Arc, time::Duration};
use tokio::sync::broadcast;

pub const ALICE: Address = address!("0x00000000000000000000000000000000000a11ce");
pub const PROCESSOR: Address = address!("0x0000000000000000000000000000000000c0ffee");
pub const USDT: Address = address!("0x55d398326f99059fF775485246999027B3197955");

/// A wallet on BNB Smart Chain exposing [`ALICE`], who has a 20% discount and has approved the
/// processor for 1000 USDT.
pub fn wallet() -> InMemoryWallet {
    wallet_on(56)
}

/// Like [`wallet`], attached to `chain_id`.
pub fn wallet_on(chain_id: u64) -> InMemoryWallet {
    InMemoryWallet::new(chain_id)
        .with_accounts([ALICE])
        .with_call_response::<IPaymentProcessor::userDiscountsCall>(U256::from(20).abi_encode())
        .with_call_response::<IERC20::allowanceCall>(
            (U256::from(1000) * U256::from(10).pow(U256::from(18))).abi_encode(),
        )
}

pub fn usdt() -> TokenDescriptor {
    TokenDescriptor::new(USDT, "USDT", 18)
}

pub struct Environment {
    pub wallet: InMemoryWallet,
    pub dashboard: Dashboard,
    states: broadcast::Receiver<PaymentStateChange>,
}

impl Environment {
    pub fn new(wallet: InMemoryWallet) -> Self {
        Self::with_config(wallet, Self::config())
    }

    pub fn with_config(wallet: InMemoryWallet, config: DashboardConfig) -> Self {
        let provider: Arc<dyn WalletProvider> = Arc::new(wallet.clone());
        let dashboard = spawn(config, provider.clone(), Some(provider));
        let states = dashboard.orchestrator.subscribe();
        Self { wallet, dashboard, states }
    }

    pub fn config() -> DashboardConfig {
        let mut config = DashboardConfig::default()
            .with_contract(Some(PROCESSOR))
            .with_tokens(vec![usdt()])
            .with_native_rate(Some(Decimal::from(300)))
            .with_receipt_timeout(Some(Duration::from_secs(10)))
            .with_poll_interval(Some(Duration::from_secs(1)));
        config.payments.price_feed = None;
        config
    }

    pub async fn connect(&self) -> Session {
        self.dashboard.session.connect().await.unwrap()
    }

    /// Drains the payment states published so far.
    pub fn states(&mut self) -> Vec<PaymentState> {
        std::iter::from_fn(|| self.states.try_recv().ok()).map(|change| change.state).collect()
    }
}
