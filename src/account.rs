//! Connected account overview.
//!
//! The [`AccountWatcher`] follows the wallet session and keeps a snapshot of the connected
//! account's discount and payments, cleared whenever the session ends.

use crate::{
    client::PaymentProcessorClient,
    history::HistoryReader,
    types::{DiscountRate, PaymentRecord},
    wallet::{SessionEvent, WalletSession},
};
use alloy::primitives::Address;
use std::{future::IntoFuture, pin::Pin};
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

/// Discount and payments of the connected account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    /// The connected account.
    pub account: Address,
    /// The account's discount, if it could be read.
    pub discount: Option<DiscountRate>,
    /// The account's well-formed payments, in contract order.
    pub payments: Vec<PaymentRecord>,
    /// Read failures encountered while building the snapshot.
    pub errors: Vec<String>,
}

/// Handle to read the latest [`AccountSnapshot`].
#[derive(Debug, Clone)]
pub struct AccountWatcherHandle {
    snapshot: watch::Receiver<Option<AccountSnapshot>>,
}

impl AccountWatcherHandle {
    /// The latest snapshot. `None` while no session is active.
    pub fn snapshot(&self) -> Option<AccountSnapshot> {
        self.snapshot.borrow().clone()
    }

    /// Waits for the next snapshot change.
    pub async fn changed(&mut self) -> Option<AccountSnapshot> {
        self.snapshot.changed().await.ok()?;
        self.snapshot.borrow_and_update().clone()
    }
}

/// Refreshes the account snapshot on session changes.
#[derive(Debug)]
pub struct AccountWatcher {
    session_events: broadcast::Receiver<SessionEvent>,
    client: PaymentProcessorClient,
    history: HistoryReader,
    snapshot: watch::Sender<Option<AccountSnapshot>>,
}

impl AccountWatcher {
    /// Creates a new watcher and its handle.
    ///
    /// The watcher subscribes to `session` immediately, so no session event emitted after this
    /// call is missed.
    pub fn new(
        session: &WalletSession,
        client: PaymentProcessorClient,
        history: HistoryReader,
    ) -> (Self, AccountWatcherHandle) {
        let (snapshot, rx) = watch::channel(None);
        let watcher = Self { session_events: session.subscribe(), client, history, snapshot };
        (watcher, AccountWatcherHandle { snapshot: rx })
    }

    /// Loads the snapshot of `account`.
    pub async fn load(&self, account: Address) -> AccountSnapshot {
        let mut errors = Vec::new();

        let discount = match self.client.get_discount(account).await {
            Ok(raw) => DiscountRate::try_from(raw).map_err(|err| errors.push(err.to_string())).ok(),
            Err(err) => {
                errors.push(err.to_string());
                None
            }
        };

        let mut payments = Vec::new();
        match self.history.load_account_payments(account).await {
            Ok(history) => {
                for entry in history {
                    match entry {
                        Ok(record) => payments.push(record),
                        Err(err) => errors.push(err.to_string()),
                    }
                }
            }
            Err(err) => errors.push(err.to_string()),
        }

        AccountSnapshot { account, discount, payments, errors }
    }
}

impl IntoFuture for AccountWatcher {
    type Output = ();
    type IntoFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

    fn into_future(mut self) -> Self::IntoFuture {
        Box::pin(async move {
            loop {
                match self.session_events.recv().await {
                    Ok(SessionEvent::Connected(session)) => {
                        let snapshot = self.load(session.account).await;
                        if !snapshot.errors.is_empty() {
                            warn!(account = %session.account, errors = ?snapshot.errors, "Incomplete account snapshot");
                        }
                        self.snapshot.send_replace(Some(snapshot));
                    }
                    Ok(SessionEvent::Invalidated(reason)) => {
                        debug!(?reason, "Clearing account snapshot");
                        self.snapshot.send_replace(None);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Account watcher lagged behind session events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        types::IPaymentProcessor,
        wallet::{InMemoryWallet, ProviderEvent},
    };
    use alloy::{
        primitives::{U256, address},
        sol_types::SolValue,
    };
    use std::sync::Arc;

    const PROCESSOR: Address = address!("0x679cc85aFDDca3d717A290Cc2cC97caedF4B781C");
    const ALICE: Address = address!("0x00000000000000000000000000000000000a11ce");

    #[tokio::test]
    async fn follows_session() {
        let payment = IPaymentProcessor::Payment {
            payer: ALICE,
            amount: U256::from(5),
            timestamp: U256::from(1_700_000_000),
            paymentType: 0,
            isDiscounted: true,
        };
        let wallet = InMemoryWallet::new(56)
            .with_accounts([ALICE])
            .with_call_response::<IPaymentProcessor::userDiscountsCall>(U256::from(15).abi_encode())
            .with_call_response::<IPaymentProcessor::getUserPaymentsCall>(
                (vec![payment],).abi_encode_params(),
            );
        let provider = Arc::new(wallet.clone());
        let session = Arc::new(WalletSession::new(Some(provider.clone())));
        let client = PaymentProcessorClient::new(provider, PROCESSOR);
        let history = HistoryReader::new(client.clone(), session.clone());

        let (watcher, mut handle) = AccountWatcher::new(&session, client, history);
        tokio::spawn(watcher.into_future());
        assert!(handle.snapshot().is_none());

        session.connect().await.unwrap();
        let snapshot = handle.changed().await.unwrap();
        assert_eq!(snapshot.account, ALICE);
        assert_eq!(snapshot.discount.unwrap().percent(), 15);
        assert_eq!(snapshot.payments.len(), 1);
        assert!(snapshot.errors.is_empty());

        session.on_provider_event(ProviderEvent::Disconnect).await;
        assert!(handle.changed().await.is_none());
        assert!(handle.snapshot().is_none());
    }

    #[tokio::test]
    async fn partial_failures_are_reported() {
        let wallet = InMemoryWallet::new(56)
            .with_call_response::<IPaymentProcessor::userDiscountsCall>(U256::from(250).abi_encode());
        let provider = Arc::new(wallet.clone());
        let session = Arc::new(WalletSession::new(Some(provider.clone())));
        let client = PaymentProcessorClient::new(provider, PROCESSOR);
        let history = HistoryReader::new(client.clone(), session.clone());
        let (watcher, _handle) = AccountWatcher::new(&session, client, history);

        let snapshot = watcher.load(ALICE).await;
        assert!(snapshot.discount.is_none());
        assert!(snapshot.payments.is_empty());
        assert_eq!(snapshot.errors.len(), 2);
    }
}
