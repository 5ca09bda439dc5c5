use super::{ProviderEvent, WalletProvider};
use crate::{error::WalletError, transport::error::WalletErrorExt};
use alloy::{
    network::TransactionBuilder,
    primitives::{Address, B256, ChainId},
    rpc::types::TransactionRequest,
    transports::TransportResult,
};
use std::sync::{Arc, Weak};
use tokio::{
    sync::{RwLock, broadcast},
    task::JoinHandle,
};
use tracing::{debug, info, instrument, warn};

/// The signing capability of a connected account.
#[derive(Debug, Clone)]
pub struct SigningHandle {
    provider: Arc<dyn WalletProvider>,
    from: Address,
}

impl SigningHandle {
    /// The account transactions are sent from.
    pub fn address(&self) -> Address {
        self.from
    }

    /// Signs and submits `tx` from the session account.
    pub async fn send_transaction(&self, tx: TransactionRequest) -> TransportResult<B256> {
        self.provider.send_transaction(tx.with_from(self.from)).await
    }
}

/// A connected wallet session.
#[derive(Debug, Clone)]
pub struct Session {
    /// The selected account.
    pub account: Address,
    /// The chain the wallet was attached to when the session was established.
    pub chain_id: ChainId,
    /// Signing capability for `account`.
    pub signer: SigningHandle,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationReason {
    /// The wallet exposed a different account.
    AccountsChanged,
    /// The wallet switched chains.
    ChainChanged(ChainId),
    /// The provider disconnected, or the user disconnected explicitly.
    Disconnected,
}

/// Session lifecycle events.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A session was established.
    Connected(Session),
    /// The active session ended.
    Invalidated(InvalidationReason),
}

/// Holds the wallet session, if any.
///
/// A session is established by [`WalletSession::connect`] and invalidated when the provider
/// reports an account or chain change, see [`WalletSession::spawn_event_listener`].
#[derive(Debug)]
pub struct WalletSession {
    provider: Option<Arc<dyn WalletProvider>>,
    current: RwLock<Option<Session>>,
    events: broadcast::Sender<SessionEvent>,
}

impl WalletSession {
    /// Creates a disconnected session over the injected provider, if any.
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self { provider, current: RwLock::default(), events }
    }

    /// The injected provider, if any.
    pub fn provider(&self) -> Option<&Arc<dyn WalletProvider>> {
        self.provider.as_ref()
    }

    /// Requests account access and establishes a session.
    ///
    /// On failure, the previous session, if any, is left untouched.
    #[instrument(skip_all)]
    pub async fn connect(&self) -> Result<Session, WalletError> {
        let provider = self.provider.as_ref().ok_or(WalletError::WalletNotFound)?;

        let accounts = provider.request_accounts().await.map_err(|err| {
            if err.is_user_rejection() { WalletError::AccountAccessDenied } else { err.into() }
        })?;
        let account = accounts.first().copied().ok_or(WalletError::AccountAccessDenied)?;
        let chain_id = provider.chain_id().await?;

        let session = Session {
            account,
            chain_id,
            signer: SigningHandle { provider: provider.clone(), from: account },
        };
        *self.current.write().await = Some(session.clone());
        let _ = self.events.send(SessionEvent::Connected(session.clone()));

        info!(%account, chain_id, "Wallet connected");
        Ok(session)
    }

    /// Ends the active session.
    pub async fn disconnect(&self) {
        self.invalidate(InvalidationReason::Disconnected).await;
    }

    /// Returns the active session, if any.
    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    /// Returns the active session, or [`WalletError::NoSession`].
    pub async fn require(&self) -> Result<Session, WalletError> {
        self.current().await.ok_or(WalletError::NoSession)
    }

    /// Subscribes to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Spawns a task that applies provider events to the session.
    ///
    /// Returns `None` if there is no provider. The task ends once the session is dropped or the
    /// provider stops emitting events.
    pub fn spawn_event_listener(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let mut events = self.provider.as_ref()?.subscribe();
        let this = Arc::downgrade(self);
        Some(tokio::spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Missed provider events, ending session");
                        ProviderEvent::Disconnect
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let Some(session) = Weak::upgrade(&this) else { break };
                session.on_provider_event(event).await;
            }
        }))
    }

    /// Applies a provider event to the session.
    pub async fn on_provider_event(&self, event: ProviderEvent) {
        let Some(session) = self.current().await else { return };
        let reason = match event {
            ProviderEvent::AccountsChanged(accounts) => {
                if accounts.first() == Some(&session.account) {
                    return;
                }
                InvalidationReason::AccountsChanged
            }
            ProviderEvent::ChainChanged(chain_id) => {
                if chain_id == session.chain_id {
                    return;
                }
                InvalidationReason::ChainChanged(chain_id)
            }
            ProviderEvent::Disconnect => InvalidationReason::Disconnected,
        };
        self.invalidate(reason).await;
    }

    async fn invalidate(&self, reason: InvalidationReason) {
        if self.current.write().await.take().is_some() {
            debug!(?reason, "Wallet session invalidated");
            let _ = self.events.send(SessionEvent::Invalidated(reason));
        }
    }
}
