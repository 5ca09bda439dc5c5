use super::{AddChainParams, ProviderEvent, Receipt, SwitchChainParams, WalletProvider};
use alloy::{
    primitives::{Address, B256, Bytes, ChainId, U64, U256},
    providers::{DynProvider, Provider},
    rpc::types::{Filter, Log, TransactionRequest},
    transports::TransportResult,
};
use async_trait::async_trait;
use std::time::Duration;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{debug, warn};

/// Capacity of the provider event channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// A [`WalletProvider`] backed by a JSON-RPC endpoint.
///
/// When constructed with a local signer address, account access is granted without a prompt and
/// transactions are signed by the provider's wallet filler. Otherwise account access and chain
/// management requests are forwarded to the endpoint, which is expected to be wallet-aware.
#[derive(Debug, Clone)]
pub struct RpcWallet {
    provider: DynProvider,
    signer: Option<Address>,
    events: broadcast::Sender<ProviderEvent>,
}

impl RpcWallet {
    /// Creates a new wallet over `provider`.
    pub fn new(provider: DynProvider, signer: Option<Address>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { provider, signer, events }
    }

    fn notify(&self, event: ProviderEvent) {
        let _ = self.events.send(event);
    }

    /// Spawns a task polling the endpoint's chain id and emitting
    /// [`ProviderEvent::ChainChanged`] when it changes.
    pub fn spawn_chain_watcher(&self, interval: Duration) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(interval);
            let mut last = None;
            loop {
                interval.tick().await;
                match this.provider.get_chain_id().await {
                    Ok(chain_id) => {
                        if last.is_some_and(|last| last != chain_id) {
                            debug!(chain_id, "Endpoint chain changed");
                            this.notify(ProviderEvent::ChainChanged(chain_id));
                        }
                        last = Some(chain_id);
                    }
                    Err(err) => warn!(%err, "Failed to poll chain id"),
                }
            }
        })
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    async fn request_accounts(&self) -> TransportResult<Vec<Address>> {
        if let Some(signer) = self.signer {
            return Ok(vec![signer]);
        }
        self.provider.raw_request("eth_requestAccounts".into(), ()).await
    }

    async fn chain_id(&self) -> TransportResult<ChainId> {
        self.provider.get_chain_id().await
    }

    async fn switch_chain(&self, chain_id: ChainId) -> TransportResult<()> {
        let params = SwitchChainParams { chain_id: U64::from(chain_id) };
        let _: serde_json::Value =
            self.provider.raw_request("wallet_switchEthereumChain".into(), (params,)).await?;
        Ok(())
    }

    async fn add_chain(&self, params: &AddChainParams) -> TransportResult<()> {
        let _: serde_json::Value =
            self.provider.raw_request("wallet_addEthereumChain".into(), (params,)).await?;
        Ok(())
    }

    async fn call(&self, tx: TransactionRequest) -> TransportResult<Bytes> {
        self.provider.call(tx).await
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> TransportResult<B256> {
        let pending = self.provider.send_transaction(tx).await?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> TransportResult<Option<Receipt>> {
        Ok(self.provider.get_transaction_receipt(tx_hash).await?.as_ref().map(Receipt::from))
    }

    async fn balance(&self, address: Address) -> TransportResult<U256> {
        self.provider.get_balance(address).await
    }

    async fn logs(&self, filter: &Filter) -> TransportResult<Vec<Log>> {
        self.provider.get_logs(filter).await
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}
