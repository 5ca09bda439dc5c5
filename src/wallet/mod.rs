//! Wallet provider capability, session and network handling.
//!
//! The wallet provider is injected explicitly as a [`WalletProvider`] trait object, mirroring the
//! request surface of an [EIP-1193] provider.
//!
//! [EIP-1193]: https://eips.ethereum.org/EIPS/eip-1193

use crate::config::{NativeCurrency, NetworkConfig};
use alloy::{
    network::ReceiptResponse,
    primitives::{Address, B256, Bytes, ChainId, U64, U256},
    rpc::types::{Filter, Log, TransactionReceipt, TransactionRequest},
    transports::TransportResult,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tokio::sync::broadcast;
use url::Url;

mod memory;
pub use memory::{InMemoryWallet, ReceiptMode};

mod network;
pub use network::NetworkAdapter;

mod rpc;
pub use rpc::RpcWallet;

mod session;
pub use session::{InvalidationReason, Session, SessionEvent, SigningHandle, WalletSession};

/// Events emitted by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// The exposed accounts changed. The first account is the selected one.
    AccountsChanged(Vec<Address>),
    /// The wallet switched to another chain.
    ChainChanged(ChainId),
    /// The provider lost its connection.
    Disconnect,
}

/// Parameters of `wallet_addEthereumChain`, as defined by [EIP-3085].
///
/// [EIP-3085]: https://eips.ethereum.org/EIPS/eip-3085
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    /// Chain id, hex encoded.
    pub chain_id: U64,
    /// Human readable chain name.
    pub chain_name: String,
    /// The native currency of the chain.
    pub native_currency: NativeCurrency,
    /// RPC endpoints.
    pub rpc_urls: Vec<Url>,
    /// Block explorers.
    pub block_explorer_urls: Vec<Url>,
}

impl From<&NetworkConfig> for AddChainParams {
    fn from(network: &NetworkConfig) -> Self {
        Self {
            chain_id: U64::from(network.chain_id),
            chain_name: network.chain_name.clone(),
            native_currency: network.native_currency.clone(),
            rpc_urls: vec![network.rpc_url.clone()],
            block_explorer_urls: vec![network.explorer_url.clone()],
        }
    }
}

/// Parameters of `wallet_switchEthereumChain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchChainParams {
    /// Chain id, hex encoded.
    pub chain_id: U64,
}

/// The parts of a transaction receipt the client acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    /// Hash of the transaction.
    pub transaction_hash: B256,
    /// Block the transaction was included in.
    pub block_number: Option<u64>,
    /// Gas used by the transaction.
    pub gas_used: u64,
    /// Whether the transaction executed successfully.
    pub success: bool,
}

impl From<&TransactionReceipt> for Receipt {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash(),
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
            success: receipt.status(),
        }
    }
}

/// An injected wallet provider.
///
/// Errors are returned as JSON-RPC errors, see
/// [`WalletErrorExt`](crate::transport::error::WalletErrorExt) for classifying them.
#[async_trait]
pub trait WalletProvider: Debug + Send + Sync {
    /// Requests access to the user's accounts (`eth_requestAccounts`).
    async fn request_accounts(&self) -> TransportResult<Vec<Address>>;

    /// Returns the chain the wallet is currently attached to.
    async fn chain_id(&self) -> TransportResult<ChainId>;

    /// Asks the wallet to switch to `chain_id` (`wallet_switchEthereumChain`).
    async fn switch_chain(&self, chain_id: ChainId) -> TransportResult<()>;

    /// Asks the wallet to register a chain (`wallet_addEthereumChain`).
    async fn add_chain(&self, params: &AddChainParams) -> TransportResult<()>;

    /// Executes a read-only call (`eth_call`).
    async fn call(&self, tx: TransactionRequest) -> TransportResult<Bytes>;

    /// Signs and submits a transaction, returning its hash.
    async fn send_transaction(&self, tx: TransactionRequest) -> TransportResult<B256>;

    /// Returns the receipt of a transaction, if it has been included.
    async fn transaction_receipt(&self, tx_hash: B256) -> TransportResult<Option<Receipt>>;

    /// Returns the native balance of an address.
    async fn balance(&self, address: Address) -> TransportResult<U256>;

    /// Returns the logs matching `filter`.
    async fn logs(&self, filter: &Filter) -> TransportResult<Vec<Log>>;

    /// Subscribes to provider events.
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}
