//! RPC transport used to reach the wallet provider.

use alloy::{
    network::EthereumWallet,
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::client::ClientBuilder,
    signers::local::PrivateKeySigner,
    transports::layers::RetryBackoffLayer,
};
use std::time::Duration;
use url::Url;

pub mod error;

mod timeout;
pub use timeout::{TimeoutLayer, TimeoutService};

/// [`RetryBackoffLayer`] used for wallet providers.
///
/// Only rate limited requests are retried, with at most 5 retries and a backoff of 500ms. Wallet
/// errors such as rejected prompts are never retried.
pub const RETRY_LAYER: RetryBackoffLayer = RetryBackoffLayer::new(5, 500, u64::MAX);

/// Connects to a JSON-RPC wallet endpoint over HTTP.
///
/// If a signer is given, transactions are signed locally and submitted as raw transactions.
/// Otherwise the endpoint is expected to sign `eth_sendTransaction` requests itself.
pub fn connect_http(
    endpoint: Url,
    request_timeout: Duration,
    signer: Option<PrivateKeySigner>,
) -> DynProvider {
    let client = ClientBuilder::default()
        .layer(RETRY_LAYER)
        .layer(TimeoutLayer::new(request_timeout))
        .http(endpoint);

    match signer {
        Some(signer) => ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_client(client)
            .erased(),
        None => ProviderBuilder::new().connect_client(client).erased(),
    }
}
