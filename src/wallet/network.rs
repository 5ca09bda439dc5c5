use super::{AddChainParams, WalletProvider};
use crate::{config::NetworkConfig, error::WalletError, transport::error::WalletErrorExt};
use alloy::transports::TransportError;
use alloy_chains::Chain;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Keeps the wallet attached to the configured network.
#[derive(Debug, Clone)]
pub struct NetworkAdapter {
    provider: Arc<dyn WalletProvider>,
    network: NetworkConfig,
}

impl NetworkAdapter {
    /// Creates a new adapter requiring `network`.
    pub fn new(provider: Arc<dyn WalletProvider>, network: NetworkConfig) -> Self {
        Self { provider, network }
    }

    /// The required network.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Ensures the wallet is attached to the required network.
    ///
    /// If the wallet is on another chain a switch is requested. If the wallet does not know the
    /// chain, it is added and the switch is retried once.
    #[instrument(skip_all, fields(chain_id = self.network.chain_id))]
    pub async fn ensure_network(&self) -> Result<(), WalletError> {
        let required = self.network.chain_id;
        let current = self.provider.chain_id().await.map_err(|err| self.unavailable(err))?;
        if current == required {
            return Ok(());
        }

        debug!(current = %Chain::from_id(current), "Requesting network switch");
        match self.provider.switch_chain(required).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_unrecognized_chain() => {
                info!(chain = %self.network.chain_name, "Network unknown to wallet, adding it");
                self.provider
                    .add_chain(&AddChainParams::from(&self.network))
                    .await
                    .map_err(|err| self.unavailable(err))?;
                self.provider.switch_chain(required).await.map_err(|err| self.unavailable(err))
            }
            Err(err) => Err(self.unavailable(err)),
        }
    }

    fn unavailable(&self, err: TransportError) -> WalletError {
        WalletError::NetworkUnavailable { chain_id: self.network.chain_id, reason: err.to_string() }
    }
}
