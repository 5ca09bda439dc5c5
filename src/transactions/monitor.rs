use super::TransactionStatus;
use crate::{
    error::TransactionError,
    wallet::{Receipt, WalletProvider},
};
use alloy::primitives::B256;
use std::{sync::Arc, time::Duration};
use tracing::{debug, instrument, trace, warn};

/// Polls the wallet provider for transaction receipts.
#[derive(Debug, Clone)]
pub struct ReceiptMonitor {
    provider: Arc<dyn WalletProvider>,
    poll_interval: Duration,
}

impl ReceiptMonitor {
    /// Creates a new [`ReceiptMonitor`].
    pub fn new(provider: Arc<dyn WalletProvider>, poll_interval: Duration) -> Self {
        Self { provider, poll_interval }
    }

    /// Returns the current status of a transaction.
    ///
    /// Errors fetching the receipt are reported as pending.
    pub async fn status(&self, tx_hash: B256) -> TransactionStatus {
        match self.provider.transaction_receipt(tx_hash).await {
            Ok(Some(receipt)) => receipt.into(),
            Ok(None) => TransactionStatus::Pending(tx_hash),
            Err(err) => {
                warn!(%tx_hash, %err, "Failed to fetch transaction receipt");
                TransactionStatus::Pending(tx_hash)
            }
        }
    }

    /// Waits until a transaction is included, for at most `timeout`.
    ///
    /// Returns [`TransactionError::Reverted`] if the receipt reports a failed execution and
    /// [`TransactionError::Timeout`] if no receipt arrived in time.
    #[instrument(skip(self))]
    pub async fn watch_transaction(
        &self,
        tx_hash: B256,
        timeout: Duration,
    ) -> Result<Receipt, TransactionError> {
        let poll = async {
            let mut interval = tokio::time::interval(self.poll_interval);
            loop {
                interval.tick().await;
                match self.status(tx_hash).await {
                    TransactionStatus::Pending(_) => trace!("Transaction not yet included"),
                    TransactionStatus::Confirmed(receipt) => return Ok(receipt),
                    TransactionStatus::Reverted(_) => return Err(TransactionError::Reverted(tx_hash)),
                }
            }
        };

        let result = tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| TransactionError::Timeout { tx_hash, timeout })?;
        debug!(ok = result.is_ok(), "Transaction included");
        result
    }
}
