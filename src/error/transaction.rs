use alloy::primitives::B256;
use std::time::Duration;

/// Errors that may occur while waiting for a transaction to confirm.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// The receipt reports a failed execution.
    #[error("transaction {0} reverted")]
    Reverted(B256),
    /// No receipt arrived within the configured wait bound.
    #[error("no receipt for transaction {tx_hash} after {}s", timeout.as_secs())]
    Timeout {
        /// The submitted transaction.
        tx_hash: B256,
        /// The wait bound that elapsed.
        timeout: Duration,
    },
}
