use crate::wallet::Receipt;
use alloy::primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};

/// A transaction that has been submitted through the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransaction {
    /// Hash of the transaction.
    pub tx_hash: B256,
    /// The sending account.
    pub from: Address,
    /// Destination of the transaction.
    pub to: Address,
    /// Native value attached to the transaction.
    pub value: U256,
    /// Time at which the wallet accepted the transaction.
    pub submitted_at: DateTime<Utc>,
}

/// Status of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Waiting for inclusion.
    Pending(B256),
    /// Included and executed successfully.
    Confirmed(Receipt),
    /// Included and reverted.
    Reverted(Receipt),
}

impl From<Receipt> for TransactionStatus {
    fn from(receipt: Receipt) -> Self {
        if receipt.success { Self::Confirmed(receipt) } else { Self::Reverted(receipt) }
    }
}
