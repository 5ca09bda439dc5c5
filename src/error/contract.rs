use alloy::transports::TransportError;

use crate::transport::error::WalletErrorExt;

/// Errors returned by the payment processor client.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    /// The wallet declined to sign or the provider refused the transaction.
    #[error("submission rejected: {0}")]
    SubmissionRejected(String),
    /// The account cannot cover the transaction value and fees.
    #[error("insufficient funds")]
    InsufficientFunds,
    /// A read call failed or returned undecodable data.
    #[error("contract read unavailable: {0}")]
    ReadUnavailable(String),
}

impl ContractError {
    /// Classifies an error returned while submitting a transaction.
    pub fn from_submission(err: TransportError) -> Self {
        if err.is_insufficient_funds() {
            Self::InsufficientFunds
        } else if err.is_user_rejection() {
            Self::SubmissionRejected("user rejected the request".to_string())
        } else {
            Self::SubmissionRejected(err.to_string())
        }
    }

    /// Wraps an error returned by a read call.
    pub fn read(err: impl std::fmt::Display) -> Self {
        Self::ReadUnavailable(err.to_string())
    }
}
