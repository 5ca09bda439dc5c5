//! Payflow error types.
use alloy::primitives::{Address, U256};
use thiserror::Error;

mod contract;
pub use contract::ContractError;

mod pricing;
pub use pricing::PricingError;

mod transaction;
pub use transaction::TransactionError;

mod wallet;
pub use wallet::WalletError;

/// The overarching error type returned by a payment attempt.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Errors related to the wallet session or network.
    #[error(transparent)]
    Wallet(#[from] WalletError),
    /// Errors related to amount and discount computation.
    #[error(transparent)]
    Pricing(#[from] PricingError),
    /// Errors related to contract calls.
    #[error(transparent)]
    Contract(#[from] ContractError),
    /// Errors related to transaction confirmation.
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    /// Another payment is already in flight for this session.
    #[error("a payment is already in flight for this session")]
    PaymentInProgress,
    /// The token is not configured.
    #[error("unsupported token {0}")]
    UnsupportedToken(String),
    /// The token allowance granted to the payment processor does not cover the payment.
    #[error("allowance of {allowance} for token {token} does not cover {required}")]
    InsufficientAllowance {
        /// The token being paid with.
        token: Address,
        /// The current allowance.
        allowance: U256,
        /// The amount to be paid.
        required: U256,
    },
}

impl PaymentError {
    /// Whether the attempt failed before anything was submitted on-chain.
    pub fn is_pre_submission(&self) -> bool {
        !matches!(self, Self::Transaction(_))
    }
}
