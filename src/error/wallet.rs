use alloy::{primitives::ChainId, transports::TransportError};

/// Errors related to the wallet provider, session and network.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// No wallet provider was injected.
    #[error("no wallet provider found")]
    WalletNotFound,
    /// The user rejected the account access request, or no account was returned.
    #[error("account access denied")]
    AccountAccessDenied,
    /// There is no connected account.
    #[error("no active wallet session")]
    NoSession,
    /// The wallet could not be attached to the required network.
    #[error("network {chain_id} unavailable: {reason}")]
    NetworkUnavailable {
        /// The required chain.
        chain_id: ChainId,
        /// Why switching or adding the chain failed.
        reason: String,
    },
    /// An error occurred talking to the wallet provider.
    #[error(transparent)]
    Rpc(#[from] TransportError),
}
