//! Helpers for classifying wallet provider errors.

use crate::constants::{UNRECOGNIZED_CHAIN_CODE, USER_REJECTED_REQUEST_CODE};
use alloy::transports::TransportError;

/// An extension trait for [`TransportError`]s returned by wallet providers.
pub trait WalletErrorExt {
    /// Returns true if the user rejected the request ([EIP-1193] code `4001`).
    ///
    /// [EIP-1193]: https://eips.ethereum.org/EIPS/eip-1193#provider-errors
    fn is_user_rejection(&self) -> bool;

    /// Returns true if the wallet does not know the requested chain (code `4902`), which means the
    /// chain has to be added before switching to it.
    fn is_unrecognized_chain(&self) -> bool;

    /// Returns true if the node rejected the transaction because the sender cannot pay for it.
    fn is_insufficient_funds(&self) -> bool;
}

impl WalletErrorExt for TransportError {
    fn is_user_rejection(&self) -> bool {
        self.as_error_resp().is_some_and(|err| err.code == USER_REJECTED_REQUEST_CODE)
    }

    fn is_unrecognized_chain(&self) -> bool {
        self.as_error_resp().is_some_and(|err| err.code == UNRECOGNIZED_CHAIN_CODE)
    }

    fn is_insufficient_funds(&self) -> bool {
        // geth: "insufficient funds for gas * price + value"
        // reth: "insufficient funds for gas * price + value: have 0 want 1"
        self.as_error_resp()
            .is_some_and(|err| err.message.to_lowercase().contains("insufficient funds"))
    }
}
