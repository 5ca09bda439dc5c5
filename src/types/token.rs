use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fungible token accepted for payments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    /// Token address.
    pub address: Address,
    /// Token symbol.
    pub symbol: String,
    /// Token decimals.
    pub decimals: u8,
}

impl TokenDescriptor {
    /// Create a new instance of [`Self`].
    pub fn new(address: Address, symbol: impl Into<String>, decimals: u8) -> Self {
        Self { address, symbol: symbol.into(), decimals }
    }
}

/// The asset a payment is made in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayAsset {
    /// The native coin of the chain.
    Native,
    /// A configured ERC-20 token.
    Token(TokenDescriptor),
}

impl PayAsset {
    /// Returns the token descriptor, if any.
    pub fn token(&self) -> Option<&TokenDescriptor> {
        match self {
            Self::Native => None,
            Self::Token(token) => Some(token),
        }
    }
}

impl fmt::Display for PayAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str("native"),
            Self::Token(token) => f.write_str(&token.symbol),
        }
    }
}
