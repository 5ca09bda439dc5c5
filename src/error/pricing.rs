//! Pricing-specific error types.

use alloy::primitives::U256;
use rust_decimal::Decimal;

/// Errors that can occur while computing payable amounts.
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    /// The nominal amount is not positive.
    #[error("invalid amount: {0}")]
    InvalidAmount(Decimal),
    /// The discount percentage is outside `0..=100`.
    #[error("invalid discount: {0}%")]
    InvalidDiscount(U256),
    /// No usable native conversion rate is available.
    #[error("native price unavailable")]
    PriceUnavailable,
    /// The amount does not fit the smallest-unit representation.
    #[error("amount overflow: {0}")]
    AmountOverflow(Decimal),
}
