use super::NativeRate;
use crate::{
    error::PricingError,
    types::{DiscountRate, PayAsset},
};
use alloy::primitives::U256;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;

/// Applies `discount` to `nominal`: `nominal * (100 - discount) / 100`.
///
/// Exact decimal arithmetic is used throughout. The result never exceeds `nominal`.
pub fn compute_payable(nominal: Decimal, discount: DiscountRate) -> Result<Decimal, PricingError> {
    if nominal.is_sign_negative() && !nominal.is_zero() {
        return Err(PricingError::InvalidAmount(nominal));
    }
    nominal
        .checked_mul(Decimal::from(100 - discount.percent()))
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .ok_or(PricingError::AmountOverflow(nominal))
}

/// Converts a fiat amount to native coins at `fiat_per_native`.
pub fn native_amount(fiat: Decimal, fiat_per_native: Decimal) -> Result<Decimal, PricingError> {
    if fiat_per_native <= Decimal::ZERO {
        return Err(PricingError::PriceUnavailable);
    }
    fiat.checked_div(fiat_per_native).ok_or(PricingError::AmountOverflow(fiat))
}

/// Converts a decimal amount to the smallest unit of an asset with `decimals` decimals.
///
/// Fractions below the smallest unit are rounded half away from zero.
pub fn to_smallest_unit(amount: Decimal, decimals: u8) -> Result<U256, PricingError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PricingError::InvalidAmount(amount));
    }
    let rounded =
        amount.round_dp_with_strategy(decimals as u32, RoundingStrategy::MidpointAwayFromZero);
    let exponent = (decimals as u32).saturating_sub(rounded.scale());

    U256::from(10)
        .checked_pow(U256::from(exponent))
        .and_then(|factor| U256::from(rounded.mantissa().unsigned_abs()).checked_mul(factor))
        .ok_or(PricingError::AmountOverflow(amount))
}

/// Computes the amount to submit for a payment.
#[derive(Debug, Clone)]
pub struct PriceCalculator {
    rate: Arc<dyn NativeRate>,
    native_decimals: u8,
}

impl PriceCalculator {
    /// Create a new instance of [`Self`].
    pub fn new(rate: Arc<dyn NativeRate>, native_decimals: u8) -> Self {
        Self { rate, native_decimals }
    }

    /// Returns the discounted amount in the smallest unit of `asset`.
    ///
    /// Nominal amounts are denominated in fiat. Token amounts map one to one to token units, while
    /// native amounts are converted at the current native price.
    pub async fn payable_amount(
        &self,
        nominal: Decimal,
        discount: DiscountRate,
        asset: &PayAsset,
    ) -> Result<U256, PricingError> {
        let discounted = compute_payable(nominal, discount)?;
        match asset {
            PayAsset::Native => {
                let rate = self.rate.fiat_per_native().await.ok_or(PricingError::PriceUnavailable)?;
                to_smallest_unit(native_amount(discounted, rate)?, self.native_decimals)
            }
            PayAsset::Token(token) => to_smallest_unit(discounted, token.decimals),
        }
    }
}
