//! Payable amount computation and native price lookup.

mod calculator;
pub use calculator::{PriceCalculator, compute_payable, native_amount, to_smallest_unit};

mod feed;
pub use feed::ChainlinkFeed;

mod metrics;

mod oracle;
pub use oracle::{PriceOracle, PriceOracleConfig};

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::fmt::Debug;

/// A source for the fiat price of one native coin.
#[async_trait]
pub trait NativeRate: Debug + Send + Sync {
    /// Returns the fiat price of one native coin, if known.
    async fn fiat_per_native(&self) -> Option<Decimal>;
}

/// A fixed native price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantRate(pub Decimal);

#[async_trait]
impl NativeRate for ConstantRate {
    async fn fiat_per_native(&self) -> Option<Decimal> {
        Some(self.0)
    }
}

#[async_trait]
impl NativeRate for Option<Decimal> {
    async fn fiat_per_native(&self) -> Option<Decimal> {
        *self
    }
}
