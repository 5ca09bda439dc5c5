//! Price metrics

use metrics::{Counter, Gauge};
use metrics_derive::Metrics;

/// Metrics for the native price.
#[derive(Metrics)]
#[metrics(scope = "oracle")]
pub struct NativeRateMetrics {
    /// Last received fiat price of the native coin.
    pub rate: Gauge,
    /// Lookups that found an expired rate.
    pub expired_hits: Counter,
}
