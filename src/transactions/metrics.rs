use metrics::{Counter, Histogram};
use metrics_derive::Metrics;

/// Metrics for a [`PaymentOrchestrator`](crate::orchestrator::PaymentOrchestrator).
#[derive(Metrics)]
#[metrics(scope = "payments")]
pub struct PaymentMetrics {
    /// Number of started payment attempts.
    pub attempts: Counter,
    /// Number of submitted payment transactions.
    pub submitted: Counter,
    /// Number of confirmed payments.
    pub confirmed: Counter,
    /// Number of failed payment attempts.
    pub failed: Counter,
    /// Number of reverted payment transactions.
    pub reverted: Counter,
    /// Time it takes to confirm a submitted payment, in milliseconds.
    pub confirmation_time: Histogram,
}
