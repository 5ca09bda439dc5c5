//! Transaction tracking.

mod metrics;
pub use metrics::PaymentMetrics;

mod monitor;
pub use monitor::ReceiptMonitor;

mod transaction;
pub use transaction::{PendingTransaction, TransactionStatus};
