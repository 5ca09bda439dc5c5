use super::{NativeRate, metrics::NativeRateMetrics};
use async_trait::async_trait;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use std::time::Duration;
use tokio::{
    sync::{mpsc, oneshot},
    time::Instant,
};
use tracing::trace;

/// Native price taken at a certain timestamp.
#[derive(Debug, Clone, Copy)]
struct RateTick {
    rate: Decimal,
    timestamp: Instant,
}

/// Messages used by the price oracle task.
#[derive(Debug)]
enum PriceOracleMessage {
    /// Message to update the native price.
    Update { rate: Decimal, timestamp: Instant },
    /// Message to lookup the native price.
    Lookup { tx: oneshot::Sender<Option<Decimal>> },
}

/// Configuration for the price oracle.
#[derive(Debug, Clone)]
pub struct PriceOracleConfig {
    /// Duration after which a rate is considered expired.
    pub rate_ttl: Duration,
}

impl Default for PriceOracleConfig {
    fn default() -> Self {
        Self { rate_ttl: Duration::from_secs(300) }
    }
}

/// Tracks the latest fiat price of the native coin.
///
/// Rates are pushed with [`PriceOracle::update`] and expire after
/// [`PriceOracleConfig::rate_ttl`]. Lookups that find no fresh rate fall back to the constant rate,
/// if one is set.
#[derive(Debug, Clone)]
pub struct PriceOracle {
    /// Channel sender to lookup and update the price.
    tx: mpsc::UnboundedSender<PriceOracleMessage>,
    /// Constant rate which will be the fallback on a lookup that does not return a price.
    constant_rate: Option<Decimal>,
}

impl Default for PriceOracle {
    fn default() -> Self {
        Self::new(Default::default())
    }
}

impl PriceOracle {
    /// Return a new [`PriceOracle`].
    pub fn new(config: PriceOracleConfig) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let metrics = NativeRateMetrics::default();
            let mut latest: Option<RateTick> = None;
            while let Some(message) = rx.recv().await {
                match message {
                    PriceOracleMessage::Update { rate, timestamp } => {
                        trace!(%rate, "Native price update");
                        metrics.rate.set(rate.to_f64().unwrap_or_default());
                        latest = Some(RateTick { rate, timestamp });
                    }
                    PriceOracleMessage::Lookup { tx } => {
                        let rate = latest
                            .filter(|tick| {
                                if tick.timestamp.elapsed() > config.rate_ttl {
                                    metrics.expired_hits.increment(1);
                                    false
                                } else {
                                    true
                                }
                            })
                            .map(|tick| tick.rate);
                        let _ = tx.send(rate);
                    }
                }
            }
        });

        Self { tx, constant_rate: None }
    }

    /// Returns [`Self`] with a constant rate to fallback to.
    pub fn with_constant_rate(mut self, rate: Option<Decimal>) -> Self {
        self.constant_rate = rate;
        self
    }

    /// Records a fresh native price.
    pub fn update(&self, rate: Decimal) {
        let _ = self.tx.send(PriceOracleMessage::Update { rate, timestamp: Instant::now() });
    }
}

#[async_trait]
impl NativeRate for PriceOracle {
    async fn fiat_per_native(&self) -> Option<Decimal> {
        let (req_tx, req_rx) = oneshot::channel();
        let _ = self.tx.send(PriceOracleMessage::Lookup { tx: req_tx });
        req_rx.await.ok().flatten().or(self.constant_rate)
    }
}
