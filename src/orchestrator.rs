//! Payment orchestration.
//!
//! A payment attempt walks through the following states, in order:
//!
//! `Idle -> SessionChecked -> NetworkChecked -> AmountComputed -> Submitted -> Confirmed`
//!
//! Any step may fail, which ends the attempt in `Failed`. Only one attempt may be in flight at a
//! time; concurrent attempts are rejected with [`PaymentError::PaymentInProgress`].

use crate::{
    client::PaymentProcessorClient,
    error::{PaymentError, PricingError},
    price::PriceCalculator,
    transactions::{PaymentMetrics, ReceiptMonitor},
    types::{DiscountRate, PayAsset, PendingPayment, TokenDescriptor},
    wallet::{NetworkAdapter, Session, WalletSession},
};
use alloy::primitives::{Address, B256};
use rust_decimal::Decimal;
use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, instrument, warn};

/// State of a payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentState {
    /// The attempt has been accepted.
    Idle,
    /// An account is connected.
    SessionChecked,
    /// The wallet is attached to the required network.
    NetworkChecked,
    /// The discounted amount has been computed.
    AmountComputed,
    /// The payment transaction has been submitted.
    Submitted,
    /// The payment transaction has been confirmed.
    Confirmed,
    /// The attempt failed.
    Failed,
}

impl PaymentState {
    /// The state following `self` on success, if any.
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::SessionChecked),
            Self::SessionChecked => Some(Self::NetworkChecked),
            Self::NetworkChecked => Some(Self::AmountComputed),
            Self::AmountComputed => Some(Self::Submitted),
            Self::Submitted => Some(Self::Confirmed),
            Self::Confirmed | Self::Failed => None,
        }
    }

    /// Whether the attempt has ended.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A state transition of a payment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentStateChange {
    /// Sequence number of the attempt.
    pub attempt: u64,
    /// The state entered.
    pub state: PaymentState,
    /// The payment transaction, once submitted.
    pub tx_hash: Option<B256>,
}

/// A request to pay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    /// Nominal amount, in fiat.
    pub amount: Decimal,
    /// Asset to pay with.
    pub asset: PayAsset,
}

impl PaymentRequest {
    /// A native payment of `amount`.
    pub fn native(amount: Decimal) -> Self {
        Self { amount, asset: PayAsset::Native }
    }

    /// A token payment of `amount`.
    pub fn token(amount: Decimal, token: TokenDescriptor) -> Self {
        Self { amount, asset: PayAsset::Token(token) }
    }
}

/// A confirmed payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentOutcome {
    /// The paying account.
    pub payer: Address,
    /// What was paid.
    pub payment: PendingPayment,
    /// Hash of the payment transaction.
    pub tx_hash: B256,
    /// Block the payment was included in.
    pub block_number: Option<u64>,
    /// Explorer link of the payment transaction.
    pub explorer_url: String,
}

/// Publishes the states of one attempt, enforcing their order.
struct AttemptTracker<'a> {
    attempt: u64,
    state: PaymentState,
    tx_hash: Option<B256>,
    events: &'a broadcast::Sender<PaymentStateChange>,
}

impl<'a> AttemptTracker<'a> {
    fn new(attempt: u64, events: &'a broadcast::Sender<PaymentStateChange>) -> Self {
        let tracker = Self { attempt, state: PaymentState::Idle, tx_hash: None, events };
        tracker.publish();
        tracker
    }

    fn advance(&mut self, state: PaymentState) {
        debug_assert_eq!(self.state.next(), Some(state), "out of order payment state");
        self.state = state;
        self.publish();
    }

    fn submitted(&mut self, tx_hash: B256) {
        self.tx_hash = Some(tx_hash);
        self.advance(PaymentState::Submitted);
    }

    fn fail(&mut self) {
        if !self.state.is_final() {
            self.state = PaymentState::Failed;
            self.publish();
        }
    }

    fn publish(&self) {
        debug!(attempt = self.attempt, state = %self.state, "Payment state changed");
        let _ = self.events.send(PaymentStateChange {
            attempt: self.attempt,
            state: self.state,
            tx_hash: self.tx_hash,
        });
    }
}

/// Drives payment attempts from session check to confirmation.
#[derive(Debug)]
pub struct PaymentOrchestrator {
    session: Arc<WalletSession>,
    network: NetworkAdapter,
    client: PaymentProcessorClient,
    calculator: PriceCalculator,
    monitor: ReceiptMonitor,
    receipt_timeout: Duration,
    in_flight: Mutex<()>,
    attempts: AtomicU64,
    events: broadcast::Sender<PaymentStateChange>,
    metrics: PaymentMetrics,
}

impl PaymentOrchestrator {
    /// Create a new instance of [`Self`].
    pub fn new(
        session: Arc<WalletSession>,
        network: NetworkAdapter,
        client: PaymentProcessorClient,
        calculator: PriceCalculator,
        monitor: ReceiptMonitor,
        receipt_timeout: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            session,
            network,
            client,
            calculator,
            monitor,
            receipt_timeout,
            in_flight: Mutex::new(()),
            attempts: AtomicU64::new(0),
            events,
            metrics: PaymentMetrics::default(),
        }
    }

    /// Subscribes to state transitions of all attempts.
    pub fn subscribe(&self) -> broadcast::Receiver<PaymentStateChange> {
        self.events.subscribe()
    }

    /// Runs a payment attempt to completion.
    ///
    /// Failures before submission leave nothing on-chain. Failures after submission carry the
    /// transaction hash.
    #[instrument(skip(self), fields(amount = %request.amount, asset = %request.asset))]
    pub async fn pay(&self, request: PaymentRequest) -> Result<PaymentOutcome, PaymentError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            warn!("Rejecting payment, another attempt is in flight");
            return Err(PaymentError::PaymentInProgress);
        };

        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed) + 1;
        self.metrics.attempts.increment(1);
        let mut tracker = AttemptTracker::new(attempt, &self.events);

        match self.run(&mut tracker, request).await {
            Ok(outcome) => {
                info!(tx_hash = %outcome.tx_hash, payable = %outcome.payment.payable, "Payment confirmed");
                self.metrics.confirmed.increment(1);
                Ok(outcome)
            }
            Err(err) => {
                warn!(%err, state = %tracker.state, "Payment failed");
                self.metrics.failed.increment(1);
                tracker.fail();
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        tracker: &mut AttemptTracker<'_>,
        request: PaymentRequest,
    ) -> Result<PaymentOutcome, PaymentError> {
        let session = self.session.require().await?;
        tracker.advance(PaymentState::SessionChecked);

        self.network.ensure_network().await?;
        tracker.advance(PaymentState::NetworkChecked);

        let payment = self.prepare(&session, request).await?;
        tracker.advance(PaymentState::AmountComputed);

        let pending = match &payment.asset {
            PayAsset::Native => self.client.pay_native(&session.signer, payment.payable).await?,
            PayAsset::Token(token) => {
                self.client.pay_with_token(&session.signer, token.address, payment.payable).await?
            }
        };
        self.metrics.submitted.increment(1);
        tracker.submitted(pending.tx_hash);

        let started = Instant::now();
        let receipt = self
            .monitor
            .watch_transaction(pending.tx_hash, self.receipt_timeout)
            .await
            .inspect_err(|err| {
                if matches!(err, crate::error::TransactionError::Reverted(_)) {
                    self.metrics.reverted.increment(1);
                }
            })?;
        self.metrics.confirmation_time.record(started.elapsed().as_millis() as f64);
        tracker.advance(PaymentState::Confirmed);

        Ok(PaymentOutcome {
            payer: session.account,
            explorer_url: self.network.network().tx_url(pending.tx_hash),
            payment,
            tx_hash: pending.tx_hash,
            block_number: receipt.block_number,
        })
    }

    /// Computes what `session` has to pay for `request`.
    async fn prepare(
        &self,
        session: &Session,
        request: PaymentRequest,
    ) -> Result<PendingPayment, PaymentError> {
        if request.amount <= Decimal::ZERO {
            return Err(PricingError::InvalidAmount(request.amount).into());
        }

        let discount = DiscountRate::try_from(self.client.get_discount(session.account).await?)?;
        let payable =
            self.calculator.payable_amount(request.amount, discount, &request.asset).await?;
        debug!(%discount, %payable, "Computed payable amount");

        if let PayAsset::Token(token) = &request.asset {
            let allowance = self.client.token_allowance(token.address, session.account).await?;
            if allowance < payable {
                return Err(PaymentError::InsufficientAllowance {
                    token: token.address,
                    allowance,
                    required: payable,
                });
            }
        }

        Ok(PendingPayment {
            amount_requested: request.amount,
            asset: request.asset,
            discount_applied: discount,
            payable,
        })
    }
}
