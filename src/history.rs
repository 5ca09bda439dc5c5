//! Payment history.

use crate::{
    client::PaymentProcessorClient,
    error::{ContractError, PaymentError},
    types::{IPaymentProcessor, PaymentProcessedEvent, PaymentRecord},
    wallet::WalletSession,
};
use alloy::primitives::Address;
use std::sync::Arc;
use tracing::instrument;

/// Which payments to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentScope {
    /// Every payment recorded by the processor.
    All,
    /// The payments of the connected account.
    Mine,
}

/// Normalized payments, in contract order.
///
/// Entries the contract returned in an unknown shape are yielded as
/// [`ContractError::ReadUnavailable`] without affecting the remaining entries.
#[derive(Debug)]
pub struct PaymentHistory {
    payments: std::vec::IntoIter<IPaymentProcessor::Payment>,
}

impl PaymentHistory {
    /// Creates a history over raw contract payments.
    pub fn new(payments: Vec<IPaymentProcessor::Payment>) -> Self {
        Self { payments: payments.into_iter() }
    }
}

impl Iterator for PaymentHistory {
    type Item = Result<PaymentRecord, ContractError>;

    fn next(&mut self) -> Option<Self::Item> {
        let payment = self.payments.next()?;
        Some(PaymentRecord::from_contract(&payment).ok_or_else(|| {
            ContractError::ReadUnavailable(format!(
                "malformed payment by {}: type {}, timestamp {}",
                payment.payer, payment.paymentType, payment.timestamp
            ))
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.payments.size_hint()
    }
}

impl ExactSizeIterator for PaymentHistory {}

/// Reads payment history from the processor.
#[derive(Debug, Clone)]
pub struct HistoryReader {
    client: PaymentProcessorClient,
    session: Arc<WalletSession>,
}

impl HistoryReader {
    /// Create a new instance of [`Self`].
    pub fn new(client: PaymentProcessorClient, session: Arc<WalletSession>) -> Self {
        Self { client, session }
    }

    /// Loads payments in `scope`.
    ///
    /// [`PaymentScope::Mine`] requires a connected session.
    #[instrument(skip(self))]
    pub async fn load_payments(&self, scope: PaymentScope) -> Result<PaymentHistory, PaymentError> {
        match scope {
            PaymentScope::All => Ok(PaymentHistory::new(self.client.get_all_payments().await?)),
            PaymentScope::Mine => {
                let session = self.session.require().await?;
                Ok(self.load_account_payments(session.account).await?)
            }
        }
    }

    /// Loads the payments of `account`.
    pub async fn load_account_payments(
        &self,
        account: Address,
    ) -> Result<PaymentHistory, ContractError> {
        Ok(PaymentHistory::new(self.client.get_user_payments(account).await?))
    }

    /// Loads `PaymentProcessed` events emitted since `from_block`.
    pub async fn load_events(
        &self,
        from_block: u64,
    ) -> Result<Vec<PaymentProcessedEvent>, ContractError> {
        self.client.payment_events(from_block).await
    }
}
