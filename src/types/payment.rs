use super::{IPaymentProcessor, PayAsset};
use crate::error::PricingError;
use alloy::primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a recorded payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    /// Paid in the native coin.
    Native,
    /// Paid with an accepted token.
    Token,
}

impl PaymentType {
    /// Maps the contract's `uint8` discriminant.
    pub fn from_discriminant(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Native),
            1 => Some(Self::Token),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str("native"),
            Self::Token => f.write_str("token"),
        }
    }
}

/// A payment observed on the payment processor.
///
/// Records are only ever produced from contract state or events and are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// The paying account.
    pub payer: Address,
    /// Amount in the smallest unit of the paid asset.
    pub amount: U256,
    /// Time at which the contract recorded the payment.
    pub timestamp: DateTime<Utc>,
    /// Native or token payment.
    pub payment_type: PaymentType,
    /// Whether the payer's discount was applied.
    pub is_discounted: bool,
    /// Hash of the paying transaction.
    ///
    /// The contract's payment list does not carry hashes, so this is only known for payments
    /// observed through receipts or event logs.
    pub transaction_hash: Option<B256>,
}

impl PaymentRecord {
    /// Normalizes a payment tuple returned by the contract.
    ///
    /// Returns `None` if the payment type is unknown or the timestamp is out of range.
    pub fn from_contract(payment: &IPaymentProcessor::Payment) -> Option<Self> {
        let seconds = i64::try_from(payment.timestamp).ok()?;
        Some(Self {
            payer: payment.payer,
            amount: payment.amount,
            timestamp: DateTime::from_timestamp(seconds, 0)?,
            payment_type: PaymentType::from_discriminant(payment.paymentType)?,
            is_discounted: payment.isDiscounted,
            transaction_hash: None,
        })
    }
}

/// A `PaymentProcessed` event emitted by the payment processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentProcessedEvent {
    /// The paying account.
    pub payer: Address,
    /// Amount in the smallest unit of the paid asset.
    pub amount: U256,
    /// Payment id assigned by the contract.
    pub payment_id: U256,
    /// Hash of the transaction that emitted the event.
    pub transaction_hash: Option<B256>,
    /// Block in which the event was emitted.
    pub block_number: Option<u64>,
}

/// Discount percentage of an account, in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DiscountRate(u8);

impl DiscountRate {
    /// No discount.
    pub const ZERO: Self = Self(0);

    /// Creates a new discount rate, rejecting percentages above 100.
    pub fn new(percent: u8) -> Result<Self, PricingError> {
        if percent > 100 {
            return Err(PricingError::InvalidDiscount(U256::from(percent)));
        }
        Ok(Self(percent))
    }

    /// The discount percentage.
    pub fn percent(&self) -> u8 {
        self.0
    }

    /// Whether any discount applies.
    pub fn is_discounted(&self) -> bool {
        self.0 > 0
    }
}

impl TryFrom<U256> for DiscountRate {
    type Error = PricingError;

    fn try_from(value: U256) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .filter(|percent| *percent <= 100)
            .map(Self)
            .ok_or(PricingError::InvalidDiscount(value))
    }
}

impl fmt::Display for DiscountRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// A payment being orchestrated. Lives for a single attempt only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPayment {
    /// The nominal amount requested by the caller.
    pub amount_requested: Decimal,
    /// The asset to pay with.
    pub asset: PayAsset,
    /// The discount applied to the nominal amount.
    pub discount_applied: DiscountRate,
    /// The amount to submit, in the smallest unit of `asset`.
    pub payable: U256,
}
