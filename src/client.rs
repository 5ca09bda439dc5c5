//! Typed client for the payment processor contract.

use crate::{
    error::ContractError,
    transactions::PendingTransaction,
    types::{DiscountRate, IERC20, IPaymentProcessor, PaymentProcessedEvent},
    wallet::{SigningHandle, WalletProvider},
};
use alloy::{
    network::TransactionBuilder,
    primitives::{Address, U256},
    rpc::types::{Filter, TransactionRequest},
    sol_types::{SolCall, SolEvent},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Client for a deployed payment processor.
///
/// Reads go through the wallet provider. Writes are signed with the [`SigningHandle`] of the
/// active session.
#[derive(Debug, Clone)]
pub struct PaymentProcessorClient {
    provider: Arc<dyn WalletProvider>,
    address: Address,
}

impl PaymentProcessorClient {
    /// Creates a client for the processor deployed at `address`.
    pub fn new(provider: Arc<dyn WalletProvider>, address: Address) -> Self {
        Self { provider, address }
    }

    /// The processor address.
    pub fn address(&self) -> Address {
        self.address
    }

    async fn read<C: SolCall>(&self, to: Address, call: C) -> Result<C::Return, ContractError> {
        let tx = TransactionRequest::default().with_to(to).with_input(call.abi_encode());
        let output = self.provider.call(tx).await.map_err(ContractError::read)?;
        C::abi_decode_returns(&output).map_err(ContractError::read)
    }

    /// Returns the raw discount percentage of `account`.
    pub async fn get_discount(&self, account: Address) -> Result<U256, ContractError> {
        self.read(self.address, IPaymentProcessor::userDiscountsCall { user: account }).await
    }

    /// Returns every payment recorded by the processor.
    pub async fn get_all_payments(&self) -> Result<Vec<IPaymentProcessor::Payment>, ContractError> {
        self.read(self.address, IPaymentProcessor::getAllPaymentsCall {}).await
    }

    /// Returns the payments made by `account`.
    pub async fn get_user_payments(
        &self,
        account: Address,
    ) -> Result<Vec<IPaymentProcessor::Payment>, ContractError> {
        self.read(self.address, IPaymentProcessor::getUserPaymentsCall { user: account }).await
    }

    /// Whether `token` is accepted for payments.
    pub async fn is_accepted_token(&self, token: Address) -> Result<bool, ContractError> {
        self.read(self.address, IPaymentProcessor::acceptedTokensCall { token }).await
    }

    /// Returns the allowance `owner` granted the processor on `token`.
    pub async fn token_allowance(
        &self,
        token: Address,
        owner: Address,
    ) -> Result<U256, ContractError> {
        self.read(token, IERC20::allowanceCall { owner, spender: self.address }).await
    }

    /// Returns the native balance held by the processor.
    pub async fn get_balance(&self) -> Result<U256, ContractError> {
        self.provider.balance(self.address).await.map_err(ContractError::read)
    }

    /// Returns the `PaymentProcessed` events emitted since `from_block`.
    pub async fn payment_events(
        &self,
        from_block: u64,
    ) -> Result<Vec<PaymentProcessedEvent>, ContractError> {
        let filter = Filter::new()
            .address(self.address)
            .event_signature(IPaymentProcessor::PaymentProcessed::SIGNATURE_HASH)
            .from_block(from_block);
        let logs = self.provider.logs(&filter).await.map_err(ContractError::read)?;

        logs.iter()
            .map(|log| {
                let decoded = log
                    .log_decode::<IPaymentProcessor::PaymentProcessed>()
                    .map_err(ContractError::read)?;
                let event = decoded.inner.data;
                Ok(PaymentProcessedEvent {
                    payer: event.payer,
                    amount: event.amount,
                    payment_id: event.paymentId,
                    transaction_hash: log.transaction_hash,
                    block_number: log.block_number,
                })
            })
            .collect()
    }

    /// Pays `amount` of the native coin.
    pub async fn pay_native(
        &self,
        signer: &SigningHandle,
        amount: U256,
    ) -> Result<PendingTransaction, ContractError> {
        self.submit(signer, TransactionRequest::default().with_to(self.address).with_value(amount))
            .await
    }

    /// Pays `amount` of `token`. The processor must have been approved to spend it.
    pub async fn pay_with_token(
        &self,
        signer: &SigningHandle,
        token: Address,
        amount: U256,
    ) -> Result<PendingTransaction, ContractError> {
        let call = IPaymentProcessor::payWithTokenCall { token, amount };
        self.submit(signer, self.processor_call(call)).await
    }

    /// Approves the processor to spend `amount` of `token`.
    pub async fn approve_token(
        &self,
        signer: &SigningHandle,
        token: Address,
        amount: U256,
    ) -> Result<PendingTransaction, ContractError> {
        let call = IERC20::approveCall { spender: self.address, amount };
        self.submit(signer, TransactionRequest::default().with_to(token).with_input(call.abi_encode()))
            .await
    }

    /// Accepts `token` for payments. Owner only.
    pub async fn add_accepted_token(
        &self,
        signer: &SigningHandle,
        token: Address,
    ) -> Result<PendingTransaction, ContractError> {
        let call = IPaymentProcessor::addAcceptedTokenCall { token };
        self.submit(signer, self.processor_call(call)).await
    }

    /// Sets the discount of `account`. Owner only.
    pub async fn set_discount(
        &self,
        signer: &SigningHandle,
        account: Address,
        discount: DiscountRate,
    ) -> Result<PendingTransaction, ContractError> {
        let call =
            IPaymentProcessor::setDiscountCall { user: account, percent: U256::from(discount.percent()) };
        self.submit(signer, self.processor_call(call)).await
    }

    /// Withdraws the processor's native balance to the owner. Owner only.
    pub async fn withdraw(&self, signer: &SigningHandle) -> Result<PendingTransaction, ContractError> {
        self.submit(signer, self.processor_call(IPaymentProcessor::withdrawBNBCall {})).await
    }

    fn processor_call(&self, call: impl SolCall) -> TransactionRequest {
        TransactionRequest::default().with_to(self.address).with_input(call.abi_encode())
    }

    #[instrument(skip_all, fields(from = %signer.address()))]
    async fn submit(
        &self,
        signer: &SigningHandle,
        tx: TransactionRequest,
    ) -> Result<PendingTransaction, ContractError> {
        let to = tx.to.and_then(|kind| kind.to().copied()).unwrap_or(self.address);
        let value = tx.value.unwrap_or_default();

        let tx_hash = signer.send_transaction(tx).await.map_err(ContractError::from_submission)?;
        debug!(%tx_hash, %to, %value, "Transaction submitted");

        Ok(PendingTransaction { tx_hash, from: signer.address(), to, value, submitted_at: Utc::now() })
    }
}
