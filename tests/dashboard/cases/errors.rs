use crate::environment::{Environment, wallet};
use alloy::{primitives::U256, sol_types::SolValue};
use payflow::{
    error::{ContractError, PaymentError, PricingError, TransactionError, WalletError},
    orchestrator::{PaymentRequest, PaymentState},
    spawn::spawn,
    types::IPaymentProcessor,
    wallet::{InMemoryWallet, ReceiptMode, WalletProvider},
};
use rust_decimal::Decimal;
use std::sync::Arc;

fn pay_100() -> PaymentRequest {
    PaymentRequest::native(Decimal::from(100))
}

#[tokio::test]
async fn wallet_not_found() {
    let provider: Arc<dyn WalletProvider> = Arc::new(wallet());
    let dashboard = spawn(Environment::config(), provider, None);

    let err = dashboard.session.connect().await.unwrap_err();
    assert!(matches!(err, WalletError::WalletNotFound));
    assert!(matches!(
        dashboard.orchestrator.pay(pay_100()).await,
        Err(PaymentError::Wallet(WalletError::NoSession))
    ));
}

#[tokio::test]
async fn payment_requires_session() {
    let mut env = Environment::new(wallet());

    let err = env.dashboard.orchestrator.pay(pay_100()).await.unwrap_err();
    assert!(matches!(err, PaymentError::Wallet(WalletError::NoSession)));
    assert!(env.wallet.sent_transactions().is_empty());
    assert_eq!(env.states(), vec![PaymentState::Idle, PaymentState::Failed]);
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let mut env = Environment::new(wallet());
    env.connect().await;

    for amount in [Decimal::ZERO, Decimal::from(-5)] {
        let err =
            env.dashboard.orchestrator.pay(PaymentRequest::native(amount)).await.unwrap_err();
        assert!(matches!(err, PaymentError::Pricing(PricingError::InvalidAmount(_))));
    }
    assert!(env.wallet.sent_transactions().is_empty());
    assert_eq!(env.states().last(), Some(&PaymentState::Failed));
}

#[tokio::test]
async fn out_of_range_discount() {
    let wallet = wallet();
    wallet.set_call_response::<IPaymentProcessor::userDiscountsCall>(U256::from(150).abi_encode());
    let env = Environment::new(wallet);
    env.connect().await;

    let err = env.dashboard.orchestrator.pay(pay_100()).await.unwrap_err();
    assert!(matches!(err, PaymentError::Pricing(PricingError::InvalidDiscount(_))));
    assert!(env.wallet.sent_transactions().is_empty());
}

#[tokio::test]
async fn discount_read_failure() {
    let env = Environment::new(wallet().failing_calls("missing trie node"));
    env.connect().await;

    let err = env.dashboard.orchestrator.pay(pay_100()).await.unwrap_err();
    assert!(matches!(err, PaymentError::Contract(ContractError::ReadUnavailable(_))));
}

#[tokio::test]
async fn rejected_signature() {
    let env = Environment::new(wallet().failing_sends(4001, "User denied transaction signature."));
    env.connect().await;

    let err = env.dashboard.orchestrator.pay(pay_100()).await.unwrap_err();
    assert!(matches!(err, PaymentError::Contract(ContractError::SubmissionRejected(_))));
    assert!(err.is_pre_submission());
    insta::assert_snapshot!(err, @"submission rejected: user rejected the request");
}

#[tokio::test]
async fn insufficient_funds() {
    let env = Environment::new(
        wallet().failing_sends(-32000, "insufficient funds for gas * price + value"),
    );
    env.connect().await;

    let err = env.dashboard.orchestrator.pay(pay_100()).await.unwrap_err();
    assert!(matches!(err, PaymentError::Contract(ContractError::InsufficientFunds)));
}

#[tokio::test(start_paused = true)]
async fn reverted_payment() {
    let mut env = Environment::new(wallet().with_receipt_mode(ReceiptMode::Reverted));
    let mut changes = env.dashboard.orchestrator.subscribe();
    env.connect().await;

    let err = env.dashboard.orchestrator.pay(pay_100()).await.unwrap_err();
    assert!(!err.is_pre_submission());

    let submitted = std::iter::from_fn(|| changes.try_recv().ok())
        .find_map(|change| change.tx_hash)
        .unwrap();
    assert!(
        matches!(err, PaymentError::Transaction(TransactionError::Reverted(hash)) if hash == submitted)
    );
    assert_eq!(
        env.states()[4..],
        [PaymentState::Submitted, PaymentState::Failed]
    );
}

#[tokio::test(start_paused = true)]
async fn receipt_timeout() {
    let env = Environment::new(wallet().with_receipt_mode(ReceiptMode::Pending));
    env.connect().await;

    let err = env.dashboard.orchestrator.pay(pay_100()).await.unwrap_err();
    assert!(matches!(
        err,
        PaymentError::Transaction(TransactionError::Timeout { timeout, .. })
            if timeout.as_secs() == 10
    ));
    assert_eq!(env.wallet.sent_transactions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_payments_are_rejected() {
    let env = Environment::new(wallet().with_receipt_mode(ReceiptMode::Pending));
    let mut changes = env.dashboard.orchestrator.subscribe();
    env.connect().await;

    let orchestrator = env.dashboard.orchestrator.clone();
    let first = tokio::spawn(async move { orchestrator.pay(pay_100()).await });

    // Wait for the first attempt to be in flight.
    while changes.recv().await.unwrap().state != PaymentState::Submitted {}

    let err = env.dashboard.orchestrator.pay(pay_100()).await.unwrap_err();
    assert!(matches!(err, PaymentError::PaymentInProgress));

    assert!(matches!(
        first.await.unwrap(),
        Err(PaymentError::Transaction(TransactionError::Timeout { .. }))
    ));
    assert_eq!(env.wallet.sent_transactions().len(), 1);

    // The next attempt is accepted once the first one ended.
    assert!(!matches!(
        env.dashboard.orchestrator.pay(pay_100()).await,
        Err(PaymentError::PaymentInProgress)
    ));
}

#[tokio::test]
async fn rejected_account_access() {
    let env = Environment::new(InMemoryWallet::new(56).rejecting_accounts());
    assert!(matches!(
        env.dashboard.session.connect().await,
        Err(WalletError::AccountAccessDenied)
    ));
}
