use crate::environment::{ALICE, Environment, PROCESSOR, wallet};
use alloy::primitives::U256;
use payflow::{
    orchestrator::{PaymentRequest, PaymentState},
    types::PayAsset,
};
use rust_decimal::Decimal;

#[tokio::test(start_paused = true)]
async fn native_payment() {
    let mut env = Environment::new(wallet());
    env.connect().await;

    let outcome =
        env.dashboard.orchestrator.pay(PaymentRequest::native(Decimal::from(100))).await.unwrap();

    // 100 USD with a 20% discount at 300 USD/BNB.
    let payable = U256::from(266_666_666_666_666_667u128);
    assert_eq!(outcome.payer, ALICE);
    assert_eq!(outcome.payment.asset, PayAsset::Native);
    assert_eq!(outcome.payment.discount_applied.percent(), 20);
    assert_eq!(outcome.payment.payable, payable);
    assert_eq!(outcome.explorer_url, format!("https://bscscan.com/tx/{}", outcome.tx_hash));
    assert!(outcome.block_number.is_some());

    let sent = env.wallet.sent_transactions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, Some(ALICE));
    assert_eq!(sent[0].to, Some(PROCESSOR.into()));
    assert_eq!(sent[0].value, Some(payable));

    assert_eq!(
        env.states(),
        vec![
            PaymentState::Idle,
            PaymentState::SessionChecked,
            PaymentState::NetworkChecked,
            PaymentState::AmountComputed,
            PaymentState::Submitted,
            PaymentState::Confirmed,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn submitted_state_carries_hash() {
    let env = Environment::new(wallet());
    let mut changes = env.dashboard.orchestrator.subscribe();
    env.connect().await;

    let outcome =
        env.dashboard.orchestrator.pay(PaymentRequest::native(Decimal::from(3))).await.unwrap();

    let changes: Vec<_> = std::iter::from_fn(|| changes.try_recv().ok()).collect();
    assert!(changes.iter().all(|change| change.attempt == 1));
    let submitted = changes.iter().find(|change| change.state == PaymentState::Submitted).unwrap();
    assert_eq!(submitted.tx_hash, Some(outcome.tx_hash));
    assert!(changes[..3].iter().all(|change| change.tx_hash.is_none()));
}

#[tokio::test(start_paused = true)]
async fn full_discount_pays_nothing() {
    let wallet = wallet();
    wallet.set_call_response::<payflow::types::IPaymentProcessor::userDiscountsCall>(
        alloy::sol_types::SolValue::abi_encode(&U256::from(100)),
    );
    let env = Environment::new(wallet);
    env.connect().await;

    let outcome =
        env.dashboard.orchestrator.pay(PaymentRequest::native(Decimal::from(100))).await.unwrap();
    assert_eq!(outcome.payment.payable, U256::ZERO);
    assert_eq!(env.wallet.sent_transactions()[0].value, Some(U256::ZERO));
}
