use crate::environment::{ALICE, Environment, USDT, usdt, wallet};
use alloy::{
    primitives::U256,
    sol_types::{SolCall, SolValue},
};
use payflow::{
    error::PaymentError,
    orchestrator::{PaymentRequest, PaymentState},
    types::{IERC20, IPaymentProcessor},
};
use rust_decimal::Decimal;

fn tokens(amount: u64) -> U256 {
    U256::from(amount) * U256::from(10).pow(U256::from(18))
}

#[tokio::test(start_paused = true)]
async fn token_payment() {
    let mut env = Environment::new(wallet());
    env.connect().await;

    let outcome = env
        .dashboard
        .orchestrator
        .pay(PaymentRequest::token(Decimal::from(100), usdt()))
        .await
        .unwrap();
    assert_eq!(outcome.payment.payable, tokens(80));

    let sent = env.wallet.sent_transactions();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].from, Some(ALICE));
    assert!(sent[0].value.unwrap_or_default().is_zero());
    let call = IPaymentProcessor::payWithTokenCall::abi_decode(sent[0].input.input().unwrap())
        .unwrap();
    assert_eq!(call.token, USDT);
    assert_eq!(call.amount, tokens(80));

    assert_eq!(env.states().last(), Some(&PaymentState::Confirmed));
}

#[tokio::test(start_paused = true)]
async fn insufficient_allowance() {
    let wallet = wallet();
    wallet.set_call_response::<IERC20::allowanceCall>(tokens(50).abi_encode());
    let mut env = Environment::new(wallet);
    env.connect().await;

    let err = env
        .dashboard
        .orchestrator
        .pay(PaymentRequest::token(Decimal::from(100), usdt()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PaymentError::InsufficientAllowance { token, allowance, required }
            if token == USDT && allowance == tokens(50) && required == tokens(80)
    ));
    assert!(err.is_pre_submission());
    assert!(env.wallet.sent_transactions().is_empty());
    assert_eq!(
        env.states(),
        vec![
            PaymentState::Idle,
            PaymentState::SessionChecked,
            PaymentState::NetworkChecked,
            PaymentState::Failed,
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn token_payment_without_native_price() {
    let config = Environment::config().with_tokens(vec![usdt()]);
    let mut config = config;
    config.payments.native_rate = None;
    let env = Environment::with_config(wallet(), config);
    env.connect().await;

    // Token payments do not need the native price.
    env.dashboard
        .orchestrator
        .pay(PaymentRequest::token(Decimal::from(10), usdt()))
        .await
        .unwrap();

    let err = env
        .dashboard
        .orchestrator
        .pay(PaymentRequest::native(Decimal::from(10)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PaymentError::Pricing(payflow::error::PricingError::PriceUnavailable)
    ));
    assert_eq!(env.wallet.sent_transactions().len(), 1);
}
