use crate::environment::{ALICE, Environment, wallet, wallet_on};
use alloy::primitives::U64;
use payflow::{
    error::{PaymentError, WalletError},
    orchestrator::{PaymentRequest, PaymentState},
    spawn::spawn,
    wallet::WalletProvider,
};
use rust_decimal::Decimal;
use std::sync::Arc;

#[tokio::test(start_paused = true)]
async fn switches_known_network_before_paying() {
    let env = Environment::new(wallet_on(1).with_known_chain(56));
    env.connect().await;

    env.dashboard.orchestrator.pay(PaymentRequest::native(Decimal::from(30))).await.unwrap();

    assert_eq!(env.wallet.switch_requests(), vec![56]);
    assert!(env.wallet.added_chains().is_empty());
    assert_eq!(env.wallet.current_chain(), 56);
    assert_eq!(env.wallet.sent_transactions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn adds_unknown_network_before_paying() {
    let env = Environment::new(wallet_on(1));
    env.connect().await;

    env.dashboard.orchestrator.pay(PaymentRequest::native(Decimal::from(30))).await.unwrap();

    assert_eq!(env.wallet.switch_requests(), vec![56, 56]);
    let added = env.wallet.added_chains();
    assert_eq!(added.len(), 1);
    assert_eq!(added[0].chain_id, U64::from(56));
    assert_eq!(added[0].chain_name, "Binance Smart Chain");
    assert_eq!(added[0].rpc_urls[0].as_str(), "https://bsc-dataseed.binance.org/");
    assert_eq!(added[0].block_explorer_urls[0].as_str(), "https://bscscan.com/");
}

#[tokio::test]
async fn refused_network_switch() {
    let mut env = Environment::new(wallet_on(1).with_known_chain(56).rejecting_switch());
    env.connect().await;

    let err = env
        .dashboard
        .orchestrator
        .pay(PaymentRequest::native(Decimal::from(30)))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PaymentError::Wallet(WalletError::NetworkUnavailable { chain_id: 56, .. })
    ));
    assert!(env.wallet.sent_transactions().is_empty());
    assert_eq!(
        env.states(),
        vec![PaymentState::Idle, PaymentState::SessionChecked, PaymentState::Failed]
    );
}

#[tokio::test]
async fn refused_network_add() {
    let env = Environment::new(wallet_on(1).rejecting_add());
    env.connect().await;

    let err = env
        .dashboard
        .orchestrator
        .pay(PaymentRequest::native(Decimal::from(30)))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::Wallet(WalletError::NetworkUnavailable { .. })));
    assert_eq!(env.wallet.current_chain(), 1);
    assert!(env.wallet.sent_transactions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn network_check_targets_signing_wallet() {
    let reads = wallet();
    let signer = wallet_on(1).with_known_chain(56);
    let dashboard = spawn(
        Environment::config(),
        Arc::new(reads.clone()) as Arc<dyn WalletProvider>,
        Some(Arc::new(signer.clone()) as Arc<dyn WalletProvider>),
    );
    let mut states = dashboard.orchestrator.subscribe();
    assert_eq!(dashboard.session.connect().await.unwrap().account, ALICE);

    // Receipts are only known to the signing wallet, so the attempt times out after submission.
    let _ = dashboard.orchestrator.pay(PaymentRequest::native(Decimal::from(30))).await;

    assert_eq!(signer.switch_requests(), vec![56]);
    assert_eq!(signer.current_chain(), 56);
    assert_eq!(signer.sent_transactions().len(), 1);
    assert!(reads.switch_requests().is_empty());
    assert!(reads.sent_transactions().is_empty());

    let states: Vec<_> =
        std::iter::from_fn(|| states.try_recv().ok()).map(|change| change.state).collect();
    assert_eq!(
        &states[..5],
        [
            PaymentState::Idle,
            PaymentState::SessionChecked,
            PaymentState::NetworkChecked,
            PaymentState::AmountComputed,
            PaymentState::Submitted,
        ]
    );
}
