use crate::environment::{ALICE, Environment, PROCESSOR, wallet};
use alloy::{
    primitives::{Address, B256, U256, address},
    sol_types::SolValue,
};
use payflow::{
    history::PaymentScope,
    types::{IPaymentProcessor, PaymentType},
    wallet::ProviderEvent,
};

const BOB: Address = address!("0x0000000000000000000000000000000000000b0b");

fn payment(payer: Address, payment_type: u8) -> IPaymentProcessor::Payment {
    IPaymentProcessor::Payment {
        payer,
        amount: U256::from(1_000_000),
        timestamp: U256::from(1_700_000_000),
        paymentType: payment_type,
        isDiscounted: payer == ALICE,
    }
}

#[tokio::test]
async fn snapshot_follows_session() {
    let wallet = wallet().with_call_response::<IPaymentProcessor::getUserPaymentsCall>(
        (vec![payment(ALICE, 0), payment(ALICE, 1)],).abi_encode_params(),
    );
    let env = Environment::new(wallet);
    let mut account = env.dashboard.account.clone();
    assert!(account.snapshot().is_none());

    env.connect().await;
    let snapshot = account.changed().await.unwrap();
    assert_eq!(snapshot.account, ALICE);
    assert_eq!(snapshot.discount.unwrap().percent(), 20);
    assert_eq!(
        snapshot.payments.iter().map(|p| p.payment_type).collect::<Vec<_>>(),
        vec![PaymentType::Native, PaymentType::Token]
    );

    // A different account ends the session and clears the snapshot.
    env.wallet.emit(ProviderEvent::AccountsChanged(vec![BOB]));
    assert!(account.changed().await.is_none());
    assert!(env.dashboard.session.current().await.is_none());
}

#[tokio::test]
async fn all_payments_skip_malformed_entries() {
    let wallet = wallet().with_call_response::<IPaymentProcessor::getAllPaymentsCall>(
        (vec![payment(ALICE, 0), payment(BOB, 9), payment(BOB, 1)],).abi_encode_params(),
    );
    let env = Environment::new(wallet);

    let entries: Vec<_> =
        env.dashboard.history.load_payments(PaymentScope::All).await.unwrap().collect();
    assert_eq!(entries.len(), 3);
    assert!(entries[0].is_ok());
    assert!(entries[1].is_err());
    assert_eq!(entries[2].as_ref().unwrap().payer, BOB);
}

#[tokio::test]
async fn payment_events() {
    let event = IPaymentProcessor::PaymentProcessed {
        payer: ALICE,
        amount: U256::from(5),
        paymentId: U256::from(1),
    };
    let wallet = wallet().with_event(PROCESSOR, &event, B256::with_last_byte(1), 42).with_event(
        Address::ZERO,
        &event,
        B256::with_last_byte(2),
        43,
    );
    let env = Environment::new(wallet);

    let events = env.dashboard.history.load_events(0).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].block_number, Some(42));
}

#[tokio::test]
async fn processor_balance() {
    let env = Environment::new(wallet().with_balance(PROCESSOR, U256::from(7)));
    assert_eq!(env.dashboard.client.get_balance().await.unwrap(), U256::from(7));
}
