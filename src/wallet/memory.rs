use super::{AddChainParams, ProviderEvent, Receipt, WalletProvider};
use crate::constants::{UNRECOGNIZED_CHAIN_CODE, USER_REJECTED_REQUEST_CODE};
use alloy::{
    primitives::{Address, B256, Bytes, ChainId, Selector, U256, keccak256},
    rpc::{
        json_rpc::ErrorPayload,
        types::{Filter, Log, TransactionRequest},
    },
    sol_types::{SolCall, SolEvent},
    transports::{TransportError, TransportResult},
};
use async_trait::async_trait;
use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::sync::broadcast;

/// How [`InMemoryWallet`] resolves submitted transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReceiptMode {
    /// Transactions are mined successfully.
    #[default]
    Success,
    /// Transactions are mined and revert.
    Reverted,
    /// Transactions are never mined.
    Pending,
}

#[derive(Debug, Default)]
struct WalletState {
    accounts: Vec<Address>,
    reject_accounts: bool,
    chain_id: ChainId,
    known_chains: HashSet<ChainId>,
    reject_switch: bool,
    reject_add: bool,
    switch_requests: Vec<ChainId>,
    added_chains: Vec<AddChainParams>,
    call_responses: HashMap<Selector, Bytes>,
    call_error: Option<String>,
    send_error: Option<(i64, String)>,
    sent: Vec<TransactionRequest>,
    receipt_mode: ReceiptMode,
    receipts: HashMap<B256, Receipt>,
    balances: HashMap<Address, U256>,
    logs: Vec<Log>,
    block_number: u64,
}

#[derive(Debug)]
struct Inner {
    state: Mutex<WalletState>,
    events: broadcast::Sender<ProviderEvent>,
}

/// A scripted [`WalletProvider`] that keeps all state in memory.
///
/// Responses to `eth_call` are keyed by function selector. Submitted transactions are recorded and
/// resolved according to the configured [`ReceiptMode`].
///
/// This is intended for testing only.
#[derive(Debug, Clone)]
pub struct InMemoryWallet {
    inner: Arc<Inner>,
}

impl InMemoryWallet {
    /// Creates a wallet attached to `chain_id` that exposes no accounts.
    pub fn new(chain_id: ChainId) -> Self {
        let (events, _) = broadcast::channel(16);
        let state = WalletState {
            chain_id,
            known_chains: HashSet::from([chain_id]),
            block_number: 1,
            ..Default::default()
        };
        Self { inner: Arc::new(Inner { state: Mutex::new(state), events }) }
    }

    fn state(&self) -> MutexGuard<'_, WalletState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exposes `accounts`, the first one being selected.
    pub fn with_accounts(self, accounts: impl IntoIterator<Item = Address>) -> Self {
        self.state().accounts = accounts.into_iter().collect();
        self
    }

    /// Rejects account access requests.
    pub fn rejecting_accounts(self) -> Self {
        self.state().reject_accounts = true;
        self
    }

    /// Makes `chain_id` switchable without adding it first.
    pub fn with_known_chain(self, chain_id: ChainId) -> Self {
        self.state().known_chains.insert(chain_id);
        self
    }

    /// Rejects chain switch requests.
    pub fn rejecting_switch(self) -> Self {
        self.state().reject_switch = true;
        self
    }

    /// Rejects chain add requests.
    pub fn rejecting_add(self) -> Self {
        self.state().reject_add = true;
        self
    }

    /// Answers calls to `C` with `output`.
    pub fn with_call_response<C: SolCall>(self, output: impl Into<Bytes>) -> Self {
        self.set_call_response::<C>(output);
        self
    }

    /// Fails every `eth_call` with `message`.
    pub fn failing_calls(self, message: impl Into<String>) -> Self {
        self.state().call_error = Some(message.into());
        self
    }

    /// Fails every transaction submission with the given JSON-RPC error.
    pub fn failing_sends(self, code: i64, message: impl Into<String>) -> Self {
        self.state().send_error = Some((code, message.into()));
        self
    }

    /// Resolves submitted transactions according to `mode`.
    pub fn with_receipt_mode(self, mode: ReceiptMode) -> Self {
        self.state().receipt_mode = mode;
        self
    }

    /// Sets the native balance of `address`.
    pub fn with_balance(self, address: Address, balance: U256) -> Self {
        self.state().balances.insert(address, balance);
        self
    }

    /// Adds a log for `event` emitted by `address` in `block_number`.
    pub fn with_event<E: SolEvent>(
        self,
        address: Address,
        event: &E,
        tx_hash: B256,
        block_number: u64,
    ) -> Self {
        let log = Log {
            inner: alloy::primitives::Log { address, data: event.encode_log_data() },
            block_number: Some(block_number),
            transaction_hash: Some(tx_hash),
            ..Default::default()
        };
        self.state().logs.push(log);
        self
    }

    /// Replaces the response to calls to `C`.
    pub fn set_call_response<C: SolCall>(&self, output: impl Into<Bytes>) {
        self.state().call_responses.insert(Selector::from(C::SELECTOR), output.into());
    }

    /// Emits a provider event, applying it to the wallet state first.
    pub fn emit(&self, event: ProviderEvent) {
        {
            let mut state = self.state();
            match &event {
                ProviderEvent::AccountsChanged(accounts) => state.accounts = accounts.clone(),
                ProviderEvent::ChainChanged(chain_id) => state.chain_id = *chain_id,
                ProviderEvent::Disconnect => {}
            }
        }
        let _ = self.inner.events.send(event);
    }

    /// Returns the chain the wallet is attached to.
    pub fn current_chain(&self) -> ChainId {
        self.state().chain_id
    }

    /// Returns all submitted transactions, in order.
    pub fn sent_transactions(&self) -> Vec<TransactionRequest> {
        self.state().sent.clone()
    }

    /// Returns all chain switch requests, in order.
    pub fn switch_requests(&self) -> Vec<ChainId> {
        self.state().switch_requests.clone()
    }

    /// Returns all chain add requests, in order.
    pub fn added_chains(&self) -> Vec<AddChainParams> {
        self.state().added_chains.clone()
    }
}

fn rpc_error(code: i64, message: impl Into<String>) -> TransportError {
    TransportError::ErrorResp(ErrorPayload {
        code,
        message: message.into().into(),
        data: None,
    })
}

fn user_rejected() -> TransportError {
    rpc_error(USER_REJECTED_REQUEST_CODE, "User rejected the request.")
}

#[async_trait]
impl WalletProvider for InMemoryWallet {
    async fn request_accounts(&self) -> TransportResult<Vec<Address>> {
        let state = self.state();
        if state.reject_accounts {
            return Err(user_rejected());
        }
        Ok(state.accounts.clone())
    }

    async fn chain_id(&self) -> TransportResult<ChainId> {
        Ok(self.state().chain_id)
    }

    async fn switch_chain(&self, chain_id: ChainId) -> TransportResult<()> {
        {
            let mut state = self.state();
            state.switch_requests.push(chain_id);
            if state.reject_switch {
                return Err(user_rejected());
            }
            if !state.known_chains.contains(&chain_id) {
                return Err(rpc_error(
                    UNRECOGNIZED_CHAIN_CODE,
                    format!("Unrecognized chain ID \"{chain_id:#x}\"."),
                ));
            }
            if state.chain_id == chain_id {
                return Ok(());
            }
        }
        self.emit(ProviderEvent::ChainChanged(chain_id));
        Ok(())
    }

    async fn add_chain(&self, params: &AddChainParams) -> TransportResult<()> {
        let mut state = self.state();
        state.added_chains.push(params.clone());
        if state.reject_add {
            return Err(user_rejected());
        }
        state.known_chains.insert(params.chain_id.to());
        Ok(())
    }

    async fn call(&self, tx: TransactionRequest) -> TransportResult<Bytes> {
        let state = self.state();
        if let Some(message) = &state.call_error {
            return Err(rpc_error(-32000, message.clone()));
        }
        let selector = tx.input.input().and_then(|input| input.get(..4)).map(Selector::from_slice);
        selector
            .and_then(|selector| state.call_responses.get(&selector).cloned())
            .ok_or_else(|| rpc_error(-32000, "execution reverted"))
    }

    async fn send_transaction(&self, tx: TransactionRequest) -> TransportResult<B256> {
        let mut state = self.state();
        if let Some((code, message)) = &state.send_error {
            return Err(rpc_error(*code, message.clone()));
        }
        state.sent.push(tx);

        let nonce = state.sent.len() as u64;
        let tx_hash = keccak256(nonce.to_be_bytes());
        let block_number = state.block_number;
        let receipt = |success| Receipt {
            transaction_hash: tx_hash,
            block_number: Some(block_number),
            gas_used: 21_000,
            success,
        };
        match state.receipt_mode {
            ReceiptMode::Success => {
                state.receipts.insert(tx_hash, receipt(true));
            }
            ReceiptMode::Reverted => {
                state.receipts.insert(tx_hash, receipt(false));
            }
            ReceiptMode::Pending => {}
        }
        state.block_number += 1;
        Ok(tx_hash)
    }

    async fn transaction_receipt(&self, tx_hash: B256) -> TransportResult<Option<Receipt>> {
        Ok(self.state().receipts.get(&tx_hash).copied())
    }

    async fn balance(&self, address: Address) -> TransportResult<U256> {
        Ok(self.state().balances.get(&address).copied().unwrap_or_default())
    }

    async fn logs(&self, filter: &Filter) -> TransportResult<Vec<Log>> {
        let from_block = filter.get_from_block().unwrap_or_default();
        Ok(self
            .state()
            .logs
            .iter()
            .filter(|log| filter.address.matches(&log.address()))
            .filter(|log| log.block_number.unwrap_or_default() >= from_block)
            .cloned()
            .collect())
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.inner.events.subscribe()
    }
}
