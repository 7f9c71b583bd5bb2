//! Shared utilities for integration tests: a scriptable in-memory wallet.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use bnb_transfer::config::SessionConfig;
use bnb_transfer::provider::{
    AddChainParams, ChainId, EventHandler, EventKind, ListenerRegistry, ProviderError,
    ProviderEvent, ProviderResult, SubscriptionId, TransferReceipt, TransferRequest,
    WalletProvider,
};
use bnb_transfer::{NetworkTarget, Notice, NoticeSender, SessionManager};

/// EIP-55 test vector.
pub const RECIPIENT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

pub fn account() -> Address {
    Address::repeat_byte(0x11)
}

pub fn other_account() -> Address {
    Address::repeat_byte(0x22)
}

pub fn tx_hash() -> TxHash {
    TxHash::repeat_byte(0xab)
}

/// `n` whole BNB in wei.
pub fn bnb(n: u64) -> U256 {
    U256::from(n) * U256::from(10u64).pow(U256::from(18u8))
}

/// Let spawned tasks (event loop, network check) run to completion.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

#[derive(Debug, Clone)]
pub enum SwitchBehaviour {
    /// Switch and emit chainChanged.
    Accept,
    /// Fail with 4902.
    Unrecognized,
    /// Fail with the given error.
    Fail(ProviderError),
}

#[derive(Debug, Clone)]
pub enum ReceiptBehaviour {
    Confirm,
    Revert,
    Fail(ProviderError),
}

#[derive(Debug)]
pub struct FakeState {
    /// Returned by `request_accounts`.
    pub accounts: Vec<Address>,
    /// Returned by `accounts`.
    pub authorized: Vec<Address>,
    pub chain_id: ChainId,
    pub balance: U256,
    pub reject_connect: bool,
    pub switch: SwitchBehaviour,
    pub add_fails: bool,
    pub send_error: Option<ProviderError>,
    pub receipt: ReceiptBehaviour,
    /// Balance after a confirmed transfer.
    pub balance_after_receipt: Option<U256>,
    /// Emitted as chainChanged while answering the next `chain_id` call.
    pub chain_change_during_chain_id: Option<ChainId>,
    pub sent: Vec<TransferRequest>,
    pub added: Vec<AddChainParams>,
}

pub struct FakeProvider {
    state: Mutex<FakeState>,
    listeners: ListenerRegistry,
    calls: Mutex<HashMap<&'static str, usize>>,
    balance_gates: Mutex<VecDeque<oneshot::Receiver<U256>>>,
    receipt_gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

impl FakeProvider {
    /// Connected to BNB Smart Chain with `balance` wei.
    pub fn new(balance: U256) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState {
                accounts: vec![account()],
                authorized: vec![account()],
                chain_id: ChainId(0x38),
                balance,
                reject_connect: false,
                switch: SwitchBehaviour::Accept,
                add_fails: false,
                send_error: None,
                receipt: ReceiptBehaviour::Confirm,
                balance_after_receipt: None,
                chain_change_during_chain_id: None,
                sent: Vec::new(),
                added: Vec::new(),
            }),
            listeners: ListenerRegistry::new(),
            calls: Mutex::new(HashMap::new()),
            balance_gates: Mutex::new(VecDeque::new()),
            receipt_gates: Mutex::new(VecDeque::new()),
        })
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver a wallet notification to every subscriber.
    pub fn emit(&self, event: ProviderEvent) -> usize {
        self.listeners.emit(&event)
    }

    /// Make the next `balance` call wait for the returned sender.
    pub fn gate_balance(&self) -> oneshot::Sender<U256> {
        let (tx, rx) = oneshot::channel();
        self.balance_gates.lock().unwrap().push_back(rx);
        tx
    }

    /// Hold the next receipt until the returned sender fires.
    pub fn gate_receipt(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.receipt_gates.lock().unwrap().push_back(rx);
        tx
    }

    fn record(&self, method: &'static str) {
        *self.calls.lock().unwrap().entry(method).or_default() += 1;
    }

    fn change_chain(&self, chain_id: ChainId) {
        self.state().chain_id = chain_id;
        self.emit(ProviderEvent::ChainChanged(chain_id));
    }
}

#[async_trait]
impl WalletProvider for FakeProvider {
    async fn request_accounts(&self) -> ProviderResult<Vec<Address>> {
        self.record("request_accounts");
        let state = self.state();
        if state.reject_connect {
            return Err(ProviderError::UserRejected);
        }
        Ok(state.accounts.clone())
    }

    async fn accounts(&self) -> ProviderResult<Vec<Address>> {
        self.record("accounts");
        Ok(self.state().authorized.clone())
    }

    async fn chain_id(&self) -> ProviderResult<ChainId> {
        self.record("chain_id");
        let (fetched, notify) = {
            let mut state = self.state();
            (state.chain_id, state.chain_change_during_chain_id.take())
        };
        if let Some(chain_id) = notify {
            self.change_chain(chain_id);
        }
        Ok(fetched)
    }

    async fn balance(&self, _address: Address) -> ProviderResult<U256> {
        self.record("balance");
        let gate = self.balance_gates.lock().unwrap().pop_front();
        let Some(rx) = gate else {
            let balance = self.state().balance;
            return Ok(balance);
        };
        rx.await.map_err(|_| ProviderError::Rpc("gate dropped".into()))
    }

    async fn switch_chain(&self, chain_id: ChainId) -> ProviderResult<()> {
        self.record("switch_chain");
        let behaviour = self.state().switch.clone();
        match behaviour {
            SwitchBehaviour::Accept => {
                self.change_chain(chain_id);
                Ok(())
            }
            SwitchBehaviour::Unrecognized => Err(ProviderError::UnrecognizedChain(
                "Unrecognized chain ID".into(),
            )),
            SwitchBehaviour::Fail(e) => Err(e),
        }
    }

    async fn add_chain(&self, params: &AddChainParams) -> ProviderResult<()> {
        self.record("add_chain");
        let fails = {
            let mut state = self.state();
            state.added.push(params.clone());
            state.add_fails
        };
        if fails {
            return Err(ProviderError::Rpc("add chain refused".into()));
        }
        self.change_chain(params.chain_id);
        Ok(())
    }

    async fn send_transfer(&self, request: &TransferRequest) -> ProviderResult<TxHash> {
        self.record("send_transfer");
        let mut state = self.state();
        state.sent.push(request.clone());
        match state.send_error.clone() {
            Some(e) => Err(e),
            None => Ok(tx_hash()),
        }
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> ProviderResult<TransferReceipt> {
        self.record("wait_for_receipt");
        let gate = self.receipt_gates.lock().unwrap().pop_front();
        if let Some(rx) = gate {
            rx.await
                .map_err(|_| ProviderError::Rpc("receipt gate dropped".into()))?;
        }
        let mut state = self.state();
        match state.receipt.clone() {
            ReceiptBehaviour::Confirm => {
                if let Some(balance) = state.balance_after_receipt {
                    state.balance = balance;
                }
                Ok(TransferReceipt {
                    tx_hash,
                    block_number: Some(42),
                    gas_used: 21_000,
                })
            }
            ReceiptBehaviour::Revert => Err(ProviderError::Reverted(tx_hash)),
            ReceiptBehaviour::Fail(e) => Err(e),
        }
    }

    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> SubscriptionId {
        self.listeners.subscribe(kind, handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

/// A session manager over `fake`, with a notice receiver.
pub fn session_with(fake: &Arc<FakeProvider>) -> (SessionManager, mpsc::UnboundedReceiver<Notice>) {
    let (notices, rx) = NoticeSender::channel();
    let provider: Arc<dyn WalletProvider> = fake.clone();
    let session = SessionManager::new(
        Some(provider),
        NetworkTarget::default(),
        SessionConfig::default(),
        notices,
    );
    (session, rx)
}

/// Drain every notice received so far.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<Notice>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}
