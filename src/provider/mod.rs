//! Wallet provider boundary.
//!
//! # Data Flow
//! ```text
//! session / network / transfer
//!     → WalletProvider (this trait)
//!         → rpc.rs (alloy JSON-RPC + local signer), or
//!         → any host adapter over an injected wallet
//!
//! wallet notifications
//!     → ListenerRegistry::emit
//!     → handlers registered via subscribe()
//! ```
//!
//! # Design Decisions
//! - Presence of a wallet is modelled by handing `Option<Arc<dyn WalletProvider>>`
//!   to the session manager, never by ambient global state
//! - Event registration is explicit (`subscribe` returns an id) so teardown can
//!   remove exactly what it added
//! - Errors carry EIP-1193 codes (4001 rejected, 4902 unknown chain)

pub mod error;
pub mod events;
pub mod rpc;
pub mod signer;
pub mod types;

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

pub use error::{ProviderError, ProviderResult};
pub use events::{EventHandler, EventKind, ListenerRegistry, ProviderEvent, SubscriptionId};
pub use rpc::RpcWalletProvider;
pub use signer::LocalSigner;
pub use types::{
    AddChainParams, ChainId, NativeCurrency, TransferReceipt, TransferRequest, TRANSFER_GAS_LIMIT,
};

/// Capability offered by a connected wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the user to authorize accounts (`eth_requestAccounts`).
    async fn request_accounts(&self) -> ProviderResult<Vec<Address>>;

    /// Accounts already authorized, without prompting (`eth_accounts`).
    async fn accounts(&self) -> ProviderResult<Vec<Address>>;

    /// Currently active chain (`eth_chainId`).
    async fn chain_id(&self) -> ProviderResult<ChainId>;

    /// Native balance in base units (`eth_getBalance`).
    async fn balance(&self, address: Address) -> ProviderResult<U256>;

    /// Ask the wallet to switch chains (`wallet_switchEthereumChain`).
    async fn switch_chain(&self, chain_id: ChainId) -> ProviderResult<()>;

    /// Ask the wallet to register a chain (`wallet_addEthereumChain`).
    async fn add_chain(&self, params: &AddChainParams) -> ProviderResult<()>;

    /// Submit a transfer. Resolves once the transaction hash is assigned.
    async fn send_transfer(&self, request: &TransferRequest) -> ProviderResult<TxHash>;

    /// Resolve once the transaction is included. A revert is an error.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> ProviderResult<TransferReceipt>;

    /// Register a notification handler.
    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> SubscriptionId;

    /// Remove a notification handler.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
