//! Wallet session.
//!
//! # Data Flow
//! ```text
//! connect() / restore()
//!     → request_accounts → chain_id → (network guard, background) → balance
//!     → commit Session snapshot (watch channel)
//!
//! provider notifications
//!     → accountsChanged: update account (balance zeroed) / disconnect, then refresh balance
//!     → chainChanged: update chain id, then resync
//!
//! refresh.rs
//!     → refresh_balance() every `balance_refresh_secs` while connected
//! ```
//!
//! # Design Decisions
//! - Observers see whole `Session` snapshots, never half-updated ones
//! - Background tasks hold weak references; the manager owns their handles

pub mod manager;
mod refresh;
pub mod state;

pub use manager::{Connection, NetworkCheckHandle, SessionManager};
pub use state::Session;
