//! Target network definition and the guard that enforces it.
//!
//! # Data Flow
//! ```text
//! connect() / chainChanged
//!     → guard.rs ensure_network(current)
//!         → on target?            done
//!         → switch_chain(target)  done
//!         → 4902 unknown chain    → add_chain(target metadata)
//! ```
//!
//! # Design Decisions
//! - The target is compiled in (target.rs), not configured
//! - Guard failures are notices, never fatal to the session

pub mod guard;
pub mod target;

pub use guard::{NetworkCheck, NetworkGuard};
pub use target::{NetworkTarget, BSC_MAINNET, BSC_TESTNET, NATIVE_DECIMALS};
