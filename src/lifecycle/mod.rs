//! Process lifecycle for the binary.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every subscriber wakes → session.shutdown() → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::{spawn_signal_listener, wait_for_signal};
