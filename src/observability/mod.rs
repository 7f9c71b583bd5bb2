//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (logging.rs installs the subscriber)
//!     → metrics.rs (counters)
//! ```
//!
//! # Design Decisions
//! - Private keys and raw user input are never logged
//! - Metrics are cheap (no-op without a recorder)

pub mod logging;
pub mod metrics;
