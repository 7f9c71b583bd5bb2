//! Transfer submission.
//!
//! # Design Decisions
//! - Validation is pure and runs before any provider call
//! - One attempt at a time: a terminal status must be dismissed with
//!   `reset_status` before the next submission
//! - No automatic retries

pub mod status;
pub mod submitter;
pub mod validate;

pub use status::TransferStatus;
pub use submitter::TransferSubmitter;
pub use validate::{parse_recipient, validate_transfer, ValidatedTransfer};
