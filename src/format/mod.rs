//! Pure formatting utilities.
//!
//! Balances stay in base units everywhere else in the crate; these functions
//! are the only place they become decimal text, and the only place user text
//! becomes base units.

pub mod display;
pub mod units;

pub use display::{format_amount, format_balance, shorten_address};
pub use units::{from_base_units, to_base_units, UnitsError};
