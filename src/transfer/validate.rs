//! Pre-submission checks. Pure; no provider calls.

use std::str::FromStr;

use alloy::primitives::{Address, U256};

use crate::error::WalletError;
use crate::format::to_base_units;
use crate::network::NATIVE_DECIMALS;
use crate::session::Session;

/// A transfer that passed every local check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTransfer {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    /// Trimmed amount text, kept for display.
    pub amount: String,
}

/// Run the fail-fast checks in order: connection, presence, recipient,
/// amount, balance.
pub fn validate_transfer(
    session: &Session,
    recipient: &str,
    amount: &str,
) -> Result<ValidatedTransfer, WalletError> {
    let from = session.account().ok_or(WalletError::NotConnected)?;

    let recipient = recipient.trim();
    let amount = amount.trim();
    if recipient.is_empty() || amount.is_empty() {
        return Err(WalletError::MissingField);
    }

    let to = parse_recipient(recipient)?;

    let value = to_base_units(amount, NATIVE_DECIMALS).map_err(|_| WalletError::InvalidAmount)?;
    if value.is_zero() {
        return Err(WalletError::InvalidAmount);
    }
    if value > session.balance() {
        return Err(WalletError::InsufficientBalance);
    }

    Ok(ValidatedTransfer {
        from,
        to,
        value,
        amount: amount.to_string(),
    })
}

/// `0x` followed by 40 hex digits. Mixed-case input must carry a valid
/// EIP-55 checksum; all-lowercase and all-uppercase input is accepted as is.
pub fn parse_recipient(text: &str) -> Result<Address, WalletError> {
    let hex = text
        .strip_prefix("0x")
        .ok_or(WalletError::InvalidAddress)?;
    if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(WalletError::InvalidAddress);
    }

    let has_lower = hex.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = hex.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(text, None).map_err(|_| WalletError::InvalidAddress)
    } else {
        Address::from_str(text).map_err(|_| WalletError::InvalidAddress)
    }
}
