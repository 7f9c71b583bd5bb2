//! Display helpers for balances, amounts and addresses.

use alloy::primitives::U256;

use crate::format::units::{from_base_units, scale};
use crate::network::NATIVE_DECIMALS;

/// Full-precision balance in whole tokens.
pub fn format_balance(balance: U256) -> String {
    from_base_units(balance, NATIVE_DECIMALS)
}

/// Rounded amount for status cards: three decimals, `<0.001` for dust.
pub fn format_amount(amount: U256) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    // Units of 0.001 token.
    let milli = scale(NATIVE_DECIMALS - 3);
    if amount < milli {
        return "<0.001".to_string();
    }

    let rounded = amount.saturating_add(milli / U256::from(2)) / milli;
    let thousand = U256::from(1000u16);
    format!("{}.{:0>3}", rounded / thousand, (rounded % thousand).to_string())
}

/// `0x1234...abcd`. Lossy; short input is returned unchanged.
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
