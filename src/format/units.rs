//! Exact conversion between decimal text and integer base units.

use alloy::primitives::U256;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UnitsError {
    #[error("amount is empty")]
    Empty,

    #[error("amount '{0}' is not a plain decimal number")]
    Malformed(String),

    #[error("amount has more than {0} decimal places")]
    TooPrecise(u8),

    #[error("amount does not fit in 256 bits")]
    Overflow,
}

/// Parse a decimal string such as `"1.5"` into base units.
///
/// Only digits and a single `.` are accepted; trailing fractional zeros beyond
/// `decimals` are tolerated, any other excess precision is an error.
pub fn to_base_units(text: &str, decimals: u8) -> Result<U256, UnitsError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (whole, fraction) = text.split_once('.').unwrap_or((text, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(UnitsError::Malformed(text.to_string()));
    }

    let fraction = fraction.trim_end_matches('0');
    let places = usize::from(decimals);
    if fraction.len() > places {
        return Err(UnitsError::TooPrecise(decimals));
    }

    let whole_value = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole, 10).map_err(|_| UnitsError::Overflow)?
    };
    let fraction_value = if fraction.is_empty() {
        U256::ZERO
    } else {
        let padded = format!("{:0<width$}", fraction, width = places);
        U256::from_str_radix(&padded, 10).map_err(|_| UnitsError::Overflow)?
    };

    whole_value
        .checked_mul(scale(decimals))
        .and_then(|v| v.checked_add(fraction_value))
        .ok_or(UnitsError::Overflow)
}

/// Render base units as a decimal string, without trailing fractional zeros.
pub fn from_base_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let places = usize::from(decimals);
    if places == 0 {
        return digits;
    }

    let padded = if digits.len() <= places {
        format!("{:0>width$}", digits, width = places + 1)
    } else {
        digits
    };
    let (whole, fraction) = padded.split_at(padded.len() - places);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// `10^decimals`.
pub fn scale(decimals: u8) -> U256 {
    U256::from(10u8).pow(U256::from(decimals))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wei(s: &str) -> U256 {
        U256::from_str_radix(s, 10).unwrap()
    }

    #[test]
    fn test_to_base_units() {
        assert_eq!(to_base_units("1.5", 18).unwrap(), wei("1500000000000000000"));
        assert_eq!(to_base_units("0.000000000000000001", 18).unwrap(), U256::from(1));
        assert_eq!(to_base_units(".5", 18).unwrap(), wei("500000000000000000"));
        assert_eq!(to_base_units("5.", 18).unwrap(), wei("5000000000000000000"));
        assert_eq!(to_base_units(" 2 ", 18).unwrap(), wei("2000000000000000000"));
        assert_eq!(to_base_units("1.50000000000000000000", 18).unwrap(), wei("1500000000000000000"));
    }

    #[test]
    fn test_to_base_units_rejects() {
        assert_eq!(to_base_units("", 18), Err(UnitsError::Empty));
        assert!(matches!(to_base_units("1.2.3", 18), Err(UnitsError::Malformed(_))));
        assert!(matches!(to_base_units("-1", 18), Err(UnitsError::Malformed(_))));
        assert!(matches!(to_base_units("1e18", 18), Err(UnitsError::Malformed(_))));
        assert!(matches!(to_base_units(".", 18), Err(UnitsError::Malformed(_))));
        assert_eq!(
            to_base_units("0.0000000000000000001", 18),
            Err(UnitsError::TooPrecise(18))
        );
        let huge = "9".repeat(80);
        assert_eq!(to_base_units(&huge, 18), Err(UnitsError::Overflow));
    }

    #[test]
    fn test_from_base_units() {
        assert_eq!(from_base_units(U256::ZERO, 18), "0");
        assert_eq!(from_base_units(U256::from(1), 18), "0.000000000000000001");
        assert_eq!(from_base_units(wei("1500000000000000000"), 18), "1.5");
        assert_eq!(from_base_units(wei("5000000000000000000"), 18), "5");
        assert_eq!(from_base_units(U256::from(1234), 0), "1234");
    }

    #[test]
    fn test_round_trip_on_sample_balances() {
        let samples = [
            U256::ZERO,
            U256::from(1),
            U256::from(999_999_999_999_999_999u64),
            wei("123456789012345678901234567890"),
            U256::MAX,
        ];
        for balance in samples {
            let text = from_base_units(balance, 18);
            assert_eq!(to_base_units(&text, 18).unwrap(), balance, "round trip of {}", text);
        }
    }
}
