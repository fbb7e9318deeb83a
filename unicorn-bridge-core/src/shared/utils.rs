//! Utility functions for the bridge core
//!
//! Amount conversion helpers work on `U256` base units so that no value ever
//! passes through floating point.

use crate::shared::constants::{ADDRESS_LENGTH, BASIS_POINTS, COMPARISON_DECIMALS, NATIVE_TOKEN_ADDRESS};
use crate::shared::error::BridgeError;
use ethers::types::U256;

/// Generate a unique ID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Current time in milliseconds since the epoch
pub fn current_timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Validate Ethereum address format
pub fn validate_ethereum_address(address: &str) -> Result<(), BridgeError> {
    if !address.starts_with("0x") {
        return Err(BridgeError::validation("Address must start with 0x"));
    }

    if address.len() != ADDRESS_LENGTH {
        return Err(BridgeError::validation("Address must be 42 characters long"));
    }

    if !address[2..].chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(BridgeError::validation("Address contains invalid hex characters"));
    }

    Ok(())
}

/// Case-insensitive address comparison
pub fn addresses_equal(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

pub fn is_native_token(address: &str) -> bool {
    addresses_equal(address, NATIVE_TOKEN_ADDRESS)
}

/// `0x1234...abcd`
pub fn short_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

/// Parse a decimal amount ("2.5") into base units for a token with `decimals`.
///
/// Fractional digits beyond the token precision are truncated.
pub fn parse_units(amount: &str, decimals: u32) -> Result<U256, BridgeError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(BridgeError::validation("Amount cannot be empty"));
    }

    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(BridgeError::validation("Invalid amount format"));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(BridgeError::validation(format!("Invalid amount format: {}", amount)));
    }

    let mut digits = if whole.is_empty() { "0".to_string() } else { whole.to_string() };
    let kept: String = fraction.chars().take(decimals as usize).collect();
    digits.push_str(&kept);
    for _ in kept.len()..decimals as usize {
        digits.push('0');
    }

    U256::from_dec_str(&digits)
        .map_err(|e| BridgeError::validation(format!("Amount out of range: {} ({})", amount, e)))
}

/// Parse a decimal integer string of base units
pub fn parse_base_units(raw: &str) -> Result<U256, BridgeError> {
    let raw = raw.trim();
    if let Some(hex_digits) = raw.strip_prefix("0x") {
        return U256::from_str_radix(hex_digits, 16)
            .map_err(|e| BridgeError::validation(format!("Invalid hex amount {}: {}", raw, e)));
    }
    U256::from_dec_str(raw).map_err(|e| BridgeError::validation(format!("Invalid amount {}: {}", raw, e)))
}

/// Format base units as a decimal string with exactly `precision` fractional
/// digits, rounding half up.
pub fn format_units_rounded(raw: U256, decimals: u32, precision: u32) -> String {
    let scaled = if decimals > precision {
        let divisor = U256::exp10((decimals - precision) as usize);
        raw.saturating_add(divisor / 2) / divisor
    } else {
        raw.saturating_mul(U256::exp10((precision - decimals) as usize))
    };

    if precision == 0 {
        return scaled.to_string();
    }

    let unit = U256::exp10(precision as usize);
    let whole = scaled / unit;
    let fraction = (scaled % unit).as_u64();
    format!("{}.{:0width$}", whole, fraction, width = precision as usize)
}

/// True when a formatted decimal string holds a non-zero digit
pub fn is_positive_amount(formatted: &str) -> bool {
    formatted.chars().any(|c| c.is_ascii_digit() && c != '0')
}

/// Decimal amount lifted to a common fixed-point scale so amounts of
/// different tokens can be compared numerically.
pub fn to_comparable(amount: &str) -> Result<U256, BridgeError> {
    parse_units(amount, COMPARISON_DECIMALS)
}

/// `value * bps / 10_000`
pub fn apply_bps(value: U256, bps: u64) -> U256 {
    value.saturating_mul(U256::from(bps)) / U256::from(BASIS_POINTS)
}

/// Render a comparable (18-decimal) amount back into a display string
pub fn format_comparable(value: U256, precision: u32) -> String {
    format_units_rounded(value, COMPARISON_DECIMALS, precision)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id() {
        let id1 = generate_id();
        let id2 = generate_id();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36);
    }

    #[test]
    fn test_validate_ethereum_address() {
        assert!(validate_ethereum_address("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6").is_ok());

        assert!(validate_ethereum_address("742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6").is_err()); // No 0x
        assert!(validate_ethereum_address("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b").is_err()); // Too short
        assert!(validate_ethereum_address("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8bg").is_err()); // Invalid char
    }

    #[test]
    fn test_native_sentinel_is_case_insensitive() {
        assert!(is_native_token("0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"));
        assert!(!is_native_token("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"));
    }

    #[test]
    fn test_short_address() {
        assert_eq!(short_address("0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6"), "0x742d...d8b6");
        assert_eq!(short_address("0x1234"), "0x1234");
    }

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units("1.5", 6).expect("parse"), U256::from(1_500_000u64));
        assert_eq!(parse_units("100", 6).expect("parse"), U256::from(100_000_000u64));
        assert_eq!(parse_units(".25", 2).expect("parse"), U256::from(25u64));
        assert_eq!(parse_units("2.0", 18).expect("parse"), U256::exp10(18) * 2);
        // Extra precision is truncated
        assert_eq!(parse_units("1.1234567", 6).expect("parse"), U256::from(1_123_456u64));

        assert!(parse_units("", 6).is_err());
        assert!(parse_units(".", 6).is_err());
        assert!(parse_units("1.2.3", 6).is_err());
        assert!(parse_units("-1", 6).is_err());
        assert!(parse_units("1e6", 6).is_err());
    }

    #[test]
    fn test_parse_base_units() {
        assert_eq!(parse_base_units("1000").expect("dec"), U256::from(1000u64));
        assert_eq!(parse_base_units("0x3e8").expect("hex"), U256::from(1000u64));
        assert!(parse_base_units("abc").is_err());
    }

    #[test]
    fn test_format_units_rounded() {
        assert_eq!(format_units_rounded(U256::from(1_000_000u64), 6, 6), "1.000000");
        assert_eq!(format_units_rounded(U256::from(100_000u64), 6, 6), "0.100000");
        assert_eq!(format_units_rounded(U256::exp10(18) * 5, 18, 6), "5.000000");
        // 0.0000004999 ETH rounds down, 0.0000005 rounds up
        assert_eq!(format_units_rounded(U256::from(499_999_999_999u64), 18, 6), "0.000000");
        assert_eq!(format_units_rounded(U256::from(500_000_000_000u64), 18, 6), "0.000001");
        // Fewer decimals than display precision pads
        assert_eq!(format_units_rounded(U256::from(12u64), 2, 6), "0.120000");
        assert_eq!(format_units_rounded(U256::from(12u64), 0, 0), "12");
    }

    #[test]
    fn test_is_positive_amount() {
        assert!(is_positive_amount("0.000001"));
        assert!(is_positive_amount("10.000000"));
        assert!(!is_positive_amount("0.000000"));
        assert!(!is_positive_amount("0"));
    }

    #[test]
    fn test_apply_bps() {
        let hundred = to_comparable("100").expect("parse");
        assert_eq!(apply_bps(hundred, 15_000), to_comparable("150").expect("parse"));
        assert_eq!(apply_bps(hundred, 11_000), to_comparable("110").expect("parse"));
        assert_eq!(format_comparable(apply_bps(hundred, 11_000), 2), "110.00");
    }
}
