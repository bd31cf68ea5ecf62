//! Parsing for license fee expressions (`§4.9`): `<amount> <unit>`
//! with unit in `eth`, `ether`, `gwei`, `wei`; `"0"`, `"0 eth"` and
//! `"none"` all map to zero.
//!
//! Conversion is done in exact integer arithmetic, not floating point:
//! a fee is a wei amount a transaction is sent with, and float
//! rounding could silently send one wei more or less than an on-chain
//! fee expects (scenario `§8.6` requires sending *exactly* the fee).
use crate::{Error, Result};

/// Decimal places `unit` is scaled by, relative to wei.
fn decimals(unit: &str) -> Option<u32> {
    match unit.to_ascii_lowercase().as_str() {
        "eth" | "ether" => Some(18),
        "gwei" => Some(9),
        "wei" => Some(0),
        _ => None,
    }
}

/// Parse a fee expression into a wei amount.
pub fn parse_fee(input: &str) -> Result<u128> {
    let trimmed = input.trim();

    if trimmed.eq_ignore_ascii_case("none") {
        return Ok(0);
    }

    let mut parts = trimmed.split_whitespace();
    let amount_str = parts.next().ok_or_else(|| Error::InvalidFee(input.to_owned()))?;
    let unit = parts.next().unwrap_or("wei");

    if parts.next().is_some() {
        return Err(Error::InvalidFee(input.to_owned()));
    }

    let scale = decimals(unit).ok_or_else(|| Error::InvalidFee(input.to_owned()))?;
    decimal_to_wei(amount_str, scale).ok_or_else(|| Error::InvalidFee(input.to_owned()))
}

/// Convert a non-negative decimal string to an integer amount scaled
/// by `10^decimals`, without going through a float.
fn decimal_to_wei(amount: &str, decimals: u32) -> Option<u128> {
    if amount.is_empty() {
        return None;
    }
    let (int_part, frac_part) = match amount.split_once('.') {
        Some((i, f)) => (i, f),
        None => (amount, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if frac_part.len() > decimals as usize {
        return None;
    }

    let int_value: u128 = int_part.parse().ok()?;
    let scale = 10u128.checked_pow(decimals)?;
    let int_wei = int_value.checked_mul(scale)?;

    let frac_value: u128 = if frac_part.is_empty() {
        0
    } else {
        let padded = format!("{frac_part:0<width$}", width = decimals as usize);
        padded.parse().ok()?
    };

    int_wei.checked_add(frac_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_zero_variants() {
        assert_eq!(0, parse_fee("0").unwrap());
        assert_eq!(0, parse_fee("0 eth").unwrap());
        assert_eq!(0, parse_fee("none").unwrap());
        assert_eq!(0, parse_fee("None").unwrap());
    }

    #[test]
    fn parses_units() {
        assert_eq!(1, parse_fee("1 wei").unwrap());
        assert_eq!(1_000_000_000, parse_fee("1 gwei").unwrap());
        assert_eq!(10_000_000_000_000_000, parse_fee("0.01 eth").unwrap());
        assert_eq!(1_000_000_000_000_000_000, parse_fee("1 ether").unwrap());
    }

    #[test]
    fn defaults_to_wei_with_no_unit() {
        assert_eq!(42, parse_fee("42").unwrap());
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_fee("-1 eth").is_err());
        assert!(parse_fee("1 btc").is_err());
        assert!(parse_fee("not a number eth").is_err());
        assert!(parse_fee("1 eth extra").is_err());
        assert!(parse_fee("").is_err());
    }

    #[test]
    fn fractional_amounts_convert_exactly() {
        // Would round to the wrong wei amount if this multiplied
        // through an f64 rather than scaling the decimal string directly.
        assert_eq!(123_456_789_012_345_678, parse_fee("0.123456789012345678 eth").unwrap());
        assert_eq!(1, parse_fee("0.000000001 gwei").unwrap());
    }

    #[test]
    fn rejects_more_precision_than_the_unit_supports() {
        assert!(parse_fee("0.5 wei").is_err());
        assert!(parse_fee("0.0000000001 gwei").is_err());
    }
}
