// SPDX-License-Identifier: CC0-1.0

//! Parsing helpers for hex encoded integers.

use crate::error::{ContainsPrefixError, MissingPrefixError, ParseHexError};

/// Strips a `0x` or `0X` prefix, failing if there is none.
pub(crate) fn strip_hex_prefix(s: &str) -> Result<&str, MissingPrefixError> {
    if let Some(stripped) = s.strip_prefix("0x") {
        Ok(stripped)
    } else if let Some(stripped) = s.strip_prefix("0X") {
        Ok(stripped)
    } else {
        Err(MissingPrefixError)
    }
}

/// Fails if `s` starts with a `0x` or `0X` prefix.
pub(crate) fn reject_hex_prefix(s: &str) -> Result<&str, ContainsPrefixError> {
    if s.starts_with("0x") || s.starts_with("0X") {
        return Err(ContainsPrefixError);
    }
    Ok(s)
}

/// Checks that `s` is a non-empty run of at most `max` hex digits.
fn check_digits(s: &str, max: usize) -> Result<(), ParseHexError> {
    if s.is_empty() {
        return Err(ParseHexError::Empty);
    }
    if let Some(pos) = s.bytes().position(|b| !b.is_ascii_hexdigit()) {
        return Err(ParseHexError::InvalidChar { pos });
    }
    if s.len() > max {
        return Err(ParseHexError::TooLong { len: s.len(), max });
    }
    Ok(())
}

/// Parses an unprefixed hex string into a `u32`.
pub(crate) fn hex_u32(s: &str) -> Result<u32, ParseHexError> {
    check_digits(s, 8)?;
    Ok(u32::from_str_radix(s, 16)?)
}

/// Parses an unprefixed hex string of up to 64 digits into big-endian `(high, low)` halves.
pub(crate) fn hex_u256_halves(s: &str) -> Result<(u128, u128), ParseHexError> {
    check_digits(s, 64)?;
    // All digits are ASCII so any byte offset is a char boundary.
    if s.len() <= 32 {
        Ok((0, u128::from_str_radix(s, 16)?))
    } else {
        let (high, low) = s.split_at(s.len() - 32);
        Ok((u128::from_str_radix(high, 16)?, u128::from_str_radix(low, 16)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_u32_accepts_short_and_full_width() {
        assert_eq!(hex_u32("1").unwrap(), 1);
        assert_eq!(hex_u32("1d00ffff").unwrap(), 0x1d00_ffff);
        assert_eq!(hex_u32("FFFFFFFF").unwrap(), u32::MAX);
    }

    #[test]
    fn hex_u32_rejects_bad_input() {
        assert_eq!(hex_u32(""), Err(ParseHexError::Empty));
        assert_eq!(hex_u32("123456789"), Err(ParseHexError::TooLong { len: 9, max: 8 }));
        assert_eq!(hex_u32("+ff"), Err(ParseHexError::InvalidChar { pos: 0 }));
        assert_eq!(hex_u32("12g4"), Err(ParseHexError::InvalidChar { pos: 2 }));
    }

    const MAX_DIGITS: &str = "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";
    const TOO_MANY_DIGITS: &str =
        "1ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";

    #[test]
    fn hex_u256_splits_at_128_bits() {
        assert_eq!(hex_u256_halves("ff").unwrap(), (0, 0xff));
        let s = "1ffffffffffffffffffffffffffffffff";
        assert_eq!(hex_u256_halves(s).unwrap(), (1, u128::MAX));
        assert_eq!(hex_u256_halves(MAX_DIGITS).unwrap(), (u128::MAX, u128::MAX));
        assert!(matches!(
            hex_u256_halves(TOO_MANY_DIGITS),
            Err(ParseHexError::TooLong { len: 65, max: 64 })
        ));
    }

    #[test]
    fn prefix_handling() {
        assert_eq!(strip_hex_prefix("0xab").unwrap(), "ab");
        assert_eq!(strip_hex_prefix("0Xab").unwrap(), "ab");
        assert_eq!(strip_hex_prefix("ab"), Err(MissingPrefixError));
        assert_eq!(reject_hex_prefix("ab").unwrap(), "ab");
        assert_eq!(reject_hex_prefix("0xab"), Err(ContainsPrefixError));
    }
}
