// SPDX-License-Identifier: CC0-1.0

//! Contains error types and other error handling tools.

use core::fmt;

#[rustfmt::skip]                // Keep public re-exports separate.
#[doc(inline)]
pub use crate::{
    asert::BitsError,
    consensus::params::InvalidParamsError,
    network::ParseNetworkError,
};

/// Error returned when parsing a hex string that is required to have a `0x` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefixedHexError {
    /// Hex string is missing the `0x` prefix.
    MissingPrefix(MissingPrefixError),
    /// Error parsing the digits that follow the prefix.
    ParseHex(ParseHexError),
}

impl fmt::Display for PrefixedHexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use PrefixedHexError::*;

        match *self {
            MissingPrefix(ref e) => write_err!(f, "hex string is missing prefix"; e),
            ParseHex(ref e) => write_err!(f, "prefixed hex string invalid"; e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PrefixedHexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use PrefixedHexError::*;

        match *self {
            MissingPrefix(ref e) => Some(e),
            ParseHex(ref e) => Some(e),
        }
    }
}

impl From<MissingPrefixError> for PrefixedHexError {
    fn from(e: MissingPrefixError) -> Self { Self::MissingPrefix(e) }
}

impl From<ParseHexError> for PrefixedHexError {
    fn from(e: ParseHexError) -> Self { Self::ParseHex(e) }
}

/// Error returned when parsing a hex string that must not have a `0x` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnprefixedHexError {
    /// Hex string contains a `0x` prefix.
    ContainsPrefix(ContainsPrefixError),
    /// Error parsing the digits.
    ParseHex(ParseHexError),
}

impl fmt::Display for UnprefixedHexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use UnprefixedHexError::*;

        match *self {
            ContainsPrefix(ref e) => write_err!(f, "hex string contains prefix"; e),
            ParseHex(ref e) => write_err!(f, "hex string invalid"; e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnprefixedHexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use UnprefixedHexError::*;

        match *self {
            ContainsPrefix(ref e) => Some(e),
            ParseHex(ref e) => Some(e),
        }
    }
}

impl From<ContainsPrefixError> for UnprefixedHexError {
    fn from(e: ContainsPrefixError) -> Self { Self::ContainsPrefix(e) }
}

impl From<ParseHexError> for UnprefixedHexError {
    fn from(e: ParseHexError) -> Self { Self::ParseHex(e) }
}

/// Error when hex string is missing a prefix (e.g. `0x`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct MissingPrefixError;

impl fmt::Display for MissingPrefixError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("hex string is missing a 0x prefix")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MissingPrefixError {}

/// Error when hex string contains a prefix (e.g. `0x`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ContainsPrefixError;

impl fmt::Display for ContainsPrefixError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("hex string contains a 0x prefix")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ContainsPrefixError {}

/// Error parsing the digits of a hex encoded integer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseHexError {
    /// No digits were given.
    Empty,
    /// More digits than the integer type can hold.
    TooLong {
        /// Number of digits in the input.
        len: usize,
        /// Maximum number of digits accepted.
        max: usize,
    },
    /// A character that is not a hex digit.
    InvalidChar {
        /// Byte offset of the offending character.
        pos: usize,
    },
    /// Integer conversion failed.
    Int(core::num::ParseIntError),
}

impl fmt::Display for ParseHexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ParseHexError::*;

        match *self {
            Empty => f.write_str("empty hex string"),
            TooLong { len, max } =>
                write!(f, "hex string has {} digits, at most {} are allowed", len, max),
            InvalidChar { pos } => write!(f, "invalid hex character at position {}", pos),
            Int(ref e) => write_err!(f, "integer conversion failed"; e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseHexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use ParseHexError::*;

        match *self {
            Int(ref e) => Some(e),
            Empty | TooLong { .. } | InvalidChar { .. } => None,
        }
    }
}

impl From<core::num::ParseIntError> for ParseHexError {
    fn from(e: core::num::ParseIntError) -> Self { Self::Int(e) }
}
