// SPDX-License-Identifier: CC0-1.0

//! Fixed-width 256 bit unsigned integer.
//!
//! [`U256`] only provides the operations needed by the compact target codec and the ASERT
//! retarget: shifts, multiplication by a 32 bit scalar, addition, ordering and bit length. All of
//! them have fully specified overflow behaviour so results are identical on every platform.

use core::cmp::Ordering;
use core::fmt::{self, LowerHex, UpperHex};
use core::ops::{Add, Mul, Shl, Shr};

use crate::error::{PrefixedHexError, UnprefixedHexError};
use crate::parse;

/// Number of 32 bit words in a [`U256`].
const WIDTH: usize = 8;

/// Little-endian 256 bit unsigned integer.
///
/// Stored as eight 32 bit words, word 0 being the least significant.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct U256([u32; WIDTH]);

impl U256 {
    /// The maximum value, `2^256 - 1`.
    pub const MAX: U256 = U256([u32::MAX; WIDTH]);

    /// Zero.
    pub const ZERO: U256 = U256([0; WIDTH]);

    /// One.
    pub const ONE: U256 = U256([1, 0, 0, 0, 0, 0, 0, 0]);

    /// Width of the type in bits.
    pub const BITS: u32 = 256;

    /// Creates a `U256` from its words, least significant word first.
    #[inline]
    pub const fn from_words(words: [u32; 8]) -> U256 { U256(words) }

    /// Returns the words of this `U256`, least significant word first.
    #[inline]
    pub const fn to_words(self) -> [u32; 8] { self.0 }

    /// Creates a `U256` from a `u64`.
    #[inline]
    pub const fn from_u64(x: u64) -> U256 {
        U256([x as u32, (x >> 32) as u32, 0, 0, 0, 0, 0, 0])
    }

    /// Creates a `U256` from a prefixed hex string.
    pub fn from_hex(s: &str) -> Result<Self, PrefixedHexError> {
        let stripped = parse::strip_hex_prefix(s)?;
        Ok(U256::from_hex_internal(stripped)?)
    }

    /// Creates a `U256` from an unprefixed hex string.
    pub fn from_unprefixed_hex(s: &str) -> Result<Self, UnprefixedHexError> {
        let s = parse::reject_hex_prefix(s)?;
        Ok(U256::from_hex_internal(s)?)
    }

    // Caller to ensure `s` does not contain a prefix.
    fn from_hex_internal(s: &str) -> Result<Self, crate::error::ParseHexError> {
        let (high, low) = parse::hex_u256_halves(s)?;
        Ok(U256::from_u128_halves(high, low))
    }

    fn from_u128_halves(high: u128, low: u128) -> U256 {
        let mut words = [0_u32; WIDTH];
        for (i, word) in words.iter_mut().enumerate().take(4) {
            *word = (low >> (32 * i)) as u32;
        }
        for (i, word) in words.iter_mut().skip(4).enumerate() {
            *word = (high >> (32 * i)) as u32;
        }
        U256(words)
    }

    /// Creates a `U256` from a big-endian array of `u8`s.
    pub fn from_be_bytes(a: [u8; 32]) -> U256 {
        let mut words = [0_u32; WIDTH];
        for (i, chunk) in a.chunks_exact(4).rev().enumerate() {
            words[i] = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        U256(words)
    }

    /// Creates a `U256` from a little-endian array of `u8`s.
    ///
    /// This is the layout of a hash or of the proof-of-work limit as stored by consensus code.
    pub fn from_le_bytes(a: [u8; 32]) -> U256 {
        let mut words = [0_u32; WIDTH];
        for (i, chunk) in a.chunks_exact(4).enumerate() {
            words[i] = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        U256(words)
    }

    /// Converts `U256` to a big-endian array of `u8`s.
    pub fn to_be_bytes(self) -> [u8; 32] {
        let mut out = [0; 32];
        for (i, word) in self.0.iter().rev().enumerate() {
            out[4 * i..4 * i + 4].copy_from_slice(&word.to_be_bytes());
        }
        out
    }

    /// Converts `U256` to a little-endian array of `u8`s.
    pub fn to_le_bytes(self) -> [u8; 32] {
        let mut out = [0; 32];
        for (i, word) in self.0.iter().enumerate() {
            out[4 * i..4 * i + 4].copy_from_slice(&word.to_le_bytes());
        }
        out
    }

    /// Returns true if this value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool { self.0.iter().all(|w| *w == 0) }

    /// Returns the low 32 bits.
    #[inline]
    pub fn low_u32(&self) -> u32 { self.0[0] }

    /// Returns the low 64 bits.
    #[inline]
    pub fn low_u64(&self) -> u64 { u64::from(self.0[0]) | u64::from(self.0[1]) << 32 }

    /// Returns the least number of bits needed to represent the number.
    ///
    /// That is the position of the highest set bit plus one, or zero if the value is zero.
    pub fn bits(&self) -> u32 {
        for pos in (0..WIDTH).rev() {
            let word = self.0[pos];
            if word != 0 {
                return 32 * pos as u32 + (32 - word.leading_zeros());
            }
        }
        0
    }

    /// Calculates `self` + `rhs`
    ///
    /// Returns a tuple of the addition along with a boolean indicating whether an arithmetic
    /// overflow would occur. If an overflow would have occurred then the wrapped value is returned.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn overflowing_add(self, rhs: Self) -> (Self, bool) {
        let mut ret = [0_u32; WIDTH];
        let mut carry = 0_u64;
        for (i, word) in ret.iter_mut().enumerate() {
            let n = carry + u64::from(self.0[i]) + u64::from(rhs.0[i]);
            *word = n as u32; // Intentional truncation, save the low bits
            carry = n >> 32; // and carry the high bits.
        }
        (U256(ret), carry != 0)
    }

    /// Wrapping (modular) addition. Computes `self + rhs`, wrapping around at the boundary of the
    /// type.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn wrapping_add(self, rhs: Self) -> Self {
        let (ret, _overflow) = self.overflowing_add(rhs);
        ret
    }

    /// Checked addition, returns `None` if the sum does not fit in 256 bits.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.overflowing_add(rhs) {
            (ret, false) => Some(ret),
            (_, true) => None,
        }
    }

    /// Multiplication by a `u32`.
    ///
    /// # Returns
    ///
    /// The multiplication result along with a boolean indicating whether an arithmetic overflow
    /// occurred. If an overflow occurred then the value truncated to 256 bits is returned.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn overflowing_mul_u32(self, rhs: u32) -> (Self, bool) {
        let mut ret = [0_u32; WIDTH];
        let mut carry = 0_u64;
        for (i, word) in ret.iter_mut().enumerate() {
            // (2^32 - 1)^2 + (2^32 - 1) < 2^64, the partial product cannot overflow.
            let n = carry + u64::from(rhs) * u64::from(self.0[i]);
            *word = n as u32;
            carry = n >> 32;
        }
        (U256(ret), carry != 0)
    }

    /// Multiplication by a `u32`, silently truncating anything beyond 256 bits.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn wrapping_mul_u32(self, rhs: u32) -> Self {
        let (ret, _overflow) = self.overflowing_mul_u32(rhs);
        ret
    }

    /// Logical shift left.
    ///
    /// Bits shifted past bit 255 are lost; shifting by 256 or more yields zero. This is *not* the
    /// masking behaviour of the primitive `wrapping_shl`.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn shl_bits(self, shift: u32) -> Self {
        if shift >= Self::BITS {
            return U256::ZERO;
        }
        let mut ret = [0_u32; WIDTH];
        let words = (shift / 32) as usize;
        let bits = shift % 32;

        for i in 0..WIDTH - words {
            ret[i + words] |= self.0[i] << bits;
            if bits != 0 && i + words + 1 < WIDTH {
                ret[i + words + 1] |= self.0[i] >> (32 - bits);
            }
        }
        U256(ret)
    }

    /// Logical shift right.
    ///
    /// Shifting by 256 or more yields zero.
    #[must_use = "this returns the result of the operation, without modifying the original"]
    pub fn shr_bits(self, shift: u32) -> Self {
        if shift >= Self::BITS {
            return U256::ZERO;
        }
        let mut ret = [0_u32; WIDTH];
        let words = (shift / 32) as usize;
        let bits = shift % 32;

        for i in words..WIDTH {
            ret[i - words] |= self.0[i] >> bits;
            if bits != 0 && i > words {
                ret[i - words - 1] |= self.0[i] << (32 - bits);
            }
        }
        U256(ret)
    }

    /// Divides by a non-zero `u32`, returning quotient and remainder.
    ///
    /// Only used to render decimal strings.
    fn div_rem_u32(self, rhs: u32) -> (Self, u32) {
        debug_assert!(rhs != 0);
        let mut ret = [0_u32; WIDTH];
        let mut rem = 0_u64;
        for i in (0..WIDTH).rev() {
            let n = rem << 32 | u64::from(self.0[i]);
            ret[i] = (n / u64::from(rhs)) as u32;
            rem = n % u64::from(rhs);
        }
        (U256(ret), rem as u32)
    }

    /// Format `self` to `f` as a decimal when value is known to be non-zero.
    fn fmt_decimal(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const DIGITS: usize = 78; // U256::MAX has 78 base 10 digits.

        let mut buf = [0_u8; DIGITS];
        let mut i = DIGITS - 1; // We loop backwards.
        let mut cur = *self;

        loop {
            let (quotient, digit) = cur.div_rem_u32(10);
            buf[i] = digit as u8 + b'0'; // Cast after rem 10 is lossless.
            cur = quotient;
            if cur.is_zero() {
                break;
            }
            i -= 1;
        }
        match core::str::from_utf8(&buf[i..]) {
            Ok(s) => f.pad_integral(true, "", s),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl<T: Into<u128>> From<T> for U256 {
    fn from(x: T) -> Self { U256::from_u128_halves(0, x.into()) }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> Ordering {
        // Most significant word first.
        self.0.iter().rev().cmp(other.0.iter().rev())
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Add for U256 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        let (res, overflow) = self.overflowing_add(rhs);
        debug_assert!(!overflow, "Addition of U256 values overflowed");
        res
    }
}

/// Truncates to 256 bits on overflow.
impl Mul<u32> for U256 {
    type Output = Self;
    fn mul(self, rhs: u32) -> Self { self.wrapping_mul_u32(rhs) }
}

impl Shl<u32> for U256 {
    type Output = Self;
    fn shl(self, shift: u32) -> U256 { self.shl_bits(shift) }
}

impl Shr<u32> for U256 {
    type Output = Self;
    fn shr(self, shift: u32) -> U256 { self.shr_bits(shift) }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_zero() {
            f.pad_integral(true, "", "0")
        } else {
            self.fmt_decimal(f)
        }
    }
}

impl fmt::Debug for U256 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{:#x}", self) }
}

macro_rules! impl_hex {
    ($hex:ident, $case:expr) => {
        impl $hex for U256 {
            fn fmt(&self, f: &mut fmt::Formatter) -> core::fmt::Result {
                hex::fmt_hex_exact!(f, 32, &self.to_be_bytes(), $case)
            }
        }
    };
}
impl_hex!(LowerHex, hex::Case::Lower);
impl_hex!(UpperHex, hex::Case::Upper);

#[cfg(feature = "serde")]
impl crate::serde::Serialize for U256 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: crate::serde::Serializer,
    {
        struct DisplayHex(U256);

        impl fmt::Display for DisplayHex {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "{:x}", self.0) }
        }

        if serializer.is_human_readable() {
            serializer.collect_str(&DisplayHex(*self))
        } else {
            let bytes = self.to_be_bytes();
            serializer.serialize_bytes(&bytes)
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> crate::serde::Deserialize<'de> for U256 {
    fn deserialize<D: crate::serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        use hex::FromHex;

        use crate::serde::de;

        if d.is_human_readable() {
            struct HexVisitor;

            impl<'de> de::Visitor<'de> for HexVisitor {
                type Value = U256;

                fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    f.write_str("a 32 byte ASCII hex string")
                }

                fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
                where
                    E: de::Error,
                {
                    if s.len() != 64 {
                        return Err(de::Error::invalid_length(s.len(), &self));
                    }

                    let b = <[u8; 32]>::from_hex(s)
                        .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(s), &self))?;

                    Ok(U256::from_be_bytes(b))
                }
            }
            d.deserialize_str(HexVisitor)
        } else {
            struct BytesVisitor;

            impl<'de> de::Visitor<'de> for BytesVisitor {
                type Value = U256;

                fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    f.write_str("a sequence of 32 bytes")
                }

                fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
                where
                    E: de::Error,
                {
                    let b = <[u8; 32]>::try_from(v)
                        .map_err(|_| de::Error::invalid_length(v.len(), &self))?;
                    Ok(U256::from_be_bytes(b))
                }
            }

            d.deserialize_bytes(BytesVisitor)
        }
    }
}

#[cfg(kani)]
impl kani::Arbitrary for U256 {
    fn any() -> Self { U256(kani::any()) }
}

#[cfg(kani)]
mod verification {
    use super::*;

    #[kani::unwind(9)] // mul loops over 8 words so use one more than 8
    #[kani::proof]
    fn check_mul_u32() {
        let x: U256 = kani::any();
        let y: u32 = kani::any();

        let _ = x.overflowing_mul_u32(y);
    }

    #[kani::unwind(9)]
    #[kani::proof]
    fn check_shl_shr_inverse_on_small_values() {
        let x: u64 = kani::any();
        let shift: u32 = kani::any();
        kani::assume(shift < 192);

        let v = U256::from_u64(x);
        assert_eq!((v << shift) >> shift, v);
    }
}
