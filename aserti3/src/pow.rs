// SPDX-License-Identifier: CC0-1.0

//! Proof-of-work target types.
//!
//! Provides the [`Target`] type and its 32 bit [`CompactTarget`] encoding as found in the
//! difficulty field of a block header. Encoding and decoding are bit-exact with the legacy
//! consensus code, including its lossiness and its sign and overflow reporting.

use core::fmt;

use crate::error::{PrefixedHexError, UnprefixedHexError};
use crate::parse;
use crate::uint::U256;

/// Bit 23 of a compact value, the sign of the mantissa.
const SIGN_BIT: u32 = 0x0080_0000;

/// Bits 0..=22 of a compact value, the mantissa.
const MANTISSA_MASK: u32 = 0x007f_ffff;

/// A 256 bit integer representing target.
///
/// The hash of a block's header must be lower than or equal to the current target for the block
/// to be accepted by the network. The lower the target, the more difficult it is to generate a
/// block.
///
/// ref: <https://en.bitcoin.it/wiki/Target>
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(crate = "actual_serde"))]
pub struct Target(U256);

impl Target {
    /// The zero target, nothing can meet it.
    pub const ZERO: Target = Target(U256::ZERO);

    /// The proof of work limit on mainnet and testnet, `2^224 - 1`.
    ///
    /// Its compact form is `0x1d00ffff`, which decodes to the slightly lower `0xffff << 208`.
    pub const MAX_MAINNET: Target = Target(U256::from_words([
        u32::MAX,
        u32::MAX,
        u32::MAX,
        u32::MAX,
        u32::MAX,
        u32::MAX,
        u32::MAX,
        0,
    ]));

    /// The proof of work limit on regtest, `2^255 - 1`.
    pub const MAX_REGTEST: Target = Target(U256::from_words([
        u32::MAX,
        u32::MAX,
        u32::MAX,
        u32::MAX,
        u32::MAX,
        u32::MAX,
        u32::MAX,
        0x7fff_ffff,
    ]));

    /// Creates a [`Target`] from a [`U256`].
    #[inline]
    pub const fn from_u256(value: U256) -> Target { Target(value) }

    /// Returns the underlying [`U256`].
    #[inline]
    pub const fn to_u256(self) -> U256 { self.0 }

    /// Creates `Target` from a prefixed hex string.
    pub fn from_hex(s: &str) -> Result<Self, PrefixedHexError> { Ok(Target(U256::from_hex(s)?)) }

    /// Creates `Target` from an unprefixed hex string.
    pub fn from_unprefixed_hex(s: &str) -> Result<Self, UnprefixedHexError> {
        Ok(Target(U256::from_unprefixed_hex(s)?))
    }

    /// Creates `Target` from a big-endian byte array.
    #[inline]
    pub fn from_be_bytes(bytes: [u8; 32]) -> Target { Target(U256::from_be_bytes(bytes)) }

    /// Creates `Target` from a little-endian byte array.
    #[inline]
    pub fn from_le_bytes(bytes: [u8; 32]) -> Target { Target(U256::from_le_bytes(bytes)) }

    /// Converts `Target` to a big-endian byte array.
    #[inline]
    pub fn to_be_bytes(self) -> [u8; 32] { self.0.to_be_bytes() }

    /// Converts `Target` to a little-endian byte array.
    #[inline]
    pub fn to_le_bytes(self) -> [u8; 32] { self.0.to_le_bytes() }

    /// Computes the [`Target`] value from a compact representation.
    ///
    /// Only the magnitude is kept, use [`CompactTarget::decode`] to also learn whether the compact
    /// value was negative or overflowed.
    ///
    /// ref: <https://developer.bitcoin.org/reference/block_chain.html#target-nbits>
    pub fn from_compact(c: CompactTarget) -> Target { c.decode().target }

    /// Computes the compact value from a [`Target`] representation.
    ///
    /// The compact form is by definition lossy, this means that
    /// `t == Target::from_compact(t.to_compact_lossy())` does not always hold.
    pub fn to_compact_lossy(self) -> CompactTarget { CompactTarget::encode(self, false) }
}

impl fmt::Display for Target {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { fmt::Display::fmt(&self.0, f) }
}

impl_hex_fmt_delegate!(Target);

impl From<CompactTarget> for Target {
    fn from(c: CompactTarget) -> Self { Target::from_compact(c) }
}

impl From<U256> for Target {
    fn from(value: U256) -> Self { Target(value) }
}

/// Encoding of 256-bit target as 32-bit float.
///
/// Bits 24..=31 hold the size (number of significant bytes), bit 23 the sign and bits 0..=22 the
/// mantissa. This is used to encode a target into the block header. Satoshi made this part of
/// consensus code in the original version of Bitcoin, likely copying an idea from OpenSSL.
///
/// OpenSSL's bignum (BN) type has an encoding, which is even called "compact" as in bitcoin, which
/// is exactly this format.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(crate = "actual_serde"))]
pub struct CompactTarget(u32);

impl CompactTarget {
    /// Creates a `CompactTarget` from an prefixed hex string.
    pub fn from_hex(s: &str) -> Result<Self, PrefixedHexError> {
        let stripped = parse::strip_hex_prefix(s)?;
        let target = parse::hex_u32(stripped)?;
        Ok(Self::from_consensus(target))
    }

    /// Creates a `CompactTarget` from an unprefixed hex string.
    pub fn from_unprefixed_hex(s: &str) -> Result<Self, UnprefixedHexError> {
        let s = parse::reject_hex_prefix(s)?;
        let target = parse::hex_u32(s)?;
        Ok(Self::from_consensus(target))
    }

    /// Creates a [`CompactTarget`] from a consensus encoded `u32`.
    #[inline]
    pub const fn from_consensus(bits: u32) -> Self { Self(bits) }

    /// Returns the consensus encoded `u32` representation of this [`CompactTarget`].
    #[inline]
    pub const fn to_consensus(self) -> u32 { self.0 }

    /// Returns the size field, the number of significant bytes of the encoded value.
    #[inline]
    pub const fn size(self) -> u32 { self.0 >> 24 }

    /// Returns the 23 bit mantissa.
    #[inline]
    pub const fn mantissa(self) -> u32 { self.0 & MANTISSA_MASK }

    /// Encodes `target` in compact form, setting the sign bit if `negative` and the mantissa is
    /// not zero.
    ///
    /// The mantissa keeps the three most significant bytes of `target`; everything below is
    /// truncated.
    ///
    /// # Panics
    ///
    /// If the packed mantissa exceeds 23 bits or the size does not fit in a byte. Neither can
    /// happen for a 256 bit input, a panic here means the arithmetic above is broken.
    pub fn encode(target: Target, negative: bool) -> CompactTarget {
        let value = target.0;
        let mut size = (value.bits() + 7) / 8;
        let mut compact = if size <= 3 {
            (value.low_u64() << (8 * (3 - size))) as u32
        } else {
            let bn = value >> (8 * (size - 3));
            bn.low_u64() as u32
        };

        // The 0x00800000 bit denotes the sign. If it is already set, divide the mantissa by 256
        // and increase the exponent.
        if (compact & SIGN_BIT) != 0 {
            compact >>= 8;
            size += 1;
        }

        assert_eq!(compact & !MANTISSA_MASK, 0, "compact mantissa {:#x} exceeds 23 bits", compact);
        assert!(size < 256, "compact size {} does not fit in a byte", size);

        compact |= size << 24;
        if negative && (compact & MANTISSA_MASK) != 0 {
            compact |= SIGN_BIT;
        }
        CompactTarget(compact)
    }

    /// Decodes this compact value.
    ///
    /// Values whose size and mantissa cannot be represented in 256 bits are reported through
    /// [`DecodedTarget::overflow`], their `target` is the truncated shift result and must not be
    /// used for anything but diagnostics.
    pub fn decode(self) -> DecodedTarget {
        let size = self.size();
        let word = self.mantissa();

        let value = if size <= 3 {
            U256::from(word >> (8 * (3 - size)))
        } else {
            U256::from(word) << (8 * (size - 3))
        };

        let negative = word != 0 && (self.0 & SIGN_BIT) != 0;
        let overflow = word != 0
            && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));

        DecodedTarget { target: Target(value), negative, overflow }
    }
}

impl From<Target> for CompactTarget {
    fn from(t: Target) -> Self { t.to_compact_lossy() }
}

impl_hex_fmt_delegate!(CompactTarget);

/// Result of decoding a [`CompactTarget`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DecodedTarget {
    /// The magnitude encoded by the compact value.
    pub target: Target,
    /// The sign bit was set on a non-zero mantissa.
    pub negative: bool,
    /// The encoded value does not fit in 256 bits.
    pub overflow: bool,
}

impl DecodedTarget {
    /// Returns true if the compact value was neither negative nor overflowing.
    #[inline]
    pub fn is_valid(&self) -> bool { !self.negative && !self.overflow }
}

#[cfg(test)]
mod tests {
    use alloc::format;

    use super::*;

    fn target(hex: &str) -> Target { Target::from_hex(hex).unwrap() }

    #[test]
    fn compact_target_from_hex_lower() {
        let target = CompactTarget::from_hex("0x010034ab").unwrap();
        assert_eq!(target, CompactTarget(0x010034ab));
    }

    #[test]
    fn compact_target_from_hex_upper() {
        let target = CompactTarget::from_hex("0X010034AB").unwrap();
        assert_eq!(target, CompactTarget(0x010034ab));
    }

    #[test]
    fn compact_target_from_unprefixed_hex() {
        let target = CompactTarget::from_unprefixed_hex("1d00ffff").unwrap();
        assert_eq!(target, CompactTarget(0x1d00ffff));
        assert!(CompactTarget::from_unprefixed_hex("0x1d00ffff").is_err());
        assert!(CompactTarget::from_hex("1d00ffff").is_err());
        assert!(CompactTarget::from_hex("0x1d00ffff0").is_err());
    }

    #[test]
    fn compact_target_fields() {
        let c = CompactTarget::from_consensus(0x1d80_ffff);
        assert_eq!(c.size(), 0x1d);
        assert_eq!(c.mantissa(), 0xffff);
        assert_eq!(format!("{:x}", c), "1d80ffff");
        assert_eq!(format!("{:#X}", c), "0x1D80FFFF");
    }

    #[test]
    fn decode_small_sizes_shift_mantissa_down() {
        let cases: [(u32, u32); 6] = [
            (0x0000_0080, 0x0),
            (0x0080_0000, 0x0),
            (0x0100_3456, 0x0),
            (0x0112_3456, 0x12),
            (0x0212_3456, 0x1234),
            (0x0312_3456, 0x12_3456),
        ];
        for (compact, value) in cases {
            let decoded = CompactTarget(compact).decode();
            assert_eq!(decoded.target, Target(U256::from(value)), "{:#x}", compact);
            assert!(!decoded.negative);
            assert!(!decoded.overflow);
        }
    }

    #[test]
    fn decode_large_sizes_shift_mantissa_up() {
        let decoded = CompactTarget(0x0412_3456).decode();
        assert_eq!(decoded.target, Target(U256::from(0x1234_5600_u32)));

        let decoded = CompactTarget(0x0500_9234).decode();
        assert_eq!(decoded.target, Target(U256::from(0x9234_0000_u32)));
        assert!(!decoded.negative);

        let decoded = CompactTarget(0x2012_3456).decode();
        assert_eq!(
            decoded.target,
            target("0x1234560000000000000000000000000000000000000000000000000000000000")
        );
        assert!(decoded.is_valid());
    }

    #[test]
    fn decode_reports_sign() {
        let decoded = CompactTarget(0x0492_3456).decode();
        assert_eq!(decoded.target, Target(U256::from(0x1234_5600_u32)));
        assert!(decoded.negative);
        assert!(!decoded.overflow);
        assert!(!decoded.is_valid());

        // A zero mantissa is never negative.
        let decoded = CompactTarget(0x0480_0000).decode();
        assert_eq!(decoded.target, Target::ZERO);
        assert!(!decoded.negative);
    }

    #[test]
    fn decode_overflow_boundaries() {
        let cases = [
            (0x2300_0001, true),  // size 35
            (0x2200_00ff, false), // size 34, one byte mantissa
            (0x2200_0100, true),
            (0x2100_ffff, false), // size 33, two byte mantissa
            (0x2101_0000, true),
            (0x2100_0100, false),
            (0x2000_ffff, false), // size 32
            (0x2001_0000, false),
            (0x207f_ffff, false),
            (0xff12_3456, true),
            (0xff00_0000, false), // zero mantissa never overflows
        ];
        for (compact, overflow) in cases {
            assert_eq!(CompactTarget(compact).decode().overflow, overflow, "{:#x}", compact);
        }
    }

    #[test]
    fn encode_renormalizes_mantissa_with_sign_bit() {
        assert_eq!(
            CompactTarget::encode(Target(U256::from(0x80_u32)), false),
            CompactTarget(0x0200_8000)
        );
        assert_eq!(
            CompactTarget::encode(Target(U256::ONE << 255), false),
            CompactTarget(0x2100_8000)
        );
    }

    #[test]
    fn encode_truncates_to_three_bytes() {
        assert_eq!(Target(U256::from(0x1234_u32)).to_compact_lossy(), CompactTarget(0x0212_3400));
        let exact = Target(U256::from(0x1234_5600_u32));
        assert_eq!(exact.to_compact_lossy(), CompactTarget(0x0412_3456));
        let truncated = Target(U256::from(0x1234_5678_u32));
        assert_eq!(truncated.to_compact_lossy(), CompactTarget(0x0412_3456));
        assert_eq!(Target::ZERO.to_compact_lossy(), CompactTarget(0));
    }

    #[test]
    fn encode_sets_sign_only_for_non_zero_mantissa() {
        let t = Target(U256::from(0x1234_5600_u32));
        assert_eq!(CompactTarget::encode(t, true), CompactTarget(0x0492_3456));
        assert_eq!(CompactTarget::encode(Target::ZERO, true), CompactTarget(0));
    }

    #[test]
    fn compact_round_trip_when_mantissa_fits() {
        let canonical = [
            0x0112_0000,
            0x0212_3400,
            0x0312_3456,
            0x0412_3456,
            0x0492_3456,
            0x0500_9234,
            0x1d00_ffff,
            0x2012_3456,
        ];
        for compact in canonical {
            let decoded = CompactTarget(compact).decode();
            let encoded = CompactTarget::encode(decoded.target, decoded.negative);
            assert_eq!(encoded, CompactTarget(compact), "{:#x}", compact);
        }
    }

    #[test]
    fn mainnet_limit() {
        assert_eq!(
            Target::MAX_MAINNET,
            target("0x00000000ffffffffffffffffffffffffffffffffffffffffffffffffffffffff")
        );
        assert_eq!(Target::MAX_MAINNET.to_compact_lossy(), CompactTarget(0x1d00_ffff));
        assert_eq!(
            Target::from_compact(CompactTarget(0x1d00_ffff)),
            target("0x00000000ffff0000000000000000000000000000000000000000000000000000")
        );
        assert_eq!(Target::MAX_REGTEST.to_compact_lossy(), CompactTarget(0x207f_ffff));
    }

    #[test]
    fn target_byte_conversions() {
        let t = Target::MAX_MAINNET;
        assert_eq!(Target::from_le_bytes(t.to_le_bytes()), t);
        assert_eq!(Target::from_be_bytes(t.to_be_bytes()), t);
        assert_eq!(t.to_le_bytes()[31], 0);
        assert_eq!(t.to_be_bytes()[0], 0);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn compact_target_serde() {
        use serde_test::{assert_tokens, Token};

        assert_tokens(
            &CompactTarget(0x1d00_ffff),
            &[Token::NewtypeStruct { name: "CompactTarget" }, Token::U32(0x1d00_ffff)],
        );
    }
}
