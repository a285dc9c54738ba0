// SPDX-License-Identifier: CC0-1.0

//! Absolutely scheduled exponentially weighted target (ASERT).
//!
//! ASERT defines an ideal schedule for block issuance (one block every
//! [`Params::pow_target_spacing`] seconds, counted from an anchor block) and sets the target
//! exponentially from how far the chain tip is ahead of or behind that schedule. For every
//! [`TAU`] seconds ahead of schedule the target doubles, for every [`TAU`] seconds behind it
//! halves:
//!
//! ```text
//! next_target = anchor_target * 2^((time_diff - spacing * (height_diff + 1)) / tau)
//! ```
//!
//! Only integer arithmetic is used. The exponent is a fixed-point number with [`RADIX_BITS`]
//! fractional bits; its integer part becomes a shift of the anchor target and its fractional part
//! is fed to a cubic approximation of `2^x`. The polynomial coefficients are consensus critical.

use core::fmt;

use tracing::{debug, trace};

use crate::consensus::Params;
use crate::pow::{CompactTarget, Target};
use crate::uint::U256;

/// Seconds ahead of (or behind) schedule for the target to double (or halve): two days.
pub const TAU: i64 = 2 * 24 * 60 * 60;

/// Number of fractional bits in the fixed-point exponent.
pub const RADIX_BITS: u32 = 16;

const RADIX: i128 = 1 << RADIX_BITS;

// Exponents beyond 257 whole shifts either clear every target or push every non-zero target past
// 256 bits, so larger magnitudes are clamped here.
const EXPONENT_BOUND: i128 = 257 << RADIX_BITS;

// 2^x ~= 1 + 0.695502049*x + 0.2262698*x^2 + 0.0782318*x^3 for 0 <= x < 1, scaled by 2^48 for the
// linear term and by 2^16 per power of x. Error versus 2^x is below 0.013%.
const POLY_LINEAR: u64 = 195_766_423_245_049;
const POLY_QUADRATIC: u64 = 971_821_376;
const POLY_CUBIC: u64 = 5_127;
const POLY_ROUNDING: u64 = 1 << 47;

/// The block recorded when the retarget rule activated. All schedules are counted from it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(crate = "actual_serde"))]
pub struct AnchorBlock {
    /// Header timestamp, seconds since the epoch.
    pub time: u32,
    /// Height in the chain.
    pub height: i64,
    /// Difficulty field of the header.
    pub bits: CompactTarget,
}

/// The current chain tip, the parent of the block whose target is being computed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(crate = "actual_serde"))]
pub struct PrevBlock {
    /// Header timestamp, seconds since the epoch.
    pub time: u32,
    /// Height in the chain.
    pub height: i64,
}

/// Computes the compact target required of the block following `prev`.
///
/// `candidate_time` is the timestamp of that next block, it only matters on networks that allow
/// min-difficulty blocks: if the candidate comes more than two block spacings after `prev` it may
/// be mined at the proof of work limit.
///
/// The result never exceeds `params.pow_limit` and is always non-negative.
///
/// # Panics
///
/// If `prev` is lower than [`Params::difficulty_adjustment_interval`], or if the anchor's
/// difficulty field is negative or overflows. Both mean the caller picked the wrong blocks; no
/// header data can cause them.
pub fn next_target_required(
    prev: &PrevBlock,
    anchor: &AnchorBlock,
    params: impl AsRef<Params>,
    candidate_time: u32,
) -> CompactTarget {
    let params = params.as_ref();

    // Special difficulty rule for test networks: if the new block's timestamp is more than two
    // spacings after its parent, allow mining a min-difficulty block.
    if params.allow_min_difficulty_blocks
        && i128::from(candidate_time)
            > i128::from(prev.time) + 2 * i128::from(params.pow_target_spacing)
    {
        debug!(
            prev_time = prev.time,
            candidate_time, "candidate block is late, allowing a min-difficulty block"
        );
        return params.pow_limit.to_compact_lossy();
    }

    assert!(
        prev.height >= params.difficulty_adjustment_interval(),
        "chain tip at height {} is below the difficulty adjustment interval {}",
        prev.height,
        params.difficulty_adjustment_interval()
    );

    let decoded = anchor.bits.decode();
    assert!(
        decoded.is_valid(),
        "anchor block at height {} has an invalid difficulty field {:#010x}",
        anchor.height,
        anchor.bits
    );

    let time_diff = i128::from(prev.time) - i128::from(anchor.time);
    let height_diff = i128::from(prev.height) - i128::from(anchor.height);
    let next = retarget(decoded.target.to_u256(), time_diff, height_diff, params);

    if next > params.pow_limit {
        debug!(tip = prev.height, "target above the proof of work limit, clamping");
        return params.pow_limit.to_compact_lossy();
    }
    next.to_compact_lossy()
}

/// Scales `anchor_target` by `2^((time_diff - spacing * (height_diff + 1)) / tau)`.
///
/// Returns `params.pow_limit` if the exact result would not fit in 256 bits.
fn retarget(anchor_target: U256, time_diff: i128, height_diff: i128, params: &Params) -> Target {
    // Saturating arithmetic only kicks in far beyond `EXPONENT_BOUND`, where the result no longer
    // depends on the exact exponent.
    let ideal = i128::from(params.pow_target_spacing).saturating_mul(height_diff.saturating_add(1));
    // Division truncates toward zero.
    let exponent = time_diff.saturating_sub(ideal).saturating_mul(RADIX) / i128::from(TAU);
    let exponent = exponent.clamp(-EXPONENT_BOUND, EXPONENT_BOUND) as i64;

    // Split with 2^x = 2^n * 2^(x - n). The shift count is the floor of the exponent so the
    // remainder always lands in [0, 1).
    let shifts = exponent.div_euclid(RADIX as i64);
    let fraction = exponent.rem_euclid(RADIX as i64) as u64;

    let shifted = if shifts < 0 {
        // Shifting by 256 or more clears the value.
        anchor_target >> shifts.unsigned_abs() as u32
    } else {
        let room = i64::from(U256::BITS - anchor_target.bits());
        if !anchor_target.is_zero() && shifts > room {
            // The exact target exceeds every 256 bit limit.
            debug!(shifts, "target shifted past 256 bits, clamping");
            return params.pow_limit;
        }
        anchor_target << shifts as u32
    };

    let factor = pow2_fraction(fraction);
    trace!(exponent, shifts, fraction, factor, "retarget exponent");

    match shifted.checked_add(mul_shr_radix(shifted, factor)) {
        Some(next) => Target::from_u256(next),
        None => {
            debug!("target exceeded 256 bits after the fractional step");
            params.pow_limit
        }
    }
}

/// Evaluates `2^(fraction / 2^16) - 1` scaled by `2^16`, for `fraction < 2^16`.
fn pow2_fraction(fraction: u64) -> u32 {
    debug_assert!(fraction < 1 << RADIX_BITS);
    // With fraction < 2^16 the sum stays below 2^64 and the factor is at most 65535.
    let factor = (POLY_LINEAR * fraction
        + POLY_QUADRATIC * fraction * fraction
        + POLY_CUBIC * fraction * fraction * fraction
        + POLY_ROUNDING)
        >> (RADIX_BITS * 3);
    factor as u32
}

/// Computes `(value * factor) >> 16` without losing the bits that `value * factor` would carry
/// past 256 bits.
fn mul_shr_radix(value: U256, factor: u32) -> U256 {
    // value * factor = (high * 2^16 + low) * factor, so the shifted product is
    // high * factor + (low * factor) >> 16 exactly.
    let high = value >> RADIX_BITS;
    let low = u64::from(value.low_u32() & 0xffff);
    let carry = (low * u64::from(factor)) >> RADIX_BITS;
    high.wrapping_mul_u32(factor).wrapping_add(U256::from_u64(carry))
}

/// Checks the difficulty field of a header against the value the retarget rule requires.
pub fn check_bits(header_bits: CompactTarget, required: CompactTarget) -> Result<(), BitsError> {
    let decoded = header_bits.decode();
    if decoded.negative {
        return Err(BitsError::Negative(header_bits));
    }
    if decoded.overflow {
        return Err(BitsError::Overflow(header_bits));
    }
    if header_bits != required {
        return Err(BitsError::Mismatch { expected: required, actual: header_bits });
    }
    Ok(())
}

/// A header's difficulty field is not the one the retarget rule requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BitsError {
    /// The difficulty field encodes a negative target.
    Negative(CompactTarget),
    /// The difficulty field encodes a target wider than 256 bits.
    Overflow(CompactTarget),
    /// The difficulty field is well formed but differs from the required one.
    Mismatch {
        /// The required difficulty field.
        expected: CompactTarget,
        /// The difficulty field found in the header.
        actual: CompactTarget,
    },
}

impl fmt::Display for BitsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use BitsError::*;

        match *self {
            Negative(bits) => write!(f, "difficulty field {:#010x} is negative", bits),
            Overflow(bits) => write!(f, "difficulty field {:#010x} overflows 256 bits", bits),
            Mismatch { expected, actual } => write!(
                f,
                "incorrect difficulty field: expected {:#010x}, got {:#010x}",
                expected, actual
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BitsError {}
