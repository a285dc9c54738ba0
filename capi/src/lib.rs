// SPDX-License-Identifier: CC0-1.0

//! C interface to `aserti3`.
//!
//! Blocks and parameters cross the boundary as plain `#[repr(C)]` structures, 256 bit values as
//! 32 little-endian bytes. The declarations live in `include/aserti3.h`.
//!
//! Passing a null pointer, malformed parameters or blocks that violate the retarget preconditions
//! is a caller bug; these functions abort the process rather than return.

use std::panic::{self, UnwindSafe};
use std::process;

use aserti3::{AnchorBlock, CompactTarget, Network, Params, PrevBlock, Target};
use tracing::error;

/// Decoded target had its sign bit set.
pub const ASERTI3_NEGATIVE: u32 = 1;
/// Decoded target does not fit in 256 bits.
pub const ASERTI3_OVERFLOW: u32 = 2;

/// Network identifiers accepted by [`aserti3_params_for_network`].
pub const ASERTI3_MAINNET: i32 = 0;
/// Testnet.
pub const ASERTI3_TESTNET: i32 = 1;
/// Regtest.
pub const ASERTI3_REGTEST: i32 = 2;
/// A network this interface has no identifier for. Rejected wherever parameters are read back.
pub const ASERTI3_UNKNOWN_NETWORK: i32 = -1;

/// Header fields of a block.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AsertBlock {
    /// Header timestamp.
    pub time: u32,
    /// Height in the chain.
    pub height: i64,
    /// Difficulty field, ignored for the chain tip.
    pub bits: u32,
}

/// Consensus parameters.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AsertParams {
    /// One of the `ASERTI3_*NET` identifiers.
    pub network: i32,
    /// Proof of work limit, little-endian.
    pub pow_limit: [u8; 32],
    /// Whether late blocks may be mined at the proof of work limit.
    pub allow_min_difficulty_blocks: bool,
    /// Target block spacing in seconds.
    pub pow_target_spacing: i64,
    /// Difficulty adjustment timespan in seconds.
    pub pow_target_timespan: i64,
}

impl From<&Params> for AsertParams {
    fn from(params: &Params) -> Self {
        AsertParams {
            network: network_id(params.network),
            pow_limit: params.pow_limit.to_le_bytes(),
            allow_min_difficulty_blocks: params.allow_min_difficulty_blocks,
            pow_target_spacing: params.pow_target_spacing,
            pow_target_timespan: params.pow_target_timespan,
        }
    }
}

fn network_id(network: Network) -> i32 {
    match network {
        Network::Mainnet => ASERTI3_MAINNET,
        Network::Testnet => ASERTI3_TESTNET,
        Network::Regtest => ASERTI3_REGTEST,
        _ => ASERTI3_UNKNOWN_NETWORK,
    }
}

fn network_from_id(id: i32) -> Option<Network> {
    match id {
        ASERTI3_MAINNET => Some(Network::Mainnet),
        ASERTI3_TESTNET => Some(Network::Testnet),
        ASERTI3_REGTEST => Some(Network::Regtest),
        _ => None,
    }
}

fn params_from_c(params: &AsertParams) -> Params {
    let network = match network_from_id(params.network) {
        Some(network) => network,
        None => fatal(format_args!("unknown network identifier {}", params.network)),
    };
    let params = Params {
        network,
        pow_limit: Target::from_le_bytes(params.pow_limit),
        allow_min_difficulty_blocks: params.allow_min_difficulty_blocks,
        pow_target_spacing: params.pow_target_spacing,
        pow_target_timespan: params.pow_target_timespan,
    };
    if let Err(e) = params.validate() {
        fatal(format_args!("invalid consensus parameters: {}", e));
    }
    params
}

fn fatal(reason: core::fmt::Arguments) -> ! {
    error!("aborting: {}", reason);
    process::abort()
}

/// Runs `f`, aborting instead of unwinding into the caller.
fn guarded<T>(f: impl FnOnce() -> T + UnwindSafe) -> T {
    match panic::catch_unwind(f) {
        Ok(value) => value,
        Err(_) => process::abort(),
    }
}

/// Dereferences `ptr`, aborting on null.
///
/// # Safety
///
/// `ptr` must be null or valid for reads of `T`.
unsafe fn deref<'a, T>(ptr: *const T, what: &str) -> &'a T {
    match ptr.as_ref() {
        Some(value) => value,
        None => fatal(format_args!("null {} pointer", what)),
    }
}

/// Computes the difficulty field required of the block following `prev`.
///
/// `anchor` is the block recorded when the rule activated, `candidate_time` the timestamp of the
/// block being built or validated.
///
/// # Safety
///
/// All pointers must be valid for reads of their type.
#[no_mangle]
pub unsafe extern "C" fn aserti3_next_target_required(
    prev: *const AsertBlock,
    anchor: *const AsertBlock,
    params: *const AsertParams,
    candidate_time: u32,
) -> u32 {
    let prev = deref(prev, "prev block");
    let anchor = deref(anchor, "anchor block");
    let params = params_from_c(deref(params, "params"));

    let prev = PrevBlock { time: prev.time, height: prev.height };
    let anchor = AnchorBlock {
        time: anchor.time,
        height: anchor.height,
        bits: CompactTarget::from_consensus(anchor.bits),
    };
    guarded(move || {
        aserti3::next_target_required(&prev, &anchor, &params, candidate_time).to_consensus()
    })
}

/// Fills `out` with the preset parameters of `network`.
///
/// Returns 0 on success, -1 if the network identifier is unknown (`out` is left untouched).
///
/// # Safety
///
/// `out` must be valid for writes of [`AsertParams`].
#[no_mangle]
pub unsafe extern "C" fn aserti3_params_for_network(network: i32, out: *mut AsertParams) -> i32 {
    if out.is_null() {
        fatal(format_args!("null params pointer"));
    }
    match network_from_id(network) {
        Some(network) => {
            out.write(AsertParams::from(network.params()));
            0
        }
        None => -1,
    }
}

/// Decodes a compact target into 32 little-endian bytes.
///
/// Returns a combination of [`ASERTI3_NEGATIVE`] and [`ASERTI3_OVERFLOW`], zero for a valid
/// target.
///
/// # Safety
///
/// `target_le` must be valid for writes of 32 bytes.
#[no_mangle]
pub unsafe extern "C" fn aserti3_decode_compact(bits: u32, target_le: *mut [u8; 32]) -> u32 {
    if target_le.is_null() {
        fatal(format_args!("null target pointer"));
    }
    let decoded = CompactTarget::from_consensus(bits).decode();
    target_le.write(decoded.target.to_le_bytes());

    let mut flags = 0;
    if decoded.negative {
        flags |= ASERTI3_NEGATIVE;
    }
    if decoded.overflow {
        flags |= ASERTI3_OVERFLOW;
    }
    flags
}

/// Encodes 32 little-endian bytes as a compact target, setting the sign bit if `negative` and the
/// mantissa is non-zero.
///
/// # Safety
///
/// `target_le` must be valid for reads of 32 bytes.
#[no_mangle]
pub unsafe extern "C" fn aserti3_encode_compact(target_le: *const [u8; 32], negative: bool) -> u32 {
    let target = Target::from_le_bytes(*deref(target_le, "target"));
    guarded(move || CompactTarget::encode(target, negative).to_consensus())
}
