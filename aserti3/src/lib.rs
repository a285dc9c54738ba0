// SPDX-License-Identifier: CC0-1.0

//! # ASERT proof-of-work targets
//!
//! This library computes the proof-of-work target a node must enforce for the next block using
//! the absolutely scheduled exponentially weighted target algorithm (aserti3 with a two day
//! half-life).
//!
//! Every node must derive bit-identical targets from identical inputs, so everything here is done
//! with fixed-width integer arithmetic: a 256 bit unsigned integer ([`U256`]), the lossy "compact"
//! encoding used by the block header difficulty field ([`CompactTarget`]) and a fixed-point
//! approximation of `2^x` in [`asert`].
//!
//! ## Available feature flags
//!
//! * `std` - the usual dependency on `std` (default).
//! * `alloc` - enables the in-memory [`chain::HeaderChain`].
//! * `serde` - (dependency), implements `serde`-based serialization and deserialization.
//!
//! ```
//! use aserti3::{next_target_required, AnchorBlock, CompactTarget, Params, PrevBlock};
//!
//! let anchor = AnchorBlock {
//!     time: 1_000_000,
//!     height: 3_000,
//!     bits: CompactTarget::from_consensus(0x1c0f_fff0),
//! };
//! // Exactly on schedule: the target does not move.
//! let prev = PrevBlock { time: 1_001_200, height: 3_001 };
//! let next = next_target_required(&prev, &anchor, &Params::MAINNET, 1_001_800);
//! assert_eq!(next, anchor.bits);
//! ```

#![no_std]
// Experimental features we need.
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
// Coding conventions.
#![warn(missing_docs)]
// Exclude lints we don't think are valuable.
#![allow(clippy::needless_question_mark)] // https://github.com/rust-bitcoin/rust-bitcoin/pull/2134
#![allow(clippy::manual_range_contains)] // More readable than clippy's format.

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "serde")]
#[macro_use]
extern crate actual_serde as serde;

#[macro_use]
mod internal_macros;

pub mod asert;
#[cfg(feature = "alloc")]
pub mod chain;
pub mod consensus;
pub mod error;
pub mod network;
mod parse;
pub mod pow;
pub mod uint;

#[rustfmt::skip]                // Keep public re-exports separate.
#[doc(inline)]
pub use crate::{
    asert::{check_bits, next_target_required, AnchorBlock, PrevBlock},
    consensus::Params,
    network::Network,
    pow::{CompactTarget, DecodedTarget, Target},
    uint::U256,
};
