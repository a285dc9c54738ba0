// SPDX-License-Identifier: CC0-1.0

//! Consensus.
//!
//! This module defines the consensus parameters that influence the proof-of-work target of every
//! block. All nodes on a network must agree on them.

pub mod params;

#[rustfmt::skip]                // Keep public re-exports separate.
#[doc(inline)]
pub use self::params::Params;
