// SPDX-License-Identifier: CC0-1.0

//! Chain index.
//!
//! The retarget rule only needs a few fields of two blocks: the chain tip and the anchor. This
//! module resolves them from anything implementing [`BlockLookup`], and provides [`HeaderChain`],
//! a simple in-memory index of consecutive headers.
//!
//! ```
//! use aserti3::chain::{next_work_required, BlockLookup, HeaderChain};
//! use aserti3::{CompactTarget, Params};
//!
//! let bits = CompactTarget::from_consensus(0x1c0f_fff0);
//! let mut chain = HeaderChain::new(0);
//! for height in 0..=2016 {
//!     chain.push(height as u32 * 600, bits);
//! }
//! let tip = chain.tip().unwrap();
//! // The schedule counts from the anchor's parent, so a steady chain runs one spacing late and
//! // the target creeps up.
//! let next = next_work_required(&chain, 2015, tip.time + 600, &Params::MAINNET);
//! assert_eq!(next, CompactTarget::from_consensus(0x1c0f_f628));
//! ```

use alloc::vec::Vec;

use tracing::debug;

use crate::asert::{self, AnchorBlock, BitsError, PrevBlock};
use crate::consensus::Params;
use crate::pow::CompactTarget;

/// Header fields the retarget rule reads.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(crate = "actual_serde"))]
pub struct BlockSummary {
    /// Block height.
    pub height: i64,
    /// Header timestamp, seconds since the epoch.
    pub time: u32,
    /// Difficulty field of the header.
    pub bits: CompactTarget,
}

impl From<BlockSummary> for PrevBlock {
    fn from(block: BlockSummary) -> Self { PrevBlock { time: block.time, height: block.height } }
}

impl From<BlockSummary> for AnchorBlock {
    fn from(block: BlockSummary) -> Self {
        AnchorBlock { time: block.time, height: block.height, bits: block.bits }
    }
}

/// Resolves blocks of the active chain by height.
pub trait BlockLookup {
    /// Returns the block at `height`, if the chain is at least that long.
    fn block_at(&self, height: i64) -> Option<BlockSummary>;

    /// Returns the last block of the chain.
    fn tip(&self) -> Option<BlockSummary>;
}

impl<T: BlockLookup + ?Sized> BlockLookup for &T {
    fn block_at(&self, height: i64) -> Option<BlockSummary> { (**self).block_at(height) }

    fn tip(&self) -> Option<BlockSummary> { (**self).tip() }
}

/// Consecutive headers starting at some base height, stored in a vector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderChain {
    base_height: i64,
    blocks: Vec<BlockSummary>,
}

impl HeaderChain {
    /// Creates an empty chain whose first block will have height `base_height`.
    pub fn new(base_height: i64) -> Self { HeaderChain { base_height, blocks: Vec::new() } }

    /// Appends a header on top of the tip and returns its height.
    pub fn push(&mut self, time: u32, bits: CompactTarget) -> i64 {
        let height = self.base_height + self.blocks.len() as i64;
        self.blocks.push(BlockSummary { height, time, bits });
        height
    }

    /// Returns the block at `height`.
    pub fn get(&self, height: i64) -> Option<&BlockSummary> {
        let index = usize::try_from(height.checked_sub(self.base_height)?).ok()?;
        self.blocks.get(index)
    }

    /// Height of the first block.
    pub fn base_height(&self) -> i64 { self.base_height }

    /// Number of blocks in the chain.
    pub fn len(&self) -> usize { self.blocks.len() }

    /// Returns true if no block was pushed yet.
    pub fn is_empty(&self) -> bool { self.blocks.is_empty() }

    /// Iterates over the blocks from the lowest height up.
    pub fn iter(&self) -> core::slice::Iter<'_, BlockSummary> { self.blocks.iter() }
}

impl BlockLookup for HeaderChain {
    fn block_at(&self, height: i64) -> Option<BlockSummary> { self.get(height).copied() }

    fn tip(&self) -> Option<BlockSummary> { self.blocks.last().copied() }
}

/// Computes the difficulty field required of the block following the tip of `chain`.
///
/// # Panics
///
/// If the chain is empty or has no block at `anchor_height`, or on any of the conditions listed
/// in [`asert::next_target_required`].
pub fn next_work_required<L: BlockLookup>(
    chain: L,
    anchor_height: i64,
    candidate_time: u32,
    params: impl AsRef<Params>,
) -> CompactTarget {
    let tip = match chain.tip() {
        Some(tip) => tip,
        None => panic!("cannot compute the next target of an empty chain"),
    };
    let anchor = match chain.block_at(anchor_height) {
        Some(anchor) => anchor,
        None => panic!("no anchor block at height {} (tip is at {})", anchor_height, tip.height),
    };
    debug!(tip = tip.height, anchor = anchor.height, "resolved retarget inputs");
    asert::next_target_required(&tip.into(), &anchor.into(), params, candidate_time)
}

/// Checks the difficulty field of a header about to be appended to `chain`.
///
/// # Panics
///
/// Same as [`next_work_required`].
pub fn check_next_bits<L: BlockLookup>(
    chain: L,
    anchor_height: i64,
    header_time: u32,
    header_bits: CompactTarget,
    params: impl AsRef<Params>,
) -> Result<(), BitsError> {
    let required = next_work_required(chain, anchor_height, header_time, params);
    asert::check_bits(header_bits, required)
}
