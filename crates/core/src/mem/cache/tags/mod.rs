//! Tag stores.
//!
//! This module defines the seam between the cache wrapper and the structures
//! that track which blocks are resident:
//! 1. **The `Tags` trait:** Lookup, victim selection, insertion, and
//!    invalidation over slot-indexed blocks.
//! 2. **Stores:** A plain set-associative store and the shepherd store that
//!    partitions each set into measurement and storage regions.
//!
//! Blocks are identified by their slot index ([`BlockId`]); metadata migrates
//! between slots by field moves and data-byte copies, never by pointer
//! rewiring.

/// Generic set-associative indexing policy.
pub mod indexing;

/// Plain set-associative tag store.
pub mod set_assoc;

/// Shepherd tag store (measurement/storage split with imminence counters).
pub mod shepherd;

pub use set_assoc::SetAssociativeTags;
pub use shepherd::{ShepherdBlk, ShepherdTags};

use crate::common::{Addr, ConfigError, Cycles};
use crate::config::{CacheParams, IndexingKind};
use crate::mem::cache::block::CacheBlk;
use crate::mem::packet::Packet;
use crate::stats::TagStats;

/// Identity of a block: its slot index in the tag store's arena.
pub type BlockId = usize;

/// Interface shared by all tag stores.
pub trait Tags {
    /// Access a block and update replacement data. May not succeed, in which
    /// case `None` is returned. This has all the implications of a cache
    /// access and should only be used as such. Also returns the tag lookup
    /// latency.
    fn access_block(&mut self, pkt: &Packet) -> (Option<BlockId>, Cycles);

    /// Finds a block by address without touching replacement data.
    fn find_block(&self, addr: Addr, secure: bool) -> Option<BlockId>;

    /// Finds a replacement victim for `addr`.
    ///
    /// Valid blocks that must be physically evicted before the fill are
    /// appended to `evict_blks`; the returned block is the nominal victim the
    /// subsequent [`Tags::insert_block`] call receives.
    fn find_victim(&mut self, addr: Addr, evict_blks: &mut Vec<BlockId>) -> BlockId;

    /// Inserts the new block into the cache and updates replacement data.
    ///
    /// Returns the slot actually filled, which may differ from the nominal
    /// victim when the store reshuffles the set (the shepherd store redirects
    /// fills into its measurement region).
    fn insert_block(&mut self, pkt: &Packet, blk: BlockId) -> BlockId;

    /// Invalidates a block. Invalidating an invalid block is a no-op.
    fn invalidate(&mut self, blk: BlockId);

    /// The base metadata of a block.
    fn blk(&self, blk: BlockId) -> &CacheBlk;

    /// Mutable base metadata of a block.
    fn blk_mut(&mut self, blk: BlockId) -> &mut CacheBlk;

    /// The data bytes of a block.
    fn blk_data(&self, blk: BlockId) -> &[u8];

    /// Mutable data bytes of a block.
    fn blk_data_mut(&mut self, blk: BlockId) -> &mut [u8];

    /// Regenerates the block address from the tag and indexing location.
    fn regenerate_addr(&self, blk: BlockId) -> Addr;

    /// The block size in bytes.
    fn block_size(&self) -> usize;

    /// The base tag statistics.
    fn stats(&self) -> &TagStats;

    /// Prints all statistics this store owns, including its policy's.
    fn print_stats(&self);

    /// Visits every block in the store.
    fn for_each_blk(&self, visitor: &mut dyn FnMut(&CacheBlk));

    /// Returns true if `visitor` returns true for any block.
    fn any_blk(&self, visitor: &mut dyn FnMut(&CacheBlk) -> bool) -> bool;
}

/// Validated geometry shared by the tag stores.
pub(crate) struct Geometry {
    pub num_sets: usize,
    pub assoc: usize,
    pub blk_size: usize,
    pub entry_size: usize,
    pub num_blocks: usize,
}

/// Checks the common geometry parameters and derives the set count.
pub(crate) fn validate_geometry(params: &CacheParams) -> Result<Geometry, ConfigError> {
    // Both stores are driven by the generic set-associative policy; a new
    // indexing kind must be handled here before a store can accept it.
    match params.indexing {
        IndexingKind::SetAssociativeGeneric => {}
    }

    let blk_size = params.block_bytes;
    if blk_size < 4 || !blk_size.is_power_of_two() {
        return Err(ConfigError::BlockSize(blk_size));
    }

    let entry_size = params.entry_size();
    let frame = entry_size * params.assoc;
    if frame == 0 || params.size_bytes % frame != 0 {
        return Err(ConfigError::UnevenSets {
            size: params.size_bytes,
            frame,
        });
    }

    let num_sets = params.size_bytes / frame;
    Ok(Geometry {
        num_sets,
        assoc: params.assoc,
        blk_size,
        entry_size,
        num_blocks: num_sets * params.assoc,
    })
}
