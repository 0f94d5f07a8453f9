//! Shepherd tag store.
//!
//! A set-associative tag store that approximates Belady's OPT with imminence
//! counters. Each set is split into two regions:
//! 1. **Shepherd cache (SC):** The first `sc_assoc` ways. Its occupants are
//!    measurement baselines: every block in the set records, per SC way, the
//!    arrival rank of its latest touch relative to that way's occupant.
//! 2. **Main cache (MC):** The remaining ways, where blocks live while they
//!    are eviction candidates.
//!
//! New blocks always enter the SC region so they are measured from birth. A
//! rotating head identifies the SC way whose occupant has been measuring the
//! longest; on every insertion that displaces an SC block, the head's
//! metadata and data move into a free MC slot, the head's counter column is
//! zeroed across the set, and the head advances one way.
//!
//! Victim selection on a full set reads column `head` of the MC blocks: a
//! zero means the candidate was never re-referenced while the head's occupant
//! measured (no imminence information, so the configured fallback policy
//! breaks the tie); otherwise the largest rank is the OPT-like choice.

use std::fmt;

use log::{debug, trace};

use crate::common::{Addr, ConfigError, Cycles, Tick};
use crate::config::CacheParams;
use crate::mem::cache::block::CacheBlk;
use crate::mem::cache::replacement::{Candidate, Replacer};
use crate::mem::cache::tags::indexing::SetAssociativeGeneric;
use crate::mem::cache::tags::{validate_geometry, BlockId, Tags};
use crate::mem::packet::Packet;
use crate::stats::{ShepherdStats, TagStats};

/// A cache block for the shepherd store, augmented with imminence counters.
#[derive(Clone, Debug)]
pub struct ShepherdBlk {
    base: CacheBlk,
    /// Whether the block sits in the shepherd (measurement) region.
    is_sc: bool,
    /// Imminence counters, one per SC way of the set.
    ///
    /// `counters[w]` is the arrival rank of this block's latest touch
    /// relative to the SC occupant of way `w`; zero means the block has not
    /// been re-referenced since that occupant was installed.
    counters: Vec<u32>,
}

impl ShepherdBlk {
    /// Creates an invalid shepherd block pinned to its set and way.
    fn new(set: u32, way: u32, sc_assoc: usize) -> Self {
        Self {
            base: CacheBlk::new(set, way),
            is_sc: false,
            counters: vec![0; sc_assoc],
        }
    }

    /// The base block metadata.
    pub fn base(&self) -> &CacheBlk {
        &self.base
    }

    /// Whether the block belongs to the shepherd region.
    pub fn is_sc(&self) -> bool {
        self.is_sc
    }

    /// Flags the block's region membership.
    fn set_sc(&mut self, is_sc: bool) {
        self.is_sc = is_sc;
    }

    /// The imminence counters.
    pub fn counters(&self) -> &[u32] {
        &self.counters
    }

    /// Invalidates the block: base validity is cleared and every counter is
    /// zeroed, while the region flag keeps its static assignment.
    fn invalidate(&mut self) {
        self.base.invalidate();
        self.counters.fill(0);
    }
}

impl fmt::Display for ShepherdBlk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} isSC ({}) counters {:?}",
            self.base, self.is_sc, self.counters
        )
    }
}

/// A tag store implementing the shepherd cache.
pub struct ShepherdTags {
    /// The cache blocks, set-major (`slot = set * assoc + way`).
    blks: Vec<ShepherdBlk>,
    /// Data bytes, one `blk_size` chunk per slot.
    data: Vec<u8>,
    /// Head pointer per set: the SC way currently serving as insertion point
    /// and measurement origin.
    heads: Vec<usize>,
    /// Next-value counters per set and SC way. Monotonically non-decreasing,
    /// saturating at the total associativity.
    nvc: Vec<Vec<u32>>,
    /// Associativity of the main-cache region.
    mc_assoc: usize,
    /// Associativity of the shepherd region.
    sc_assoc: usize,
    assoc: usize,
    num_sets: usize,
    blk_size: usize,
    /// Whether tags and data are accessed sequentially.
    sequential_access: bool,
    lookup_latency: Cycles,
    indexing: SetAssociativeGeneric,
    /// Fallback policy for candidates the counters carry no information about.
    replacer: Box<dyn Replacer>,
    stats: TagStats,
    sc_stats: ShepherdStats,
    /// Monotone operation counter stamped into blocks on insert.
    op_tick: Tick,
}

impl ShepherdTags {
    /// Construct and initialize this tag store.
    ///
    /// Requires at least one shepherd way and at least one main-cache way;
    /// block size and set-count checks are shared with the plain store.
    pub fn new(params: &CacheParams, replacer: Box<dyn Replacer>) -> Result<Self, ConfigError> {
        if params.sc_assoc < 1 || params.sc_assoc + 1 > params.assoc {
            return Err(ConfigError::ShepherdAssociativity {
                assoc: params.assoc,
                sc_assoc: params.sc_assoc,
            });
        }
        let geom = validate_geometry(params)?;
        let indexing = SetAssociativeGeneric::new(geom.entry_size, geom.num_sets, geom.assoc);

        let mut blks = Vec::with_capacity(geom.num_blocks);
        for slot in 0..geom.num_blocks {
            let set = (slot / geom.assoc) as u32;
            let way = (slot % geom.assoc) as u32;
            let mut blk = ShepherdBlk::new(set, way, params.sc_assoc);
            blk.base.repl = replacer.instantiate_entry();
            if (way as usize) < params.sc_assoc {
                blk.set_sc(true);
            }
            blks.push(blk);
        }

        Ok(Self {
            blks,
            data: vec![0; geom.num_blocks * geom.blk_size],
            heads: vec![0; geom.num_sets],
            nvc: vec![vec![1; params.sc_assoc]; geom.num_sets],
            mc_assoc: geom.assoc - params.sc_assoc,
            sc_assoc: params.sc_assoc,
            assoc: geom.assoc,
            num_sets: geom.num_sets,
            blk_size: geom.blk_size,
            sequential_access: params.sequential_access,
            lookup_latency: params.lookup_latency,
            indexing,
            replacer,
            stats: TagStats::default(),
            sc_stats: ShepherdStats::default(),
            op_tick: 0,
        })
    }

    /// The shepherd replacement statistics.
    pub fn sc_stats(&self) -> &ShepherdStats {
        &self.sc_stats
    }

    /// The current SC head of `set`.
    pub fn head(&self, set: usize) -> usize {
        self.heads[set]
    }

    /// The next-value counters of `set`.
    pub fn nvc(&self, set: usize) -> &[u32] {
        &self.nvc[set]
    }

    /// The shepherd block at a slot.
    pub fn shepherd_blk(&self, blk: BlockId) -> &ShepherdBlk {
        &self.blks[blk]
    }

    /// The slot index of a `(set, way)` pair.
    pub fn entry(&self, set: usize, way: usize) -> BlockId {
        self.indexing.entry(set, way)
    }

    /// Number of sets in the store.
    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// The first invalid SC slot of `set`, if any.
    fn find_invalid_sc(&self, set: usize) -> Option<BlockId> {
        (0..self.sc_assoc)
            .map(|way| self.indexing.entry(set, way))
            .find(|&id| !self.blks[id].base.is_valid())
    }

    /// The first invalid MC slot of `set`, if any.
    fn find_invalid_mc(&self, set: usize) -> Option<BlockId> {
        (self.sc_assoc..self.assoc)
            .map(|way| self.indexing.entry(set, way))
            .find(|&id| !self.blks[id].base.is_valid())
    }

    /// Moves all metadata and the data bytes from `src` to `dst`.
    ///
    /// Slot identities stay put: only tag, status bits, replacement state,
    /// counters, and the region flag travel, and the data chunk is copied.
    /// The source is left invalid with zeroed counters.
    fn move_block(&mut self, src: BlockId, dst: BlockId) {
        assert!(self.blks[src].base.is_valid(), "moving an invalid block");
        assert!(
            !self.blks[dst].base.is_valid(),
            "moving into a valid destination"
        );
        assert_eq!(
            self.blks[src].base.set(),
            self.blks[dst].base.set(),
            "blocks migrate only within a set"
        );
        trace!("moving [{}] to [{}]", self.blks[src], self.blks[dst]);

        let moved = self.blks[src].base.take_for_move();
        let counters = std::mem::replace(&mut self.blks[src].counters, vec![0; self.sc_assoc]);
        let is_sc = self.blks[src].is_sc;

        self.blks[dst].base.receive_move(moved);
        self.blks[dst].counters = counters;
        self.blks[dst].set_sc(is_sc);

        let (src_start, dst_start) = (src * self.blk_size, dst * self.blk_size);
        self.data
            .copy_within(src_start..src_start + self.blk_size, dst_start);
    }

    /// Displaces the SC head of `set` into the invalid MC slot `mc_slot`,
    /// zeroes the head's counter column across the set, and advances the
    /// head. Returns the vacated head slot, the fresh insertion point.
    fn rotate_head(&mut self, set: usize, mc_slot: BlockId) -> BlockId {
        let old_head = self.heads[set];
        let head_id = self.indexing.entry(set, old_head);
        assert!(
            self.blks[head_id].base.is_valid(),
            "shepherd head must be valid to rotate"
        );

        debug!(
            "set {}: rotating head {} into way {}",
            set,
            old_head,
            self.blks[mc_slot].base.way()
        );
        self.move_block(head_id, mc_slot);
        self.blks[mc_slot].set_sc(false);

        // The measurement horizon of the departed occupant resets.
        for way in 0..self.assoc {
            let id = self.indexing.entry(set, way);
            self.blks[id].counters[old_head] = 0;
        }

        self.heads[set] = (old_head + 1) % self.sc_assoc;
        head_id
    }
}

impl Tags for ShepherdTags {
    /// Looks up a block and, on a hit, refreshes both the fallback policy's
    /// state and the imminence counters.
    ///
    /// Every hit block records the current next-value counter of every SC
    /// way, whether the block itself sits in SC or MC, and each next-value
    /// counter steps toward its saturation at the total associativity.
    fn access_block(&mut self, pkt: &Packet) -> (Option<BlockId>, Cycles) {
        let blk = self.find_block(pkt.addr, pkt.is_secure());

        self.stats.tag_accesses += (self.sc_assoc + self.mc_assoc) as u64;
        if self.sequential_access {
            if blk.is_some() {
                self.stats.data_accesses += 1;
            }
        } else {
            self.stats.data_accesses += (self.sc_assoc + self.mc_assoc) as u64;
        }

        if let Some(id) = blk {
            self.blks[id].base.increase_ref_count();
            self.replacer.touch(&mut self.blks[id].base.repl);

            let set = self.blks[id].base.set() as usize;
            let cap = (self.sc_assoc + self.mc_assoc) as u32;
            for way in 0..self.sc_assoc {
                self.blks[id].counters[way] = self.nvc[set][way];
                if self.nvc[set][way] < cap {
                    self.nvc[set][way] += 1;
                }
            }
        }

        (blk, self.lookup_latency)
    }

    fn find_block(&self, addr: Addr, secure: bool) -> Option<BlockId> {
        let tag = self.indexing.extract_tag(addr);
        self.indexing
            .possible_entries(addr)
            .find(|&id| self.blks[id].base.matches(tag, secure))
    }

    /// Finds a replacement victim for `addr`.
    ///
    /// Invalid frames are preferred, MC over SC. On a full set the imminence
    /// column of the current head decides: MC blocks with a zero rank carry
    /// no information and the fallback policy breaks the tie among them;
    /// otherwise the largest rank is chosen. The chosen MC block is the
    /// physical eviction pushed into `evict_blks`, while the SC head is
    /// returned as the nominal victim for the subsequent insert to reshuffle.
    fn find_victim(&mut self, addr: Addr, evict_blks: &mut Vec<BlockId>) -> BlockId {
        self.sc_stats.victim_repl_refs += 1;
        let set = self.indexing.extract_set(addr);

        if let Some(id) = self.find_invalid_mc(set) {
            self.sc_stats.empty_repl_refs += 1;
            return id;
        }
        if let Some(id) = self.find_invalid_sc(set) {
            self.sc_stats.empty_repl_refs += 1;
            return id;
        }

        let head = self.heads[set];
        let mut mc_zero: Vec<Candidate> = Vec::new();
        let mut max_mc: Option<(BlockId, u32)> = None;

        for way in self.sc_assoc..self.assoc {
            let id = self.indexing.entry(set, way);
            let rank = self.blks[id].counters[head];
            if rank == 0 {
                mc_zero.push(Candidate {
                    way: way as u32,
                    blk: id,
                    data: self.blks[id].base.repl,
                });
            }
            if max_mc.map_or(true, |(_, best)| rank > best) {
                max_mc = Some((id, rank));
            }
        }

        let chosen = if !mc_zero.is_empty() {
            // The head never observed these blocks being referenced; the
            // imminence information is inconclusive for them.
            self.sc_stats.fallback_repl_refs += 1;
            let pick = self.replacer.get_victim(&mc_zero);
            trace!(
                "set {}: fallback pick among {} unobserved candidates",
                set,
                mc_zero.len()
            );
            mc_zero[pick].blk
        } else {
            self.sc_stats.opt_repl_refs += 1;
            max_mc.expect("a full set has at least one main-cache block").0
        };

        evict_blks.push(chosen);
        self.indexing.entry(set, head)
    }

    /// Inserts the new block, reshuffling so it lands in the SC region.
    ///
    /// The nominal victim may be an invalid MC frame (cache not yet full) or
    /// the valid SC head (full-set miss, physical victim already evicted).
    /// Either way the fill is redirected into the shepherd region: an invalid
    /// SC way if one exists, otherwise the slot the head rotation vacates.
    fn insert_block(&mut self, pkt: &Packet, blk: BlockId) -> BlockId {
        let set = self.blks[blk].base.set() as usize;

        let target = if !self.blks[blk].is_sc {
            assert!(
                !self.blks[blk].base.is_valid(),
                "main-cache insert target must be invalid"
            );
            match self.find_invalid_sc(set) {
                Some(sc_slot) => sc_slot,
                None => self.rotate_head(set, blk),
            }
        } else if self.blks[blk].base.is_valid() {
            debug_assert_eq!(
                self.blks[blk].base.way() as usize,
                self.heads[set],
                "valid shepherd victim must be the head"
            );
            let mc_slot = self
                .find_invalid_mc(set)
                .expect("full-set insert requires an evicted main-cache slot");
            self.rotate_head(set, mc_slot)
        } else {
            blk
        };

        let tag = self.indexing.extract_tag(pkt.addr);
        self.op_tick += 1;
        self.blks[target].base.insert(tag, pkt.is_secure(), self.op_tick);
        self.stats.tags_in_use += 1;
        self.replacer
            .reset_with_packet(&mut self.blks[target].base.repl, pkt);
        target
    }

    fn invalidate(&mut self, blk: BlockId) {
        if !self.blks[blk].base.is_valid() {
            return;
        }
        self.replacer.invalidate(&mut self.blks[blk].base.repl);
        self.blks[blk].invalidate();
        self.stats.tags_in_use -= 1;
    }

    fn blk(&self, blk: BlockId) -> &CacheBlk {
        &self.blks[blk].base
    }

    fn blk_mut(&mut self, blk: BlockId) -> &mut CacheBlk {
        &mut self.blks[blk].base
    }

    fn blk_data(&self, blk: BlockId) -> &[u8] {
        &self.data[blk * self.blk_size..(blk + 1) * self.blk_size]
    }

    fn blk_data_mut(&mut self, blk: BlockId) -> &mut [u8] {
        &mut self.data[blk * self.blk_size..(blk + 1) * self.blk_size]
    }

    fn regenerate_addr(&self, blk: BlockId) -> Addr {
        self.indexing
            .regenerate_addr(self.blks[blk].base.tag(), self.blks[blk].base.set())
    }

    fn block_size(&self) -> usize {
        self.blk_size
    }

    fn stats(&self) -> &TagStats {
        &self.stats
    }

    fn print_stats(&self) {
        self.stats.print();
        self.sc_stats.print();
        self.replacer.print_stats();
    }

    fn for_each_blk(&self, visitor: &mut dyn FnMut(&CacheBlk)) {
        for blk in &self.blks {
            visitor(&blk.base);
        }
    }

    fn any_blk(&self, visitor: &mut dyn FnMut(&CacheBlk) -> bool) -> bool {
        self.blks.iter().any(|blk| visitor(&blk.base))
    }
}
