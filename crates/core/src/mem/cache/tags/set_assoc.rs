//! Plain set-associative tag store.
//!
//! The baseline store: every way of a set is a replacement candidate and the
//! configured policy picks among them directly. This is the store the OPT
//! oracle plugs into when evaluated standalone, and the reference point the
//! shepherd store is measured against.

use crate::common::{Addr, ConfigError, Cycles, Tick};
use crate::config::CacheParams;
use crate::mem::cache::block::CacheBlk;
use crate::mem::cache::replacement::{Candidate, Replacer};
use crate::mem::cache::tags::indexing::SetAssociativeGeneric;
use crate::mem::cache::tags::{validate_geometry, BlockId, Tags};
use crate::mem::packet::Packet;
use crate::stats::TagStats;

/// A set-associative tag store with a pluggable replacement policy.
pub struct SetAssociativeTags {
    /// The cache blocks, set-major (`slot = set * assoc + way`).
    blks: Vec<CacheBlk>,
    /// Data bytes, one `blk_size` chunk per slot.
    data: Vec<u8>,
    assoc: usize,
    blk_size: usize,
    /// Whether tags and data are accessed sequentially.
    sequential_access: bool,
    lookup_latency: Cycles,
    indexing: SetAssociativeGeneric,
    /// Replacement policy consulted over the whole candidate list.
    replacer: Box<dyn Replacer>,
    stats: TagStats,
    /// Monotone operation counter stamped into blocks on insert.
    op_tick: Tick,
}

impl SetAssociativeTags {
    /// Construct and initialize this tag store.
    pub fn new(params: &CacheParams, replacer: Box<dyn Replacer>) -> Result<Self, ConfigError> {
        let geom = validate_geometry(params)?;
        let indexing = SetAssociativeGeneric::new(geom.entry_size, geom.num_sets, geom.assoc);

        let mut blks = Vec::with_capacity(geom.num_blocks);
        for slot in 0..geom.num_blocks {
            let set = (slot / geom.assoc) as u32;
            let way = (slot % geom.assoc) as u32;
            let mut blk = CacheBlk::new(set, way);
            blk.repl = replacer.instantiate_entry();
            blks.push(blk);
        }

        Ok(Self {
            blks,
            data: vec![0; geom.num_blocks * geom.blk_size],
            assoc: geom.assoc,
            blk_size: geom.blk_size,
            sequential_access: params.sequential_access,
            lookup_latency: params.lookup_latency,
            indexing,
            replacer,
            stats: TagStats::default(),
            op_tick: 0,
        })
    }

    /// The indexing policy driving this store.
    pub fn indexing(&self) -> &SetAssociativeGeneric {
        &self.indexing
    }
}

impl Tags for SetAssociativeTags {
    fn access_block(&mut self, pkt: &Packet) -> (Option<BlockId>, Cycles) {
        let blk = self.find_block(pkt.addr, pkt.is_secure());

        self.stats.tag_accesses += self.assoc as u64;
        if self.sequential_access {
            if blk.is_some() {
                self.stats.data_accesses += 1;
            }
        } else {
            self.stats.data_accesses += self.assoc as u64;
        }

        if let Some(id) = blk {
            self.blks[id].increase_ref_count();
            self.replacer.touch(&mut self.blks[id].repl);
        }

        (blk, self.lookup_latency)
    }

    fn find_block(&self, addr: Addr, secure: bool) -> Option<BlockId> {
        let tag = self.indexing.extract_tag(addr);
        self.indexing
            .possible_entries(addr)
            .find(|&id| self.blks[id].matches(tag, secure))
    }

    fn find_victim(&mut self, addr: Addr, evict_blks: &mut Vec<BlockId>) -> BlockId {
        let candidates: Vec<Candidate> = self
            .indexing
            .possible_entries(addr)
            .map(|id| Candidate {
                way: self.blks[id].way(),
                blk: id,
                data: self.blks[id].repl,
            })
            .collect();

        let victim = candidates[self.replacer.get_victim(&candidates)].blk;
        if self.blks[victim].is_valid() {
            evict_blks.push(victim);
        }
        victim
    }

    fn insert_block(&mut self, pkt: &Packet, blk: BlockId) -> BlockId {
        let tag = self.indexing.extract_tag(pkt.addr);
        self.op_tick += 1;
        self.blks[blk].insert(tag, pkt.is_secure(), self.op_tick);
        self.stats.tags_in_use += 1;
        self.replacer.reset_with_packet(&mut self.blks[blk].repl, pkt);
        blk
    }

    fn invalidate(&mut self, blk: BlockId) {
        if !self.blks[blk].is_valid() {
            return;
        }
        self.replacer.invalidate(&mut self.blks[blk].repl);
        self.blks[blk].invalidate();
        self.stats.tags_in_use -= 1;
    }

    fn blk(&self, blk: BlockId) -> &CacheBlk {
        &self.blks[blk]
    }

    fn blk_mut(&mut self, blk: BlockId) -> &mut CacheBlk {
        &mut self.blks[blk]
    }

    fn blk_data(&self, blk: BlockId) -> &[u8] {
        &self.data[blk * self.blk_size..(blk + 1) * self.blk_size]
    }

    fn blk_data_mut(&mut self, blk: BlockId) -> &mut [u8] {
        &mut self.data[blk * self.blk_size..(blk + 1) * self.blk_size]
    }

    fn regenerate_addr(&self, blk: BlockId) -> Addr {
        self.indexing
            .regenerate_addr(self.blks[blk].tag(), self.blks[blk].set())
    }

    fn block_size(&self) -> usize {
        self.blk_size
    }

    fn stats(&self) -> &TagStats {
        &self.stats
    }

    fn print_stats(&self) {
        self.stats.print();
        self.replacer.print_stats();
    }

    fn for_each_blk(&self, visitor: &mut dyn FnMut(&CacheBlk)) {
        for blk in &self.blks {
            visitor(blk);
        }
    }

    fn any_blk(&self, visitor: &mut dyn FnMut(&CacheBlk) -> bool) -> bool {
        self.blks.iter().any(|blk| visitor(blk))
    }
}
