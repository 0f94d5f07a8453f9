//! Non-coherent cache.
//!
//! The wrapper that ties a tag store, a replacement policy, and an MSHR queue
//! into a timing-mode cache sitting below the point of coherence:
//! 1. **Timing path:** Request handling, miss tracking, fills, and responses.
//! 2. **Writebacks:** Dirty blocks always, clean blocks when configured.
//! 3. **Protocol guard rails:** Snoop and atomic entry points panic; only
//!    reads, writes, and writebacks are legal here.
//!
//! There is no event engine in this crate: the host's ports are rendered as
//! queues. Miss and writeback packets accumulate on the memory side until the
//! driver services them, and timing responses accumulate on the CPU side with
//! their completion ticks.

/// Cache block metadata.
pub mod block;
/// Miss status holding registers.
pub mod mshr;
/// Replacement policies.
pub mod replacement;
/// Tag stores.
pub mod tags;
/// Access-order trace loading.
pub mod trace;

use std::collections::VecDeque;

use log::{debug, trace};

use crate::common::{ConfigError, Cycles, Tick};
use crate::config::{CacheParams, Config, TagStoreKind};
use crate::mem::packet::{MemCmd, Packet};
use crate::stats::CacheStats;

use self::mshr::{Mshr, MshrQueue};
use self::replacement::build_replacer;
use self::tags::{BlockId, SetAssociativeTags, ShepherdTags, Tags};

/// A timing-mode cache below the point of coherence.
///
/// Coherence traffic never reaches this cache, so fills always bring in
/// writable blocks and every write hit can proceed without upgrades.
pub struct NonCoherentCache {
    tags: Box<dyn Tags>,
    mshrs: MshrQueue,
    /// Miss fetches and writebacks headed to the memory below.
    mem_queue: VecDeque<Packet>,
    /// Timing responses headed to the CPU, with their completion ticks.
    cpu_responses: VecDeque<(Tick, Packet)>,
    blk_size: usize,
    writeback_clean: bool,
    response_latency: Cycles,
    stats: CacheStats,
}

impl NonCoherentCache {
    /// Creates a cache over an already-built tag store.
    pub fn new(params: &CacheParams, tags: Box<dyn Tags>) -> Self {
        let blk_size = tags.block_size();
        Self {
            tags,
            mshrs: MshrQueue::new(),
            mem_queue: VecDeque::new(),
            cpu_responses: VecDeque::new(),
            blk_size,
            writeback_clean: params.writeback_clean,
            response_latency: params.response_latency,
            stats: CacheStats::default(),
        }
    }

    /// Builds the configured cache: replacement policy, tag store, wrapper.
    ///
    /// The OPT policy loads its trace here; a missing or empty trace is a
    /// fatal configuration error.
    pub fn build(config: &Config) -> Result<Self, ConfigError> {
        let replacer = build_replacer(config.cache.policy, &config.trace)?;
        let tags: Box<dyn Tags> = match config.cache.tag_store {
            TagStoreKind::SetAssociative => {
                Box::new(SetAssociativeTags::new(&config.cache, replacer)?)
            }
            TagStoreKind::Shepherd => Box::new(ShepherdTags::new(&config.cache, replacer)?),
        };
        Ok(Self::new(&config.cache, tags))
    }

    /// The tag store.
    pub fn tags(&self) -> &dyn Tags {
        self.tags.as_ref()
    }

    /// The cache-level statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// The block size in bytes.
    pub fn block_size(&self) -> usize {
        self.blk_size
    }

    /// Number of outstanding misses.
    pub fn outstanding_misses(&self) -> usize {
        self.mshrs.len()
    }

    /// Receives a timing request from the CPU side.
    ///
    /// # Panics
    ///
    /// Panics if an upstream cache claims to respond, or if the packet is
    /// neither a read nor a write: coherence requests never reach a
    /// non-coherent cache.
    pub fn recv_timing_req(&mut self, pkt: Packet, now: Tick) {
        assert!(
            !pkt.cache_responding,
            "should not see packets where cache is responding"
        );
        assert!(
            pkt.is_read() || pkt.is_write(),
            "should only see read and writes at non-coherent cache"
        );

        let mut pkt = pkt;
        let mut writebacks = Vec::new();
        let (satisfied, blk, lat) = self.access(&mut pkt, &mut writebacks);

        if satisfied {
            self.handle_timing_req_hit(pkt, blk, now + lat);
        } else {
            self.handle_timing_req_miss(pkt, blk, now + lat);
        }
        self.do_writebacks(writebacks, now + lat);
    }

    /// Performs the tag lookup and classifies the access.
    ///
    /// Writebacks and write-cleans can allocate and fill even if the
    /// referenced block was not present; the receiving block is marked
    /// writable either way.
    pub fn access(
        &mut self,
        pkt: &mut Packet,
        writebacks: &mut Vec<Packet>,
    ) -> (bool, Option<BlockId>, Cycles) {
        let (blk, lat) = self.tags.access_block(pkt);

        if pkt.is_writeback() {
            let blk = match blk {
                Some(blk) => blk,
                None => self.allocate_block(pkt, writebacks),
            };
            self.tags.blk_mut(blk).set_writable();

            let offset = pkt.offset(self.blk_size);
            let size = pkt.size;
            if let Some(src) = pkt.data() {
                self.tags.blk_data_mut(blk)[offset..offset + size].copy_from_slice(&src[..size]);
            }
            if pkt.cmd == MemCmd::WritebackDirty {
                self.tags.blk_mut(blk).set_dirty();
            }
            self.stats.hits += 1;
            return (true, Some(blk), lat);
        }

        match blk {
            Some(blk) => {
                self.stats.hits += 1;
                (true, Some(blk), lat)
            }
            None => {
                self.stats.misses += 1;
                (false, None, lat)
            }
        }
    }

    /// Completes a hit: satisfies the request and schedules the response.
    fn handle_timing_req_hit(&mut self, mut pkt: Packet, blk: Option<BlockId>, now: Tick) {
        if pkt.is_writeback() {
            // Already absorbed in access(); writebacks carry no response.
            return;
        }
        let blk = blk.expect("hit without a block");
        self.satisfy_request(&mut pkt, blk);

        if pkt.needs_response() {
            pkt.make_timing_response();
            let when = now + pkt.header_delay + pkt.payload_delay;
            pkt.header_delay = 0;
            pkt.payload_delay = 0;
            self.cpu_responses.push_back((when, pkt));
        }
    }

    /// Tracks a miss: coalesces onto a matching MSHR or allocates a new one
    /// and issues the fetch downstream.
    pub fn handle_timing_req_miss(&mut self, pkt: Packet, blk: Option<BlockId>, now: Tick) {
        let blk_addr = pkt.block_addr(self.blk_size);
        let mshr = self.mshrs.find_match(blk_addr, pkt.is_secure());

        // We can always write to a non-coherent cache if the block is
        // present, so reaching this point means the block is not resident.
        assert!(mshr.is_some() || blk.is_none());

        match mshr {
            Some(index) => {
                trace!("deferring {:#x} onto existing MSHR", pkt.addr);
                self.mshrs.get_mut(index).allocate_target(pkt, now);
            }
            None => {
                let miss_pkt = self.create_miss_packet(&pkt);
                self.mshrs.allocate(blk_addr, pkt.is_secure(), pkt, now);
                self.stats.mshr_allocations += 1;
                self.mem_queue.push_back(miss_pkt);
            }
        }
    }

    /// Builds the downstream fetch for a miss.
    ///
    /// Only block-sized reads are issued below this cache; writebacks from
    /// above fill directly and never fetch.
    pub fn create_miss_packet(&self, cpu_pkt: &Packet) -> Packet {
        assert!(cpu_pkt.needs_response());

        let mut pkt = Packet::request(
            MemCmd::ReadReq,
            cpu_pkt.block_addr(self.blk_size),
            self.blk_size,
            cpu_pkt.requestor,
        );
        pkt.secure = cpu_pkt.is_secure();
        assert_eq!(pkt.addr, pkt.block_addr(self.blk_size));
        debug!("created {:?} {:#x} from {:#x}", pkt.cmd, pkt.addr, cpu_pkt.addr);
        pkt
    }

    /// Receives a fill response from the memory side.
    ///
    /// # Panics
    ///
    /// Panics if the packet is not a read response or matches no outstanding
    /// miss: the only downstream requests this cache issues are block reads.
    pub fn recv_timing_resp(&mut self, pkt: Packet, now: Tick) {
        assert!(pkt.is_response());
        assert!(pkt.is_read(), "only read responses reach a non-coherent cache");

        let index = self
            .mshrs
            .find_match(pkt.block_addr(self.blk_size), pkt.is_secure())
            .expect("response without a matching MSHR");

        let mut writebacks = Vec::new();
        let blk = self.handle_fill(&pkt, &mut writebacks);
        let mshr = self.mshrs.deallocate(index);
        self.service_mshr_targets(mshr, &pkt, blk, now);
        self.do_writebacks(writebacks, now);
    }

    /// Installs the fetched block, evicting as the tag store directs.
    fn handle_fill(&mut self, pkt: &Packet, writebacks: &mut Vec<Packet>) -> BlockId {
        let blk = self.allocate_block(pkt, writebacks);

        // Responses below the point of coherence always bring in a block we
        // may write.
        self.tags.blk_mut(blk).set_writable();
        if let Some(data) = pkt.data() {
            self.tags.blk_data_mut(blk).copy_from_slice(data);
        }
        blk
    }

    /// Selects a victim, performs the physical evictions, and inserts.
    fn allocate_block(&mut self, pkt: &Packet, writebacks: &mut Vec<Packet>) -> BlockId {
        let mut evict_blks = Vec::new();
        let victim = self
            .tags
            .find_victim(pkt.block_addr(self.blk_size), &mut evict_blks);
        for id in evict_blks {
            if let Some(wb) = self.evict_block(id) {
                writebacks.push(wb);
            }
        }
        self.tags.insert_block(pkt, victim)
    }

    /// Satisfies a read or write against a resident block.
    ///
    /// # Panics
    ///
    /// Panics on anything that is not a read or a write: requests used to
    /// keep caches coherent (invalidations, upgrades) never reach this cache.
    pub fn satisfy_request(&mut self, pkt: &mut Packet, blk: BlockId) {
        assert!(pkt.is_read() || pkt.is_write());

        let offset = pkt.offset(self.blk_size);
        let size = pkt.size;
        if pkt.is_write() {
            assert!(
                self.tags.blk(blk).is_writable(),
                "write hit on a non-writable block in a non-coherent cache"
            );
            if let Some(src) = pkt.data() {
                self.tags.blk_data_mut(blk)[offset..offset + size].copy_from_slice(&src[..size]);
            }
            self.tags.blk_mut(blk).set_dirty();
        } else {
            let bytes = self.tags.blk_data(blk)[offset..offset + size].to_vec();
            pkt.set_data(bytes);
        }
    }

    /// Responds to every request deferred on a completed miss.
    pub fn service_mshr_targets(&mut self, mut mshr: Mshr, pkt: &Packet, blk: BlockId, now: Tick) {
        let targets = mshr.extract_targets();
        // First offset for critical-word-first calculations.
        let initial_offset = targets
            .first()
            .map(|t| t.pkt.offset(self.blk_size))
            .unwrap_or(0);

        for target in targets {
            let mut tgt_pkt = target.pkt;

            // Charge the crossbar delay of the fill on the completion time,
            // and the payload delay for anything past the critical word.
            let mut completion_time = now + pkt.header_delay + self.response_latency;
            let mut transfer_offset =
                tgt_pkt.offset(self.blk_size) as isize - initial_offset as isize;
            if transfer_offset < 0 {
                transfer_offset += self.blk_size as isize;
            }
            if transfer_offset != 0 {
                completion_time += pkt.payload_delay;
            }

            self.satisfy_request(&mut tgt_pkt, blk);
            tgt_pkt.make_timing_response();
            if pkt.is_error() {
                tgt_pkt.copy_error(pkt);
            }
            tgt_pkt.header_delay = 0;
            tgt_pkt.payload_delay = 0;
            self.cpu_responses.push_back((completion_time, tgt_pkt));
        }

        assert_eq!(mshr.num_targets(), 0);
    }

    /// Queues writebacks for the memory below.
    pub fn do_writebacks(&mut self, writebacks: Vec<Packet>, _forward_time: Tick) {
        for wb_pkt in writebacks {
            self.mem_queue.push_back(wb_pkt);
        }
    }

    /// Evicts a block: writes back dirty blocks always, clean blocks when
    /// clean writebacks are enabled, then invalidates.
    pub fn evict_block(&mut self, blk: BlockId) -> Option<Packet> {
        let meta = self.tags.blk(blk);
        let pkt = if meta.is_dirty() || self.writeback_clean {
            let cmd = if meta.is_dirty() {
                MemCmd::WritebackDirty
            } else {
                MemCmd::WriteClean
            };
            let addr = self.tags.regenerate_addr(blk);
            let data = self.tags.blk_data(blk).to_vec();
            self.stats.writebacks += 1;
            Some(Packet::writeback(cmd, addr, meta.is_secure(), data))
        } else {
            None
        };
        self.tags.invalidate(blk);
        pkt
    }

    /// Functional (debug) access from the CPU side.
    ///
    /// Reads or writes the resident block directly, without statistics or
    /// timing. Returns whether the access was satisfied here.
    ///
    /// # Panics
    ///
    /// Panics on a functional access from the memory side: that is a snoop,
    /// and this cache is non-coherent.
    pub fn functional_access(&mut self, pkt: &mut Packet, from_cpu_side: bool) -> bool {
        assert!(
            from_cpu_side,
            "non-coherent cache received functional snoop request"
        );

        match self.tags.find_block(pkt.addr, pkt.is_secure()) {
            Some(blk) => {
                let offset = pkt.offset(self.blk_size);
                let size = pkt.size;
                if pkt.is_write() {
                    if let Some(src) = pkt.data() {
                        self.tags.blk_data_mut(blk)[offset..offset + size]
                            .copy_from_slice(&src[..size]);
                    }
                    self.tags.blk_mut(blk).set_dirty();
                } else {
                    let bytes = self.tags.blk_data(blk)[offset..offset + size].to_vec();
                    pkt.set_data(bytes);
                }
                true
            }
            None => false,
        }
    }

    /// Atomic-mode access entry point.
    ///
    /// # Panics
    ///
    /// Always: this cache runs in timing mode only.
    pub fn recv_atomic(&mut self, _pkt: &mut Packet) -> Cycles {
        panic!("atomic accesses are not supported by the non-coherent cache");
    }

    /// Atomic-mode snoop entry point.
    ///
    /// # Panics
    ///
    /// Always: a non-coherent cache is never snooped.
    pub fn recv_atomic_snoop(&mut self, _pkt: &mut Packet) -> Cycles {
        panic!("atomic snoops are not supported by the non-coherent cache");
    }

    /// Timing-mode snoop request entry point.
    ///
    /// # Panics
    ///
    /// Always: a non-coherent cache is never snooped.
    pub fn recv_timing_snoop_req(&mut self, _pkt: &Packet) {
        panic!("timing snoop requests are not supported by the non-coherent cache");
    }

    /// Timing-mode snoop response entry point.
    ///
    /// # Panics
    ///
    /// Always: a non-coherent cache never issues snoops to respond to.
    pub fn recv_timing_snoop_resp(&mut self, _pkt: &Packet) {
        panic!("timing snoop responses are not supported by the non-coherent cache");
    }

    /// Takes the next packet headed to the memory below, if any.
    pub fn take_mem_request(&mut self) -> Option<Packet> {
        self.mem_queue.pop_front()
    }

    /// Takes the next timing response headed to the CPU, if any, with its
    /// completion tick.
    pub fn take_cpu_response(&mut self) -> Option<(Tick, Packet)> {
        self.cpu_responses.pop_front()
    }

    /// Prints the cache and tag-store statistics.
    pub fn print_stats(&self) {
        self.stats.print();
        self.tags.print_stats();
    }
}
