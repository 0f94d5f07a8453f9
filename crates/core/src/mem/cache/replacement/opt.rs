//! Belady's Optimal (OPT) Replacement Policy.
//!
//! The oracle: evicts the candidate whose next reference lies farthest in the
//! future, consulting an access-order trace loaded once at construction. It
//! keeps:
//! 1. **The trace index:** Block address to the ordered sequence numbers of
//!    its accesses.
//! 2. **The oracle clock:** A process-wide access counter, incremented on
//!    every touch and every reset-with-packet, that locates "now" inside the
//!    trace.
//! 3. **Victim classes:** One statistic per branch of the selection protocol
//!    (empty frame, speculative, never-used-again, LRU tie-break, genuine OPT).
//!
//! Selection protocol, in order:
//! 1. A candidate whose recorded address is `0x0` has never been installed
//!    and is returned immediately.
//! 2. A candidate absent from the trace is a safe eviction (trace coverage
//!    says it will not be re-referenced); the scan stops there.
//! 3. Candidates with no trace index beyond the oracle clock will never be
//!    used again; the one with the smallest last-touch timestamp wins.
//! 4. Otherwise the candidate with the largest next future reference wins,
//!    ties broken by candidate order.

use log::{debug, trace};

use super::{Candidate, Replacer};
use crate::common::Tick;
use crate::mem::cache::block::ReplData;
use crate::mem::cache::trace::AccessTrace;
use crate::mem::packet::Packet;
use crate::stats::OptStats;

/// OPT policy state.
pub struct Opt {
    /// The future, keyed by block address. Immutable after load.
    trace: AccessTrace,
    /// The oracle clock: number of touches and resets seen so far.
    access_counter: Tick,
    /// Victim-class counters.
    stats: OptStats,
}

impl Opt {
    /// Creates an OPT policy over a loaded access trace.
    pub fn new(trace: AccessTrace) -> Self {
        debug!(
            "cache using OPT replacement over {} trace accesses ({} blocks)",
            trace.num_accesses(),
            trace.num_blocks()
        );
        Self {
            trace,
            access_counter: 0,
            stats: OptStats::default(),
        }
    }

    /// The current value of the oracle clock.
    pub fn access_counter(&self) -> Tick {
        self.access_counter
    }

    /// The victim-class counters.
    pub fn stats(&self) -> &OptStats {
        &self.stats
    }

    /// The smallest trace index of `accesses` strictly greater than the
    /// oracle clock, i.e. the candidate's next future reference.
    fn next_future_reference(&self, accesses: &[u64]) -> Option<u64> {
        let pos = accesses.partition_point(|&seq| seq <= self.access_counter);
        accesses.get(pos).copied()
    }
}

impl Replacer for Opt {
    /// Clears the last-touch timestamp.
    fn invalidate(&mut self, data: &mut ReplData) {
        data.last_touch_tick = 0;
    }

    /// Advances the oracle clock and stamps it into the block.
    fn touch(&mut self, data: &mut ReplData) {
        self.access_counter += 1;
        trace!("opt touch, access counter {}", self.access_counter);
        data.last_touch_tick = self.access_counter;
    }

    /// OPT cannot reset without address information.
    ///
    /// # Panics
    ///
    /// Always: wiring OPT into a call site that resets without a packet is a
    /// configuration error.
    fn reset(&mut self, _data: &mut ReplData) {
        panic!("OPT replacement requires packet address information on reset");
    }

    /// Advances the oracle clock, stamps it, and records the fill address.
    fn reset_with_packet(&mut self, data: &mut ReplData, pkt: &Packet) {
        self.access_counter += 1;
        trace!(
            "opt reset {:#x}, access counter {}",
            pkt.addr,
            self.access_counter
        );
        data.last_touch_tick = self.access_counter;
        data.addr = pkt.addr;
    }

    /// Runs the oracle selection protocol over the candidates.
    fn get_victim(&mut self, candidates: &[Candidate]) -> usize {
        assert!(!candidates.is_empty(), "there must be at least one replacement candidate");

        // Never-installed frames first: a recorded address of zero means the
        // slot has no resident to protect.
        if let Some(i) = candidates.iter().position(|c| c.data.addr == 0) {
            self.stats.empty_victims += 1;
            trace!("opt victim: empty frame at way {}", candidates[i].way);
            return i;
        }

        let mut no_future: Vec<usize> = Vec::new();
        let mut farthest: Option<(usize, u64)> = None;

        for (i, candidate) in candidates.iter().enumerate() {
            trace!("looking at candidate with address {:#x}", candidate.data.addr);
            let accesses = match self.trace.accesses(candidate.data.addr) {
                Some(list) => list,
                None => {
                    // Not covered by the trace: it will not be re-referenced,
                    // so it is a safe eviction. No need to scan further.
                    self.stats.speculative_victims += 1;
                    trace!("opt victim: speculative {:#x}", candidate.data.addr);
                    return i;
                }
            };
            match self.next_future_reference(accesses) {
                None => no_future.push(i),
                Some(next) => {
                    if farthest.map_or(true, |(_, best)| next > best) {
                        farthest = Some((i, next));
                    }
                }
            }
        }

        if !no_future.is_empty() {
            // Dead blocks: nothing in the trace references them again. The
            // last-touch timestamp orders them when there is more than one.
            let victim = *no_future
                .iter()
                .min_by_key(|&&i| candidates[i].data.last_touch_tick)
                .unwrap();
            if no_future.len() == 1 {
                self.stats.not_used_again_victims += 1;
            } else {
                self.stats.lru_victims += 1;
            }
            trace!(
                "opt victim: never used again {:#x}",
                candidates[victim].data.addr
            );
            return victim;
        }

        let (victim, next) = farthest.expect("at least one candidate has a future reference");
        self.stats.opt_victims += 1;
        trace!(
            "evicting block with address {:#x}, next reference {}",
            candidates[victim].data.addr,
            next
        );
        victim
    }

    /// Prints the OPT victim-class counters.
    fn print_stats(&self) {
        self.stats.print();
    }
}
