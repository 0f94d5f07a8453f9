//! Trace replay driver.
//!
//! Replays an access-order trace through a cache, playing the roles the host
//! simulator would otherwise fill:
//! 1. **CPU side:** Issues one read per trace line and drains timing responses.
//! 2. **Memory side:** Services miss fetches after a flat latency and absorbs
//!    writebacks.
//!
//! Data content is not modeled beyond the block buffers; fills return zeroed
//! bytes. The interesting outputs are the statistics of the cache, its tag
//! store, and its replacement policy.

use log::info;

use crate::common::Tick;
use crate::config::Config;
use crate::mem::cache::trace::AccessTrace;
use crate::mem::cache::NonCoherentCache;
use crate::mem::packet::{MemCmd, Packet};
use crate::stats::DriverStats;

/// Replays a trace through a cache with a flat-latency memory below it.
pub struct Driver {
    cache: NonCoherentCache,
    mem_latency: Tick,
    tick: Tick,
    stats: DriverStats,
}

impl Driver {
    /// Creates a driver around a built cache.
    pub fn new(cache: NonCoherentCache, config: &Config) -> Self {
        Self {
            cache,
            mem_latency: config.memory.latency,
            tick: 0,
            stats: DriverStats::default(),
        }
    }

    /// The wrapped cache.
    pub fn cache(&self) -> &NonCoherentCache {
        &self.cache
    }

    /// The replay bookkeeping counters.
    pub fn stats(&self) -> &DriverStats {
        &self.stats
    }

    /// Replays the trace, optionally capped at `max_accesses` lines.
    ///
    /// Every trace line becomes a one-byte read at its block address; each
    /// access is fully serviced (memory round trip included) before the next
    /// one issues, matching the serial stream the replacement state machines
    /// assume.
    pub fn run(&mut self, trace: &AccessTrace, max_accesses: Option<u64>) {
        let limit = max_accesses.unwrap_or(u64::MAX);
        info!(
            "replaying {} of {} trace accesses",
            limit.min(trace.num_accesses() as u64),
            trace.num_accesses()
        );

        for &addr in trace.order().iter().take(limit as usize) {
            self.tick += 1;
            let pkt = Packet::request(MemCmd::ReadReq, addr, 1, 0);
            self.cache.recv_timing_req(pkt, self.tick);
            self.stats.accesses += 1;

            self.service_memory();
            self.drain_responses();
        }

        self.stats.ticks = self.tick;
    }

    /// Services every packet the cache has queued for the memory below.
    fn service_memory(&mut self) {
        while let Some(req) = self.cache.take_mem_request() {
            if req.needs_response() {
                self.stats.mem_reads += 1;
                self.tick += self.mem_latency;
                let mut resp = req;
                resp.set_data(vec![0; resp.size]);
                resp.make_timing_response();
                self.cache.recv_timing_resp(resp, self.tick);
            } else {
                // Writebacks are absorbed without a response.
                self.stats.mem_writebacks += 1;
            }
        }
    }

    /// Drains the timing responses headed back to the CPU.
    fn drain_responses(&mut self) {
        while let Some((when, _pkt)) = self.cache.take_cpu_response() {
            self.stats.responses += 1;
            self.tick = self.tick.max(when);
        }
    }

    /// Prints the replay summary followed by the cache statistics.
    pub fn print_stats(&self) {
        self.stats.print();
        self.cache.print_stats();
        println!("==========================================================");
    }
}
