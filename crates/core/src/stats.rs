//! Simulation statistics collection and reporting.
//!
//! This module tracks the counters exposed by the cache components. It provides:
//! 1. **Tag stats:** Tag/data array activity and occupancy, shared by all tag stores.
//! 2. **Shepherd stats:** How victims were decided (imminence, fallback, empty frames).
//! 3. **OPT stats:** Which branch of the oracle protocol chose each victim.
//! 4. **Cache stats:** Hit/miss/writeback counts for the wrapper and the replay driver.
//!
//! All counters are plain `u64`s mutated on the single-threaded simulation
//! path; reporting renders them as an aligned key/value listing.

/// Statistics common to every tag store.
#[derive(Clone, Debug, Default)]
pub struct TagStats {
    /// Number of tag array reads (one per way looked up).
    pub tag_accesses: u64,
    /// Number of data array reads.
    ///
    /// In sequential-access mode the data array is read only on a hit; in
    /// parallel mode every way's data is read on every lookup.
    pub data_accesses: u64,
    /// Number of valid blocks currently resident.
    pub tags_in_use: u64,
}

impl TagStats {
    /// Prints the tag statistics section to stdout.
    pub fn print(&self) {
        println!("TAG STORE");
        println!("  tags.tag_accesses      {}", self.tag_accesses);
        println!("  tags.data_accesses     {}", self.data_accesses);
        println!("  tags.in_use            {}", self.tags_in_use);
        println!("----------------------------------------------------------");
    }
}

/// Victim-selection statistics of the shepherd tag store.
#[derive(Clone, Debug, Default)]
pub struct ShepherdStats {
    /// Victims decided by the fallback replacement policy because the
    /// current shepherd head had no imminence information for them.
    pub fallback_repl_refs: u64,
    /// Victims decided by imminence counters alone (the OPT-like choice).
    pub opt_repl_refs: u64,
    /// Victims that were invalid frames (the cache was not yet full).
    pub empty_repl_refs: u64,
    /// Total victim requests (misses).
    pub victim_repl_refs: u64,
}

impl ShepherdStats {
    /// Prints the shepherd statistics section to stdout.
    pub fn print(&self) {
        println!("SHEPHERD REPLACEMENT");
        println!("  shepherd.victim_refs   {}", self.victim_repl_refs);
        println!("  shepherd.empty_refs    {}", self.empty_repl_refs);
        println!("  shepherd.opt_refs      {}", self.opt_repl_refs);
        println!("  shepherd.fallback_refs {}", self.fallback_repl_refs);
        println!("----------------------------------------------------------");
    }
}

/// Victim-class statistics of the OPT oracle.
///
/// Exactly one counter increments per victim request.
#[derive(Clone, Debug, Default)]
pub struct OptStats {
    /// Victims whose frame had never been installed (recorded address `0x0`).
    pub empty_victims: u64,
    /// Victims absent from the trace: safe evictions, since trace coverage
    /// says they will not be re-referenced.
    pub speculative_victims: u64,
    /// Victims chosen by the last-touch tie-break among several blocks with
    /// no future reference.
    pub lru_victims: u64,
    /// Victims that were the single block with no future reference.
    pub not_used_again_victims: u64,
    /// Victims with the farthest next future reference: the genuine OPT choice.
    pub opt_victims: u64,
}

impl OptStats {
    /// Prints the OPT statistics section to stdout.
    pub fn print(&self) {
        println!("OPT ORACLE");
        println!("  opt.empty_victims      {}", self.empty_victims);
        println!("  opt.speculative        {}", self.speculative_victims);
        println!("  opt.not_used_again     {}", self.not_used_again_victims);
        println!("  opt.lru_victims        {}", self.lru_victims);
        println!("  opt.opt_victims        {}", self.opt_victims);
        println!("----------------------------------------------------------");
    }
}

/// Hit/miss statistics of the cache wrapper.
#[derive(Clone, Debug, Default)]
pub struct CacheStats {
    /// Demand accesses that hit.
    pub hits: u64,
    /// Demand accesses that missed.
    pub misses: u64,
    /// Blocks written back on eviction.
    pub writebacks: u64,
    /// MSHRs allocated (primary misses).
    pub mshr_allocations: u64,
}

impl CacheStats {
    /// Prints the cache statistics section to stdout.
    pub fn print(&self) {
        let total = self.hits + self.misses;
        let miss_rate = if total > 0 {
            (self.misses as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        println!("CACHE");
        println!("  cache.accesses         {}", total);
        println!("  cache.hits             {}", self.hits);
        println!("  cache.misses           {}", self.misses);
        println!("  cache.miss_rate        {:.2}%", miss_rate);
        println!("  cache.writebacks       {}", self.writebacks);
        println!("  cache.mshr_allocs      {}", self.mshr_allocations);
        println!("----------------------------------------------------------");
    }
}

/// Replay driver bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct DriverStats {
    /// Accesses issued from the trace.
    pub accesses: u64,
    /// Timing responses drained from the cache.
    pub responses: u64,
    /// Miss packets serviced by the memory model.
    pub mem_reads: u64,
    /// Writeback packets absorbed by the memory model.
    pub mem_writebacks: u64,
    /// Final simulated tick.
    pub ticks: u64,
}

impl DriverStats {
    /// Prints the replay summary section to stdout.
    pub fn print(&self) {
        println!("==========================================================");
        println!("SHEPSIM REPLAY STATISTICS");
        println!("==========================================================");
        println!("sim_accesses             {}", self.accesses);
        println!("sim_responses            {}", self.responses);
        println!("sim_mem_reads            {}", self.mem_reads);
        println!("sim_mem_writebacks       {}", self.mem_writebacks);
        println!("sim_ticks                {}", self.ticks);
        println!("----------------------------------------------------------");
    }
}
