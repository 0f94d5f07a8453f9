//! Configuration system for the cache simulator.
//!
//! This module defines all configuration structures and enums used to
//! parameterize a simulated cache. It provides:
//! 1. **Defaults:** Baseline geometry (size, block size, associativity, shepherd split).
//! 2. **Structures:** Hierarchical config for the cache, the memory below it, and the trace inputs.
//! 3. **Enums:** Tag store, indexing policy, and replacement policy selectors.
//!
//! Configuration is supplied as JSON (see the example below) or via
//! `Config::default()` for quick experiments.

use serde::Deserialize;

/// Default configuration constants for the simulator.
///
/// These values define the baseline cache when a field is not explicitly
/// overridden in the JSON configuration.
mod defaults {
    /// Total cache size in bytes (32 KiB).
    pub const CACHE_SIZE: usize = 32 * 1024;

    /// Cache block size in bytes.
    ///
    /// Matches typical modern processor cache line sizes.
    pub const BLOCK_SIZE: usize = 64;

    /// Total associativity (ways per set).
    pub const ASSOC: usize = 8;

    /// Ways per set assigned to the shepherd (measurement) region.
    pub const SC_ASSOC: usize = 2;

    /// Tag lookup latency in cycles.
    pub const LOOKUP_LATENCY: u64 = 1;

    /// Latency of the return path from fill to response, in cycles.
    pub const RESPONSE_LATENCY: u64 = 2;

    /// Flat latency of the memory below the cache, in cycles.
    pub const MEMORY_LATENCY: u64 = 100;

    /// Benchmark pointer file consulted in the working directory.
    ///
    /// A single line naming the filesystem path of the access-order trace.
    pub const BENCHMARK_FILE: &str = "current_benchmark.txt";
}

/// Tag store implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum TagStoreKind {
    /// Plain set-associative tag store; the replacement policy sees every
    /// way of the set as a candidate.
    SetAssociative,
    /// Shepherd tag store: each set is split into a shepherd (measurement)
    /// region and a main (storage) region, with imminence counters driving
    /// an OPT-like victim choice.
    #[default]
    Shepherd,
}

/// Address-to-set indexing policies.
///
/// Only the generic set-associative policy exists today; the selector is kept
/// so that tag stores can reject indexing schemes they cannot drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum IndexingKind {
    /// Set-associative indexing with no power-of-two restriction on the
    /// number of sets; plain division and modulo throughout.
    #[default]
    SetAssociativeGeneric,
}

/// Cache replacement policy algorithms.
///
/// Selects the policy consulted by the tag store: directly for the plain
/// store, and as the tie-break fallback for the shepherd store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementKind {
    /// Least Recently Used: evicts the candidate with the smallest
    /// last-touch timestamp.
    #[default]
    #[serde(alias = "Lru")]
    Lru,
    /// Random selection via a xorshift LFSR.
    #[serde(alias = "Random")]
    Random,
    /// Belady's optimal policy, driven by a pre-loaded future-access trace.
    #[serde(alias = "Opt")]
    Opt,
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// Deserializing from JSON:
///
/// ```
/// use shepsim_core::config::{Config, ReplacementKind, TagStoreKind};
///
/// let json = r#"{
///     "cache": {
///         "size_bytes": 65536,
///         "block_bytes": 64,
///         "assoc": 16,
///         "sc_assoc": 4,
///         "tag_store": "Shepherd",
///         "policy": "LRU"
///     },
///     "memory": { "latency": 120 },
///     "trace": { "benchmark_file": "current_benchmark.txt" }
/// }"#;
///
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.cache.size_bytes, 65536);
/// assert_eq!(config.cache.tag_store, TagStoreKind::Shepherd);
/// assert_eq!(config.cache.policy, ReplacementKind::Lru);
/// assert_eq!(config.memory.latency, 120);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Cache geometry and policy selection.
    #[serde(default)]
    pub cache: CacheParams,
    /// Memory below the cache.
    #[serde(default)]
    pub memory: MemoryParams,
    /// Trace input locations.
    #[serde(default)]
    pub trace: TraceParams,
}

/// Cache geometry and policy parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheParams {
    /// Total cache size in bytes.
    #[serde(default = "CacheParams::default_size")]
    pub size_bytes: usize,

    /// Cache block size in bytes (power of two, at least 4).
    #[serde(default = "CacheParams::default_block")]
    pub block_bytes: usize,

    /// Indexing entry size in bytes; defaults to the block size.
    #[serde(default)]
    pub entry_bytes: Option<usize>,

    /// Total associativity (ways per set).
    #[serde(default = "CacheParams::default_assoc")]
    pub assoc: usize,

    /// Shepherd-region ways per set; the remaining `assoc - sc_assoc` ways
    /// form the main cache. Ignored by the plain set-associative store.
    #[serde(default = "CacheParams::default_sc_assoc")]
    pub sc_assoc: usize,

    /// Whether tags and data are accessed sequentially (data read only on a
    /// hit) or in parallel (data read on every lookup).
    #[serde(default)]
    pub sequential_access: bool,

    /// Write back clean blocks on eviction in addition to dirty ones.
    #[serde(default)]
    pub writeback_clean: bool,

    /// Tag lookup latency in cycles.
    #[serde(default = "CacheParams::default_lookup_latency")]
    pub lookup_latency: u64,

    /// Fill-to-response latency in cycles.
    #[serde(default = "CacheParams::default_response_latency")]
    pub response_latency: u64,

    /// Tag store implementation.
    #[serde(default)]
    pub tag_store: TagStoreKind,

    /// Indexing policy.
    #[serde(default)]
    pub indexing: IndexingKind,

    /// Replacement policy.
    #[serde(default)]
    pub policy: ReplacementKind,
}

impl CacheParams {
    /// Returns the default total cache size in bytes.
    fn default_size() -> usize {
        defaults::CACHE_SIZE
    }

    /// Returns the default block size in bytes.
    fn default_block() -> usize {
        defaults::BLOCK_SIZE
    }

    /// Returns the default associativity.
    fn default_assoc() -> usize {
        defaults::ASSOC
    }

    /// Returns the default shepherd-region associativity.
    fn default_sc_assoc() -> usize {
        defaults::SC_ASSOC
    }

    /// Returns the default tag lookup latency.
    fn default_lookup_latency() -> u64 {
        defaults::LOOKUP_LATENCY
    }

    /// Returns the default fill-to-response latency.
    fn default_response_latency() -> u64 {
        defaults::RESPONSE_LATENCY
    }

    /// The indexing entry size: explicit override or the block size.
    pub fn entry_size(&self) -> usize {
        self.entry_bytes.unwrap_or(self.block_bytes)
    }
}

impl Default for CacheParams {
    fn default() -> Self {
        Self {
            size_bytes: defaults::CACHE_SIZE,
            block_bytes: defaults::BLOCK_SIZE,
            entry_bytes: None,
            assoc: defaults::ASSOC,
            sc_assoc: defaults::SC_ASSOC,
            sequential_access: false,
            writeback_clean: false,
            lookup_latency: defaults::LOOKUP_LATENCY,
            response_latency: defaults::RESPONSE_LATENCY,
            tag_store: TagStoreKind::default(),
            indexing: IndexingKind::default(),
            policy: ReplacementKind::default(),
        }
    }
}

/// Memory-side parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryParams {
    /// Flat access latency of the memory below the cache, in cycles.
    #[serde(default = "MemoryParams::default_latency")]
    pub latency: u64,
}

impl MemoryParams {
    /// Returns the default memory latency.
    fn default_latency() -> u64 {
        defaults::MEMORY_LATENCY
    }
}

impl Default for MemoryParams {
    fn default() -> Self {
        Self {
            latency: defaults::MEMORY_LATENCY,
        }
    }
}

/// Trace input parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct TraceParams {
    /// Benchmark pointer file: a single line naming the access-order trace.
    #[serde(default = "TraceParams::default_benchmark_file")]
    pub benchmark_file: String,
}

impl TraceParams {
    /// Returns the default benchmark pointer file path.
    fn default_benchmark_file() -> String {
        defaults::BENCHMARK_FILE.to_string()
    }
}

impl Default for TraceParams {
    fn default() -> Self {
        Self {
            benchmark_file: defaults::BENCHMARK_FILE.to_string(),
        }
    }
}
