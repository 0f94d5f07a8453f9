//! Cache-replacement research simulator library.
//!
//! This crate implements a trace-driven prototype for studying cache
//! replacement, with the following:
//! 1. **OPT:** Belady's optimal policy as a trace-driven oracle.
//! 2. **Shepherd:** A counter-based practical approximation of OPT, built on
//!    a tag store that splits each set into measurement and storage regions.
//! 3. **Plumbing:** Generic set-associative indexing, a plain baseline tag
//!    store, a non-coherent timing cache with MSHRs, and a replay driver.
//! 4. **Inputs:** A benchmark pointer file naming an access-order trace.

/// Common types and configuration errors.
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical structures).
pub mod config;
/// Memory subsystem: packets, tag stores, replacement policies, the cache.
pub mod mem;
/// Trace replay driver.
pub mod sim;
/// Statistics collection and reporting.
pub mod stats;

/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// The timing cache; construct with `NonCoherentCache::build`.
pub use crate::mem::cache::NonCoherentCache;
/// The loaded access-order trace consumed by OPT and the replay driver.
pub use crate::mem::cache::trace::AccessTrace;
/// Trace replay driver; pairs a cache with a flat-latency memory.
pub use crate::sim::Driver;
