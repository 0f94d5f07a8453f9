//! Cache replacement policies.
//!
//! Implements the victim-selection algorithms consulted by the tag stores.
//!
//! # Policies
//!
//! - `Lru`: Least Recently Used by last-touch timestamp.
//! - `Random`: Pseudo-random selection via a xorshift LFSR.
//! - `Opt`: Belady's optimal policy, driven by a pre-loaded future-access trace.
//!
//! A policy owns no per-block state: each block carries its own
//! [`ReplData`](crate::mem::cache::block::ReplData) and the policy operates on
//! it through the [`Replacer`] trait. The tag store presents victims as a
//! [`Candidate`] list; the returned index is a position in that list, so ties
//! are broken by candidate order.

/// Least Recently Used replacement policy.
pub mod lru;

/// Belady's optimal (OPT) replacement policy.
pub mod opt;

/// Random replacement policy.
pub mod random;

pub use lru::Lru;
pub use opt::Opt;
pub use random::Random;

use crate::common::ConfigError;
use crate::config::{ReplacementKind, TraceParams};
use crate::mem::cache::block::ReplData;
use crate::mem::cache::trace::AccessTrace;
use crate::mem::packet::Packet;

/// One replacement candidate offered to a policy.
///
/// Carries the way for diagnostics, the tag-store slot the choice maps back
/// to, and a copy of the block's replacement state.
#[derive(Clone, Copy, Debug)]
pub struct Candidate {
    /// Way of the candidate within its set.
    pub way: u32,
    /// Tag-store slot index of the candidate.
    pub blk: usize,
    /// The candidate's replacement state.
    pub data: ReplData,
}

/// Trait for cache replacement policies.
///
/// Defines the capability set the tag stores consume: touch, reset,
/// invalidate, victim selection, and fresh-state instantiation.
pub trait Replacer {
    /// Clears the replacement state of an invalidated block.
    fn invalidate(&mut self, data: &mut ReplData);

    /// Updates the replacement state when a block is accessed.
    fn touch(&mut self, data: &mut ReplData);

    /// Resets the replacement state when a block is inserted, without
    /// address information.
    ///
    /// Policies that require the fill address (OPT) panic here; callers on
    /// the insert path should prefer [`Replacer::reset_with_packet`].
    fn reset(&mut self, data: &mut ReplData);

    /// Resets the replacement state when a block is inserted, recording the
    /// fill packet's address where the policy needs it.
    fn reset_with_packet(&mut self, data: &mut ReplData, pkt: &Packet) {
        let _ = pkt;
        self.reset(data);
    }

    /// Selects a victim among the candidates.
    ///
    /// # Arguments
    ///
    /// * `candidates` - The universe to choose from; must be non-empty.
    ///
    /// # Returns
    ///
    /// The index of the chosen candidate within `candidates`.
    fn get_victim(&mut self, candidates: &[Candidate]) -> usize;

    /// Instantiates fresh replacement state for a new block.
    fn instantiate_entry(&self) -> ReplData {
        ReplData::default()
    }

    /// Prints any policy-specific statistics to stdout.
    fn print_stats(&self) {}
}

/// Builds the configured replacement policy.
///
/// The OPT policy loads its future-access trace through the benchmark
/// pointer file named in `trace`; the other policies ignore it.
pub fn build_replacer(
    kind: ReplacementKind,
    trace: &TraceParams,
) -> Result<Box<dyn Replacer>, ConfigError> {
    Ok(match kind {
        ReplacementKind::Lru => Box::new(Lru::new()),
        ReplacementKind::Random => Box::new(Random::new()),
        ReplacementKind::Opt => Box::new(Opt::new(AccessTrace::load(&trace.benchmark_file)?)),
    })
}
