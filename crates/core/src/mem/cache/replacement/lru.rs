//! Least Recently Used (LRU) Replacement Policy.
//!
//! This policy evicts the candidate that has not been touched for the longest
//! time. Every touch or reset stamps the policy's own monotone access counter
//! into the block's replacement state; the victim is the candidate with the
//! smallest stamp. Invalid blocks carry a stamp of zero and therefore lose
//! every comparison, which makes them the first victims.
//!
//! This is also the default fallback consulted by the shepherd tag store when
//! its imminence counters carry no information about the candidates.

use super::{Candidate, Replacer};
use crate::common::Tick;
use crate::mem::cache::block::ReplData;

/// LRU policy state.
pub struct Lru {
    /// Monotone counter stamped into blocks on touch and reset.
    access_counter: Tick,
}

impl Lru {
    /// Creates a new LRU policy instance.
    pub fn new() -> Self {
        Self { access_counter: 0 }
    }
}

impl Default for Lru {
    fn default() -> Self {
        Self::new()
    }
}

impl Replacer for Lru {
    /// Resets the last-touch timestamp so the block loses every comparison.
    fn invalidate(&mut self, data: &mut ReplData) {
        data.last_touch_tick = 0;
    }

    /// Stamps the current access counter into the block.
    fn touch(&mut self, data: &mut ReplData) {
        self.access_counter += 1;
        data.last_touch_tick = self.access_counter;
    }

    /// Stamps the current access counter into the freshly inserted block.
    fn reset(&mut self, data: &mut ReplData) {
        self.access_counter += 1;
        data.last_touch_tick = self.access_counter;
    }

    /// Returns the candidate with the smallest last-touch timestamp.
    ///
    /// Ties are broken by candidate order.
    fn get_victim(&mut self, candidates: &[Candidate]) -> usize {
        assert!(!candidates.is_empty(), "there must be at least one replacement candidate");

        let mut victim = 0;
        for (i, candidate) in candidates.iter().enumerate() {
            if candidate.data.last_touch_tick < candidates[victim].data.last_touch_tick {
                victim = i;
            }
        }
        victim
    }
}
