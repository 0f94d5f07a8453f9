//! LRU Policy Unit Tests.
//!
//! Verifies timestamp stamping on touch/reset, victim selection by smallest
//! last-touch, and the preference for never-touched entries.

use shepsim_core::mem::cache::block::ReplData;
use shepsim_core::mem::cache::replacement::{Candidate, Lru, Replacer};

/// A candidate whose replacement state carries `last_touch`.
fn cand(way: u32, last_touch: u64) -> Candidate {
    Candidate {
        way,
        blk: way as usize,
        data: ReplData {
            last_touch_tick: last_touch,
            addr: 0,
        },
    }
}

// ══════════════════════════════════════════════════════════
// 1. Stamping
// ══════════════════════════════════════════════════════════

/// Touch and reset stamp a strictly increasing counter.
#[test]
fn touch_and_reset_stamp_increasing_ticks() {
    let mut lru = Lru::new();
    let mut a = ReplData::default();
    let mut b = ReplData::default();

    lru.touch(&mut a);
    lru.reset(&mut b);
    lru.touch(&mut a);

    assert!(a.last_touch_tick > b.last_touch_tick);
    assert_eq!(b.last_touch_tick, 2);
    assert_eq!(a.last_touch_tick, 3);
}

/// Invalidation resets the stamp to zero.
#[test]
fn invalidate_zeroes_the_stamp() {
    let mut lru = Lru::new();
    let mut data = ReplData::default();
    lru.touch(&mut data);

    lru.invalidate(&mut data);
    assert_eq!(data.last_touch_tick, 0);
}

// ══════════════════════════════════════════════════════════
// 2. Victim Selection
// ══════════════════════════════════════════════════════════

/// The smallest last-touch timestamp loses.
#[test]
fn evicts_the_least_recently_touched() {
    let mut lru = Lru::new();
    let candidates = [cand(0, 30), cand(1, 10), cand(2, 20)];
    assert_eq!(lru.get_victim(&candidates), 1);
}

/// Never-touched entries (stamp zero) are evicted before touched ones.
#[test]
fn prefers_never_touched_entries() {
    let mut lru = Lru::new();
    let candidates = [cand(0, 5), cand(1, 0), cand(2, 7)];
    assert_eq!(lru.get_victim(&candidates), 1);
}

/// Equal stamps break toward the front of the candidate list.
#[test]
fn ties_break_by_candidate_order() {
    let mut lru = Lru::new();
    let candidates = [cand(0, 4), cand(1, 4), cand(2, 9)];
    assert_eq!(lru.get_victim(&candidates), 0);
}
