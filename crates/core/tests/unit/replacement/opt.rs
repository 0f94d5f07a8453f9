//! OPT Oracle Unit Tests.
//!
//! Verifies the trace-driven victim selection protocol: empty frames first,
//! speculative eviction of blocks outside trace coverage, the never-used-again
//! path with its last-touch tie-break, and the genuine farthest-future choice.
//! Each test pins down which victim-class statistic accounts for the choice.

use shepsim_core::mem::cache::block::ReplData;
use shepsim_core::mem::cache::replacement::{Candidate, Opt, Replacer};

use crate::common::{read_pkt, trace_of};

// ──────────────────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────────────────

/// Block addresses used by the trace scenarios.
const A: u64 = 0x1000;
const B: u64 = 0x2000;
const C: u64 = 0x3000;
const D: u64 = 0x4000;
const X: u64 = 0x9000;

/// A candidate at `way` with a recorded address and last-touch stamp.
fn cand(way: u32, addr: u64, last_touch: u64) -> Candidate {
    Candidate {
        way,
        blk: way as usize,
        data: ReplData {
            last_touch_tick: last_touch,
            addr,
        },
    }
}

/// Advances the oracle clock by `n` without touching any candidate state.
fn advance(opt: &mut Opt, n: u64) {
    let mut scratch = ReplData::default();
    for _ in 0..n {
        opt.touch(&mut scratch);
    }
}

// ══════════════════════════════════════════════════════════
// 1. Farthest Future Reference
// ══════════════════════════════════════════════════════════

/// Trace [A, B, C, A, D, B] at clock 2: next references are A -> 3, B -> 5,
/// D -> 4. B is farthest and wins.
#[test]
fn picks_the_farthest_next_reference() {
    let mut opt = Opt::new(trace_of(&[A, B, C, A, D, B]));
    advance(&mut opt, 2);

    let candidates = [cand(0, A, 10), cand(1, B, 11), cand(2, D, 12)];
    let victim = opt.get_victim(&candidates);

    assert_eq!(candidates[victim].data.addr, B);
    assert_eq!(opt.stats().opt_victims, 1);
    assert_eq!(opt.stats().not_used_again_victims, 0);
}

/// The farthest-future choice does not depend on where the winner sits in
/// the candidate list.
#[test]
fn farthest_choice_is_order_independent() {
    let mut opt = Opt::new(trace_of(&[A, B, A, B]));
    advance(&mut opt, 1);

    // Next references: A -> 2, B -> 3.
    let candidates = [cand(0, A, 0), cand(1, B, 0)];
    assert_eq!(opt.get_victim(&candidates), 1);

    // Same clock, candidates reversed: the same block wins regardless of order.
    let candidates = [cand(0, B, 0), cand(1, A, 0)];
    assert_eq!(opt.get_victim(&candidates), 0);
}

// ══════════════════════════════════════════════════════════
// 2. Never Used Again
// ══════════════════════════════════════════════════════════

/// Trace [A, B, C, A] at clock 3: no candidate has a future reference, so the
/// smallest last-touch timestamp wins and the tie-break statistic accounts
/// for it.
#[test]
fn dead_blocks_fall_back_to_last_touch() {
    let mut opt = Opt::new(trace_of(&[A, B, C, A]));
    advance(&mut opt, 3);

    let candidates = [cand(0, A, 30), cand(1, B, 10), cand(2, C, 20)];
    let victim = opt.get_victim(&candidates);

    assert_eq!(candidates[victim].data.addr, B, "B was touched longest ago");
    assert_eq!(opt.stats().lru_victims, 1, "several dead blocks: LRU decided");
    assert_eq!(opt.stats().opt_victims, 0);
}

/// A single dead block is chosen outright and accounted separately from the
/// tie-break.
#[test]
fn a_single_dead_block_is_chosen_outright() {
    let mut opt = Opt::new(trace_of(&[A, B, C, A, B]));
    advance(&mut opt, 2);

    // Next references: A -> 3, B -> 4; C is never referenced again.
    let candidates = [cand(0, A, 1), cand(1, B, 2), cand(2, C, 3)];
    let victim = opt.get_victim(&candidates);

    assert_eq!(candidates[victim].data.addr, C);
    assert_eq!(opt.stats().not_used_again_victims, 1);
    assert_eq!(opt.stats().lru_victims, 0);
}

// ══════════════════════════════════════════════════════════
// 3. Speculative Victims
// ══════════════════════════════════════════════════════════

/// A candidate absent from the trace is evicted immediately: trace coverage
/// says it will not be re-referenced.
#[test]
fn uncovered_blocks_are_speculative_victims() {
    let mut opt = Opt::new(trace_of(&[A, B]));

    let candidates = [cand(0, A, 1), cand(1, X, 2)];
    let victim = opt.get_victim(&candidates);

    assert_eq!(candidates[victim].data.addr, X);
    assert_eq!(opt.stats().speculative_victims, 1);
    assert_eq!(opt.stats().opt_victims, 0);
    assert_eq!(opt.stats().not_used_again_victims, 0);
}

/// The scan stops at the first uncovered candidate even when a covered one
/// with a far future follows it.
#[test]
fn speculative_scan_stops_early() {
    let mut opt = Opt::new(trace_of(&[A, B, A, B]));

    let candidates = [cand(0, X, 1), cand(1, A, 2), cand(2, B, 3)];
    assert_eq!(opt.get_victim(&candidates), 0);
    assert_eq!(opt.stats().speculative_victims, 1);
}

// ══════════════════════════════════════════════════════════
// 4. Empty Frames
// ══════════════════════════════════════════════════════════

/// A recorded address of zero marks a never-installed frame and always wins,
/// regardless of what the trace says about the others.
#[test]
fn empty_frames_always_win() {
    let mut opt = Opt::new(trace_of(&[A, B, A, B]));

    let candidates = [cand(0, A, 1), cand(1, 0, 0), cand(2, B, 2)];
    assert_eq!(opt.get_victim(&candidates), 1);
    assert_eq!(opt.stats().empty_victims, 1);

    // Even a speculative candidate earlier in the list does not preempt it.
    let candidates = [cand(0, X, 1), cand(1, 0, 0)];
    assert_eq!(opt.get_victim(&candidates), 1);
    assert_eq!(opt.stats().empty_victims, 2);
    assert_eq!(opt.stats().speculative_victims, 0);
}

// ══════════════════════════════════════════════════════════
// 5. Oracle Clock
// ══════════════════════════════════════════════════════════

/// Touches and resets both advance the clock and stamp it into the entry.
#[test]
fn touch_and_reset_advance_the_clock() {
    let mut opt = Opt::new(trace_of(&[A, B]));
    let mut data = ReplData::default();

    opt.touch(&mut data);
    assert_eq!(opt.access_counter(), 1);
    assert_eq!(data.last_touch_tick, 1);

    opt.reset_with_packet(&mut data, &read_pkt(A));
    assert_eq!(opt.access_counter(), 2);
    assert_eq!(data.last_touch_tick, 2);
    assert_eq!(data.addr, A, "reset records the fill address");
}

/// The clock moves the farthest-future decision: what is far now is near
/// later.
#[test]
fn victim_changes_as_the_clock_advances() {
    let mut opt = Opt::new(trace_of(&[A, B, A, B, A]));
    let candidates = [cand(0, A, 1), cand(1, B, 2)];

    // Clock 0: next A -> 2, next B -> 1. A is farther.
    assert_eq!(opt.get_victim(&candidates), 0);

    // Clock 3: next A -> 4, B never again. B dies.
    advance(&mut opt, 3);
    let victim = opt.get_victim(&candidates);
    assert_eq!(candidates[victim].data.addr, B);
    assert_eq!(opt.stats().not_used_again_victims, 1);
}

/// Invalidation clears only the last-touch stamp; the recorded address
/// survives for the next lookup.
#[test]
fn invalidate_clears_the_stamp() {
    let mut opt = Opt::new(trace_of(&[A]));
    let mut data = ReplData::default();
    opt.reset_with_packet(&mut data, &read_pkt(A));

    opt.invalidate(&mut data);
    assert_eq!(data.last_touch_tick, 0);
    assert_eq!(data.addr, A);
}

// ══════════════════════════════════════════════════════════
// 6. Misuse
// ══════════════════════════════════════════════════════════

/// Resetting without a packet is a configuration error: the oracle cannot
/// key its trace without an address.
#[test]
#[should_panic(expected = "requires packet address")]
fn reset_without_a_packet_panics() {
    let mut opt = Opt::new(trace_of(&[A]));
    let mut data = ReplData::default();
    opt.reset(&mut data);
}

/// An empty candidate list is an internal invariant violation.
#[test]
#[should_panic(expected = "at least one replacement candidate")]
fn empty_candidate_list_panics() {
    let mut opt = Opt::new(trace_of(&[A]));
    opt.get_victim(&[]);
}
