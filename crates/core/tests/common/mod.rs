//! Shared fixtures for the simulator tests.


use std::io::Cursor;

use shepsim_core::config::{CacheParams, ReplacementKind, TagStoreKind};
use shepsim_core::mem::cache::trace::AccessTrace;
use shepsim_core::mem::packet::{MemCmd, Packet};

/// Builds an in-memory access trace from a list of block addresses.
pub fn trace_of(addrs: &[u64]) -> AccessTrace {
    let text: String = addrs
        .iter()
        .map(|a| format!("{:#x}\n", a))
        .collect();
    AccessTrace::from_reader(Cursor::new(text), "inline").unwrap()
}

/// Cache parameters for a single-set shepherd store.
///
/// `sc_assoc + mc_assoc` ways, 64-byte blocks, one set. With one set every
/// block-aligned address lands in set 0 and the tag is `addr / 64`.
pub fn shepherd_params(sc_assoc: usize, mc_assoc: usize) -> CacheParams {
    let assoc = sc_assoc + mc_assoc;
    CacheParams {
        size_bytes: 64 * assoc,
        block_bytes: 64,
        assoc,
        sc_assoc,
        tag_store: TagStoreKind::Shepherd,
        policy: ReplacementKind::Lru,
        ..CacheParams::default()
    }
}

/// Cache parameters for a plain set-associative store.
pub fn set_assoc_params(num_sets: usize, assoc: usize) -> CacheParams {
    CacheParams {
        size_bytes: 64 * assoc * num_sets,
        block_bytes: 64,
        assoc,
        tag_store: TagStoreKind::SetAssociative,
        policy: ReplacementKind::Lru,
        ..CacheParams::default()
    }
}

/// A one-byte read request at `addr`.
pub fn read_pkt(addr: u64) -> Packet {
    Packet::request(MemCmd::ReadReq, addr, 1, 0)
}

/// A one-byte write request at `addr` carrying `val`.
pub fn write_pkt(addr: u64, val: u8) -> Packet {
    Packet::write(addr, vec![val], 0)
}

/// A block-sized read response for the block containing `addr`.
pub fn fill_resp(addr: u64, blk_size: usize) -> Packet {
    let mut pkt = Packet::request(MemCmd::ReadReq, addr & !(blk_size as u64 - 1), blk_size, 0);
    pkt.set_data(vec![0; blk_size]);
    pkt.make_timing_response();
    pkt
}
