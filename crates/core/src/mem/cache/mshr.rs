//! Miss Status Holding Registers.
//!
//! Tracks outstanding misses. Each MSHR owns the block address being fetched
//! and the list of deferred requests (targets) waiting on the fill; secondary
//! misses to the same block coalesce onto the existing entry instead of
//! issuing another fetch.

use crate::common::{Addr, Tick};
use crate::mem::packet::Packet;

/// One deferred request waiting on a fill.
#[derive(Debug)]
pub struct MshrTarget {
    /// The original request packet.
    pub pkt: Packet,
    /// Tick at which the request was received.
    pub recv_tick: Tick,
}

/// One outstanding miss.
#[derive(Debug)]
pub struct Mshr {
    /// Block address being fetched.
    pub blk_addr: Addr,
    /// Whether the fetch targets the secure address space.
    pub secure: bool,
    targets: Vec<MshrTarget>,
}

impl Mshr {
    fn new(blk_addr: Addr, secure: bool, pkt: Packet, recv_tick: Tick) -> Self {
        Self {
            blk_addr,
            secure,
            targets: vec![MshrTarget { pkt, recv_tick }],
        }
    }

    /// Defers another request onto this miss.
    pub fn allocate_target(&mut self, pkt: Packet, recv_tick: Tick) {
        self.targets.push(MshrTarget { pkt, recv_tick });
    }

    /// Number of deferred requests.
    pub fn num_targets(&self) -> usize {
        self.targets.len()
    }

    /// Takes the deferred requests for servicing, oldest first.
    pub fn extract_targets(&mut self) -> Vec<MshrTarget> {
        std::mem::take(&mut self.targets)
    }
}

/// The queue of outstanding misses.
#[derive(Debug, Default)]
pub struct MshrQueue {
    mshrs: Vec<Mshr>,
}

impl MshrQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the MSHR fetching `blk_addr`, if any.
    pub fn find_match(&self, blk_addr: Addr, secure: bool) -> Option<usize> {
        self.mshrs
            .iter()
            .position(|m| m.blk_addr == blk_addr && m.secure == secure)
    }

    /// Allocates a new MSHR for a primary miss.
    pub fn allocate(&mut self, blk_addr: Addr, secure: bool, pkt: Packet, recv_tick: Tick) -> usize {
        debug_assert!(
            self.find_match(blk_addr, secure).is_none(),
            "duplicate MSHR for block {:#x}",
            blk_addr
        );
        self.mshrs.push(Mshr::new(blk_addr, secure, pkt, recv_tick));
        self.mshrs.len() - 1
    }

    /// Mutable access to an MSHR.
    pub fn get_mut(&mut self, index: usize) -> &mut Mshr {
        &mut self.mshrs[index]
    }

    /// Removes and returns a completed MSHR.
    pub fn deallocate(&mut self, index: usize) -> Mshr {
        self.mshrs.swap_remove(index)
    }

    /// Number of outstanding misses.
    pub fn len(&self) -> usize {
        self.mshrs.len()
    }

    /// Whether no miss is outstanding.
    pub fn is_empty(&self) -> bool {
        self.mshrs.is_empty()
    }
}
