//! Cache block metadata.
//!
//! This module defines the per-block state shared by every tag store:
//! 1. **Identity:** Tag, set, and way; the set/way assignment of a block is
//!    fixed at init and identity is by slot, never by pointer.
//! 2. **Status:** Validity, dirtiness, writability, and the secure-space flag.
//! 3. **Replacement state:** The [`ReplData`] owned by the block and operated
//!    on by the configured replacement policy.

use std::fmt;

use crate::common::{Addr, Tick};

/// Replacement state owned by a cache block.
///
/// Policies read and write this through the block; they keep no per-block
/// state of their own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplData {
    /// Timestamp of the last touch or reset, stamped from the policy's own
    /// monotone access counter.
    pub last_touch_tick: Tick,
    /// Block address recorded on the last reset-with-packet.
    ///
    /// Zero means the slot has never been installed; the OPT oracle keys its
    /// trace lookups off this field.
    pub addr: Addr,
}

/// Metadata of one cache block.
#[derive(Clone, Debug)]
pub struct CacheBlk {
    tag: Addr,
    set: u32,
    way: u32,
    valid: bool,
    dirty: bool,
    writable: bool,
    secure: bool,
    ref_count: u64,
    tick_inserted: Tick,
    /// Replacement state operated on by the configured policy.
    pub repl: ReplData,
}

impl CacheBlk {
    /// Creates an invalid block pinned to its set and way.
    pub fn new(set: u32, way: u32) -> Self {
        Self {
            tag: 0,
            set,
            way,
            valid: false,
            dirty: false,
            writable: false,
            secure: false,
            ref_count: 0,
            tick_inserted: 0,
            repl: ReplData::default(),
        }
    }

    /// The tag imprinted on the last insert.
    pub fn tag(&self) -> Addr {
        self.tag
    }

    /// The set this slot belongs to. Immutable for the block's lifetime.
    pub fn set(&self) -> u32 {
        self.set
    }

    /// The way this slot occupies within its set.
    pub fn way(&self) -> u32 {
        self.way
    }

    /// Whether the block holds valid data.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Whether the block has been modified since the fill.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the block may be written without further permission.
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Whether the block belongs to the secure address space.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Number of references since the fill.
    pub fn ref_count(&self) -> u64 {
        self.ref_count
    }

    /// Tag-store tick at which the block was inserted.
    pub fn tick_inserted(&self) -> Tick {
        self.tick_inserted
    }

    /// Whether this block matches a lookup for `tag` in `secure` space.
    pub fn matches(&self, tag: Addr, secure: bool) -> bool {
        self.valid && self.tag == tag && self.secure == secure
    }

    /// Imprints identity on the block and marks it valid.
    ///
    /// # Panics
    ///
    /// Panics if the block is already valid; victims must be invalidated
    /// before reuse.
    pub fn insert(&mut self, tag: Addr, secure: bool, tick: Tick) {
        assert!(!self.valid, "inserting into a valid block");
        self.tag = tag;
        self.secure = secure;
        self.valid = true;
        self.dirty = false;
        self.writable = false;
        self.ref_count = 0;
        self.tick_inserted = tick;
    }

    /// Marks the block dirty.
    pub fn set_dirty(&mut self) {
        self.dirty = true;
    }

    /// Marks the block writable.
    pub fn set_writable(&mut self) {
        self.writable = true;
    }

    /// Records one reference to the block.
    pub fn increase_ref_count(&mut self) {
        self.ref_count += 1;
    }

    /// Invalidates the block and clears all status bits.
    ///
    /// Invalidating an already-invalid block is a no-op.
    pub fn invalidate(&mut self) {
        self.valid = false;
        self.dirty = false;
        self.writable = false;
        self.secure = false;
        self.ref_count = 0;
        self.tag = 0;
    }

    /// Moves this block's metadata out for migration into another slot.
    ///
    /// Everything except the slot identity (set, way) is transferred; the
    /// source is left invalid with default replacement state.
    pub(crate) fn take_for_move(&mut self) -> MovedBlk {
        let moved = MovedBlk {
            tag: self.tag,
            valid: self.valid,
            dirty: self.dirty,
            writable: self.writable,
            secure: self.secure,
            ref_count: self.ref_count,
            tick_inserted: self.tick_inserted,
            repl: self.repl,
        };
        self.invalidate();
        self.repl = ReplData::default();
        moved
    }

    /// Receives metadata taken from another slot in the same set.
    pub(crate) fn receive_move(&mut self, moved: MovedBlk) {
        self.tag = moved.tag;
        self.valid = moved.valid;
        self.dirty = moved.dirty;
        self.writable = moved.writable;
        self.secure = moved.secure;
        self.ref_count = moved.ref_count;
        self.tick_inserted = moved.tick_inserted;
        self.repl = moved.repl;
    }
}

/// Block metadata in flight between two slots of a set.
pub(crate) struct MovedBlk {
    tag: Addr,
    valid: bool,
    dirty: bool,
    writable: bool,
    secure: bool,
    ref_count: u64,
    tick_inserted: Tick,
    repl: ReplData,
}

impl fmt::Display for CacheBlk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "set {:#x} way {:#x} tag {:#x} valid ({}) dirty ({}) writable ({})",
            self.set, self.way, self.tag, self.valid, self.dirty, self.writable
        )
    }
}
