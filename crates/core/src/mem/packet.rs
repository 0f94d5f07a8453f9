//! Memory packets.
//!
//! This module defines the unit of communication between the replay driver,
//! the cache, and the memory below it. It provides:
//! 1. **Commands:** The request/response command set with per-command attributes.
//! 2. **Packets:** Address, size, payload, delays, and response conversion.
//!
//! The command set is the non-coherent subset a cache below the point of
//! coherence can see: reads, writes, and writebacks. Snoops and atomics have
//! no representation here; the cache wrapper rejects those entry points
//! outright.

use crate::common::{Addr, RequestorId, Tick};

/// Memory command carried by a [`Packet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemCmd {
    /// Demand read request.
    ReadReq,
    /// Response to a [`MemCmd::ReadReq`]; carries the requested bytes.
    ReadResp,
    /// Demand write request.
    WriteReq,
    /// Response to a [`MemCmd::WriteReq`].
    WriteResp,
    /// Eviction of a dirty block from a cache above; carries the block bytes.
    WritebackDirty,
    /// Write of a clean block from a cache above; carries the block bytes.
    WriteClean,
}

impl MemCmd {
    /// Whether this command reads data.
    pub fn is_read(self) -> bool {
        matches!(self, MemCmd::ReadReq | MemCmd::ReadResp)
    }

    /// Whether this command writes data.
    ///
    /// Writebacks count as writes: they deposit bytes into the receiving cache.
    pub fn is_write(self) -> bool {
        matches!(
            self,
            MemCmd::WriteReq | MemCmd::WritebackDirty | MemCmd::WriteClean
        )
    }

    /// Whether this command is an eviction-style writeback.
    pub fn is_writeback(self) -> bool {
        matches!(self, MemCmd::WritebackDirty | MemCmd::WriteClean)
    }

    /// Whether this command is a response.
    pub fn is_response(self) -> bool {
        matches!(self, MemCmd::ReadResp | MemCmd::WriteResp)
    }

    /// Whether a request with this command expects a timing response.
    pub fn needs_response(self) -> bool {
        matches!(self, MemCmd::ReadReq | MemCmd::WriteReq)
    }

    /// The response command paired with this request command.
    ///
    /// # Panics
    ///
    /// Panics if the command does not expect a response.
    pub fn response(self) -> MemCmd {
        match self {
            MemCmd::ReadReq => MemCmd::ReadResp,
            MemCmd::WriteReq => MemCmd::WriteResp,
            other => panic!("command {:?} does not expect a response", other),
        }
    }
}

/// A memory request or response in flight.
#[derive(Clone, Debug)]
pub struct Packet {
    /// The command this packet performs.
    pub cmd: MemCmd,
    /// Byte address of the access.
    pub addr: Addr,
    /// Access size in bytes.
    pub size: usize,
    /// Whether the access targets the secure address space.
    pub secure: bool,
    /// Identifier of the issuing agent.
    pub requestor: RequestorId,
    /// Interconnect header delay accumulated so far.
    pub header_delay: Tick,
    /// Interconnect payload delay accumulated so far.
    pub payload_delay: Tick,
    /// Set when a snooping cache upstream claims the response.
    ///
    /// Always false in this non-coherent configuration; the wrapper panics
    /// if it ever sees it set.
    pub cache_responding: bool,
    data: Option<Vec<u8>>,
    error: bool,
}

impl Packet {
    /// Creates a request packet with no payload.
    pub fn request(cmd: MemCmd, addr: Addr, size: usize, requestor: RequestorId) -> Self {
        Self {
            cmd,
            addr,
            size,
            secure: false,
            requestor,
            header_delay: 0,
            payload_delay: 0,
            cache_responding: false,
            data: None,
            error: false,
        }
    }

    /// Creates a write request carrying `data`.
    pub fn write(addr: Addr, data: Vec<u8>, requestor: RequestorId) -> Self {
        let size = data.len();
        let mut pkt = Self::request(MemCmd::WriteReq, addr, size, requestor);
        pkt.data = Some(data);
        pkt
    }

    /// Creates a writeback packet carrying a full block.
    pub fn writeback(cmd: MemCmd, addr: Addr, secure: bool, data: Vec<u8>) -> Self {
        assert!(cmd.is_writeback(), "writeback packet needs a writeback command");
        let size = data.len();
        let mut pkt = Self::request(cmd, addr, size, 0);
        pkt.secure = secure;
        pkt.data = Some(data);
        pkt
    }

    /// Whether this packet reads data.
    pub fn is_read(&self) -> bool {
        self.cmd.is_read()
    }

    /// Whether this packet writes data.
    pub fn is_write(&self) -> bool {
        self.cmd.is_write()
    }

    /// Whether this packet is an eviction-style writeback.
    pub fn is_writeback(&self) -> bool {
        self.cmd.is_writeback()
    }

    /// Whether this packet is a response.
    pub fn is_response(&self) -> bool {
        self.cmd.is_response()
    }

    /// Whether this packet expects a timing response.
    pub fn needs_response(&self) -> bool {
        self.cmd.needs_response()
    }

    /// Whether this packet targets the secure address space.
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Whether an error has been flagged on this packet.
    pub fn is_error(&self) -> bool {
        self.error
    }

    /// Copies the error state from another packet.
    pub fn copy_error(&mut self, other: &Packet) {
        self.error = other.error;
    }

    /// The address of this access rounded down to its block.
    pub fn block_addr(&self, blk_size: usize) -> Addr {
        self.addr & !(blk_size as Addr - 1)
    }

    /// The byte offset of this access within its block.
    pub fn offset(&self, blk_size: usize) -> usize {
        (self.addr as usize) & (blk_size - 1)
    }

    /// Converts this request into its timing response in place.
    ///
    /// # Panics
    ///
    /// Panics if the command does not expect a response.
    pub fn make_timing_response(&mut self) {
        self.cmd = self.cmd.response();
    }

    /// Attaches a payload to this packet.
    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = Some(data);
    }

    /// The payload, if any.
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }
}
