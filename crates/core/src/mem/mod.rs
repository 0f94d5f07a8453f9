//! Memory subsystem.
//!
//! This module hosts the packet vocabulary and the cache model:
//! 1. **Packets:** Request/response commands and their attributes.
//! 2. **Cache:** Tag stores, replacement policies, MSHRs, and the
//!    non-coherent wrapper that ties them together.

/// Cache model: blocks, tag stores, replacement policies, MSHRs, wrapper.
pub mod cache;
/// Memory packets and command attributes.
pub mod packet;
