//! Common types shared across the simulator.
//!
//! This module defines the primitive vocabulary of the memory subsystem:
//! 1. **Aliases:** Byte addresses, simulator ticks, and latency cycle counts.
//! 2. **Errors:** Configuration failures surfaced during construction.

/// Configuration error definitions.
pub mod error;

pub use error::ConfigError;

/// A byte address in the simulated physical address space.
///
/// Cache geometry is index arithmetic end to end, so addresses stay raw
/// 64-bit integers rather than wrapped newtypes.
pub type Addr = u64;

/// A point in simulated time.
///
/// Ticks are dimensionless and monotone; each component that needs an
/// ordering (replacement timestamps, response scheduling) advances its own.
pub type Tick = u64;

/// A latency expressed in cycles.
pub type Cycles = u64;

/// Identifier of the agent that issued a request.
pub type RequestorId = u16;
