//! Configuration error definitions.
//!
//! This module defines the error type for everything that can go wrong while
//! building a cache from its parameters. It provides:
//! 1. **Geometry errors:** Invalid associativity splits, block sizes, and set counts.
//! 2. **Trace errors:** Missing, empty, or malformed oracle trace inputs.
//! 3. **Error Handling:** Integration with the standard error traits so failures
//!    propagate with `?` up to the front end.
//!
//! Protocol violations and internal invariant breakage are deliberately *not*
//! represented here: the simulator treats those as programmer errors and panics,
//! matching the abort-on-misuse discipline of the replacement protocol.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors raised while constructing a cache, tag store, or replacement policy.
///
/// All variants are fatal: the front end reports them and exits. There is no
/// retry or recovery path.
#[derive(Debug)]
pub enum ConfigError {
    /// The benchmark pointer file could not be read.
    ///
    /// The pointer file is a single line naming the access-order trace; the
    /// OPT oracle cannot be built without it.
    BenchmarkFile(PathBuf, io::Error),

    /// The access-order trace file could not be read.
    TraceFile(PathBuf, io::Error),

    /// The trace contained no accesses.
    ///
    /// An empty future is indistinguishable from a missing one, so the oracle
    /// refuses to start.
    EmptyTrace(String),

    /// A trace line was not a `0x`-prefixed hexadecimal block address.
    ///
    /// Carries the trace origin, the 1-based line number, and the offending text.
    MalformedTraceLine(String, usize, String),

    /// The shepherd partition does not leave room for a main-cache region.
    ///
    /// Requires `sc_assoc >= 1` and `sc_assoc + 1 <= assoc`.
    ShepherdAssociativity { assoc: usize, sc_assoc: usize },

    /// The block size is below four bytes or not a power of two.
    BlockSize(usize),

    /// The cache frames do not divide evenly into sets.
    ///
    /// `size` must be a multiple of `entry_size * assoc`.
    UnevenSets { size: usize, frame: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::BenchmarkFile(path, e) => {
                write!(f, "cannot read benchmark pointer file '{}': {}", path.display(), e)
            }
            ConfigError::TraceFile(path, e) => {
                write!(f, "cannot read access trace '{}': {}", path.display(), e)
            }
            ConfigError::EmptyTrace(origin) => {
                write!(f, "access trace '{}' contains no accesses", origin)
            }
            ConfigError::MalformedTraceLine(origin, line, text) => {
                write!(
                    f,
                    "access trace '{}' line {}: '{}' is not a 0x-prefixed hex block address",
                    origin, line, text
                )
            }
            ConfigError::ShepherdAssociativity { assoc, sc_assoc } => {
                write!(
                    f,
                    "shepherd associativity {} too large for total associativity {}: \
                     the main cache needs at least one way",
                    sc_assoc, assoc
                )
            }
            ConfigError::BlockSize(size) => {
                write!(f, "block size {} must be at least 4 and a power of 2", size)
            }
            ConfigError::UnevenSets { size, frame } => {
                write!(
                    f,
                    "cache size {} does not divide evenly into sets of {} bytes",
                    size, frame
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::BenchmarkFile(_, e) | ConfigError::TraceFile(_, e) => Some(e),
            _ => None,
        }
    }
}
