//! Access-order trace loading.
//!
//! This module reads the oracle's view of the future. It performs:
//! 1. **Benchmark probing:** Reads the single-line pointer file naming the
//!    trace of the current benchmark.
//! 2. **Trace loading:** Reads the trace itself, one `0x`-prefixed hex block
//!    address per line in chronological access order.
//! 3. **Index building:** Maps each block address to the ordered list of
//!    access sequence numbers at which it appears.
//!
//! Everything is loaded once at construction; there is no runtime reload and
//! no partial update.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use log::{debug, info};

use crate::common::{Addr, ConfigError};

/// An immutable access-order trace with a per-block index of the future.
#[derive(Clone, Debug)]
pub struct AccessTrace {
    /// Chronological list of block addresses, one entry per trace line.
    order: Vec<Addr>,
    /// Block address to the ordered access sequence numbers at which it occurs.
    index: HashMap<Addr, Vec<u64>>,
}

impl AccessTrace {
    /// Loads a trace through the benchmark pointer file.
    ///
    /// The pointer file holds a single line with the filesystem path of the
    /// trace; a trailing newline is optional. Missing files, empty traces,
    /// and malformed lines are fatal configuration errors.
    ///
    /// # Arguments
    ///
    /// * `benchmark_file` - Path of the pointer file, usually
    ///   `current_benchmark.txt` in the working directory.
    pub fn load<P: AsRef<Path>>(benchmark_file: P) -> Result<Self, ConfigError> {
        let benchmark_file = benchmark_file.as_ref();
        let mut pointer = String::new();
        File::open(benchmark_file)
            .and_then(|mut f| f.read_to_string(&mut pointer))
            .map_err(|e| ConfigError::BenchmarkFile(benchmark_file.to_path_buf(), e))?;

        let trace_path = pointer.lines().next().unwrap_or("").trim().to_string();
        info!("benchmark pointer {:?} -> trace {:?}", benchmark_file, trace_path);

        let trace_file = File::open(&trace_path)
            .map_err(|e| ConfigError::TraceFile(trace_path.clone().into(), e))?;
        Self::from_reader(BufReader::new(trace_file), &trace_path)
    }

    /// Builds a trace from any line-oriented reader.
    ///
    /// `origin` names the source in error messages. Blank lines are skipped
    /// and do not consume a sequence number; any other line must be a
    /// `0x`-prefixed hexadecimal block address.
    pub fn from_reader<R: BufRead>(reader: R, origin: &str) -> Result<Self, ConfigError> {
        let mut order = Vec::new();
        let mut index: HashMap<Addr, Vec<u64>> = HashMap::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| ConfigError::TraceFile(origin.into(), e))?;
            let text = line.trim();
            if text.is_empty() {
                continue;
            }
            let addr = parse_block_addr(text).ok_or_else(|| {
                ConfigError::MalformedTraceLine(origin.to_string(), line_no + 1, text.to_string())
            })?;
            index.entry(addr).or_default().push(order.len() as u64);
            order.push(addr);
        }

        if index.is_empty() {
            return Err(ConfigError::EmptyTrace(origin.to_string()));
        }

        debug!(
            "loaded trace {:?}: {} accesses over {} blocks",
            origin,
            order.len(),
            index.len()
        );
        Ok(Self { order, index })
    }

    /// The access sequence numbers at which `addr` occurs, in increasing order.
    ///
    /// Returns `None` for blocks the trace never references.
    pub fn accesses(&self, addr: Addr) -> Option<&[u64]> {
        self.index.get(&addr).map(Vec::as_slice)
    }

    /// Total number of accesses in the trace.
    pub fn num_accesses(&self) -> usize {
        self.order.len()
    }

    /// Number of distinct block addresses in the trace.
    pub fn num_blocks(&self) -> usize {
        self.index.len()
    }

    /// The chronological list of block addresses.
    pub fn order(&self) -> &[Addr] {
        &self.order
    }

    /// Iterates over `(block address, access sequence numbers)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Addr, &[u64])> + '_ {
        self.index.iter().map(|(a, v)| (*a, v.as_slice()))
    }
}

/// Parses a `0x`-prefixed hexadecimal block address.
fn parse_block_addr(text: &str) -> Option<Addr> {
    let hex = text.strip_prefix("0x")?;
    Addr::from_str_radix(hex, 16).ok()
}
