//! Trace Loader Unit Tests.
//!
//! Verifies the two-file load path (benchmark pointer, then the trace), the
//! index built from it, and the fatal configuration errors for missing,
//! empty, and malformed inputs. File-backed cases use temporary directories.

use std::fs;
use std::io::Cursor;

use tempfile::tempdir;

use shepsim_core::common::ConfigError;
use shepsim_core::mem::cache::trace::AccessTrace;

// ══════════════════════════════════════════════════════════
// 1. Index Construction
// ══════════════════════════════════════════════════════════

/// Each address maps to the 0-based line indices at which it occurs.
#[test]
fn builds_the_access_index() {
    let text = "0x1000\n0x2000\n0x1000\n0x3000\n0x1000\n";
    let trace = AccessTrace::from_reader(Cursor::new(text), "inline").unwrap();

    assert_eq!(trace.num_accesses(), 5);
    assert_eq!(trace.num_blocks(), 3);
    assert_eq!(trace.accesses(0x1000), Some(&[0u64, 2, 4][..]));
    assert_eq!(trace.accesses(0x2000), Some(&[1u64][..]));
    assert_eq!(trace.accesses(0x3000), Some(&[3u64][..]));
    assert_eq!(trace.accesses(0x4000), None);
    assert_eq!(trace.order(), &[0x1000, 0x2000, 0x1000, 0x3000, 0x1000]);
}

/// A trailing newline is optional and blank lines do not consume sequence
/// numbers.
#[test]
fn tolerates_missing_trailing_newline() {
    let trace = AccessTrace::from_reader(Cursor::new("0xa\n0xb"), "inline").unwrap();
    assert_eq!(trace.num_accesses(), 2);
    assert_eq!(trace.accesses(0xb), Some(&[1u64][..]));
}

// ══════════════════════════════════════════════════════════
// 2. Error Paths
// ══════════════════════════════════════════════════════════

/// An empty trace is fatal: an empty future is indistinguishable from a
/// missing one.
#[test]
fn empty_trace_is_fatal() {
    let result = AccessTrace::from_reader(Cursor::new(""), "inline");
    assert!(matches!(result, Err(ConfigError::EmptyTrace(_))));
}

/// Lines that are not 0x-prefixed hex are fatal, with the line number
/// reported.
#[test]
fn malformed_lines_are_fatal() {
    for bad in ["1000\n", "0x\n", "0xzz\n", "hello\n"] {
        let text = format!("0x1000\n{}", bad);
        let result = AccessTrace::from_reader(Cursor::new(text), "inline");
        match result {
            Err(ConfigError::MalformedTraceLine(origin, line, _)) => {
                assert_eq!(origin, "inline");
                assert_eq!(line, 2, "offender is line 2 for {:?}", bad);
            }
            other => panic!("expected a malformed-line error for {:?}, got {:?}", bad, other.err()),
        }
    }
}

// ══════════════════════════════════════════════════════════
// 3. Pointer-File Indirection
// ══════════════════════════════════════════════════════════

/// The benchmark pointer file names the trace; both reads happen at load.
#[test]
fn loads_through_the_pointer_file() {
    let dir = tempdir().unwrap();
    let trace_path = dir.path().join("qsort.trace");
    fs::write(&trace_path, "0x40\n0x80\n0x40\n").unwrap();

    let pointer = dir.path().join("current_benchmark.txt");
    fs::write(&pointer, format!("{}\n", trace_path.display())).unwrap();

    let trace = AccessTrace::load(&pointer).unwrap();
    assert_eq!(trace.num_accesses(), 3);
    assert_eq!(trace.accesses(0x40), Some(&[0u64, 2][..]));
}

/// A missing pointer file is fatal.
#[test]
fn missing_pointer_file_is_fatal() {
    let dir = tempdir().unwrap();
    let result = AccessTrace::load(dir.path().join("nope.txt"));
    assert!(matches!(result, Err(ConfigError::BenchmarkFile(_, _))));
}

/// A pointer to a missing trace is fatal.
#[test]
fn missing_trace_file_is_fatal() {
    let dir = tempdir().unwrap();
    let pointer = dir.path().join("current_benchmark.txt");
    fs::write(&pointer, dir.path().join("gone.trace").display().to_string()).unwrap();

    let result = AccessTrace::load(&pointer);
    assert!(matches!(result, Err(ConfigError::TraceFile(_, _))));
}
