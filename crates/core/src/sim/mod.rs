//! Simulation front end.
//!
//! Hosts the replay driver that feeds a loaded access trace through a cache
//! and stands in for the memory below it.

/// Trace replay driver.
pub mod driver;

pub use driver::Driver;
