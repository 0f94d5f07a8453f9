//! Unit tests for the non-coherent cache wrapper and replay driver.
