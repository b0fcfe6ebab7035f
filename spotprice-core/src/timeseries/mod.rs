//! Time-series utilities shared by adapters and the facade.
//!
//! Modules include:
//! - `compress`: merge contiguous equal-price intervals into coarser runs
//! - `util`: ordering/overlap checks for adapter output
/// Run-length compression of fine-grained price intervals.
pub mod compress;
/// Shared helpers for series invariants.
pub mod util;
