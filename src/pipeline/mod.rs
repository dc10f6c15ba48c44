//! Pipeline entry points for scan operations.
//!
//! - `calculate_diff`: Apply a snapshot to the seen-games table
//! - `run_scan`: Fetch, diff, persist and notify in one pass

pub mod diff;
pub mod scan;

pub use diff::{DiffCalculator, DiffPolicy, DiffResult, calculate_diff};
pub use scan::{RunState, Scan, ScanReport, run_scan};
