//! Decision logic of a scan.
//!
//! - `filter`: keyword/location admission (`FilterEngine`)
//! - `scan`: per-source orchestration, seen-set and notification policy (`Scanner`)

pub mod filter;
pub mod scan;

pub use filter::{FilterEngine, FilterVerdict};
pub use scan::{RunStats, ScanPolicy, ScanReport, Scanner};
