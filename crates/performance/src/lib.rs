//! Performance tracking over settled picks.
//!
//! Every figure here is recomputed from the settlement set on demand. Nothing
//! is accumulated incrementally, so a backfilled or corrected settlement is
//! reflected the next time a report is built.

pub mod metrics;
pub mod significance;
pub mod tracker;

pub use metrics::PerformanceSummary;
pub use significance::wilson_ci;
pub use tracker::{PerformanceReport, PerformanceTracker};
