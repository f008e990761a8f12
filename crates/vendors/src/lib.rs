//! Vendors domain module.
//!
//! Vendor records, their cached performance metrics, and the append-only
//! performance snapshots taken from them. Pure data + validation, no IO.

pub mod history;
pub mod metrics;
pub mod vendor;

pub use history::HistoricalPerformance;
pub use metrics::{Metric, PerformanceMetrics};
pub use vendor::{Vendor, VendorDetails, VendorPatch};
