//! Vendor performance metrics engine.
//!
//! Pure functions over a vendor's purchase orders. No IO: callers load the
//! order set, call into this crate, and persist whatever comes back.

pub mod engine;
pub mod staleness;

pub use engine::{
    average_response_time, compute, compute_all, fulfillment_rate, on_time_delivery_rate,
    quality_rating_avg,
};
pub use staleness::stale_metrics;
