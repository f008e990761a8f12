//! `vendorperf-core`: shared domain building blocks.
//!
//! Identifiers and the domain error model. Nothing in here touches storage
//! or HTTP.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{PurchaseOrderId, SnapshotId, VendorId};
