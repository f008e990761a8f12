//! Storage abstractions for vendors, purchase orders and performance history.
//!
//! One trait per table. Backends: [`InMemoryStore`] for dev/tests and
//! [`PostgresStore`] for production. Both enforce the same uniqueness,
//! foreign-key and cascade rules so callers never have to special-case them.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use vendorperf_core::{PurchaseOrderId, VendorId};
use vendorperf_purchasing::PurchaseOrder;
use vendorperf_vendors::{HistoricalPerformance, Metric, Vendor, VendorDetails};

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage operation error.
///
/// Infrastructure-level failures; validation happens before anything reaches
/// a store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint (vendor code, PO number) was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A foreign key pointed at a record that does not exist.
    #[error("missing reference: {0}")]
    MissingReference(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Vendor table.
#[async_trait]
pub trait VendorStore: Send + Sync {
    async fn insert_vendor(&self, vendor: Vendor) -> StoreResult<Vendor>;

    async fn get_vendor(&self, id: VendorId) -> StoreResult<Option<Vendor>>;

    /// All vendors, oldest first.
    async fn list_vendors(&self) -> StoreResult<Vec<Vendor>>;

    /// Overwrite the client-editable fields. Metrics are left untouched.
    async fn update_vendor_details(
        &self,
        id: VendorId,
        details: VendorDetails,
    ) -> StoreResult<Vendor>;

    /// Delete a vendor together with its orders and snapshots.
    async fn delete_vendor(&self, id: VendorId) -> StoreResult<()>;

    /// Overwrite one cached metric column.
    async fn set_metric(&self, id: VendorId, metric: Metric, value: f64) -> StoreResult<()>;
}

/// Purchase order table.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: PurchaseOrder) -> StoreResult<PurchaseOrder>;

    /// Overwrite every field of an existing order.
    async fn update_order(&self, order: PurchaseOrder) -> StoreResult<PurchaseOrder>;

    async fn get_order(&self, id: PurchaseOrderId) -> StoreResult<Option<PurchaseOrder>>;

    /// Orders oldest first, optionally restricted to one vendor.
    async fn list_orders(&self, vendor: Option<VendorId>) -> StoreResult<Vec<PurchaseOrder>>;

    async fn delete_order(&self, id: PurchaseOrderId) -> StoreResult<()>;
}

/// Append-only performance history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append_snapshot(&self, snapshot: HistoricalPerformance) -> StoreResult<()>;
}
