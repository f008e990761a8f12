use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use vendorperf_core::{PurchaseOrderId, VendorId};
use vendorperf_purchasing::PurchaseOrder;
use vendorperf_vendors::{HistoricalPerformance, Metric, Vendor, VendorDetails};

use super::{HistoryStore, OrderStore, StoreError, StoreResult, VendorStore};

#[derive(Debug, Default)]
struct Tables {
    vendors: HashMap<VendorId, Vendor>,
    orders: HashMap<PurchaseOrderId, PurchaseOrder>,
    history: Vec<HistoricalPerformance>,
}

impl Tables {
    fn ensure_vendor_code_free(&self, code: &str, owner: Option<VendorId>) -> StoreResult<()> {
        let taken = self
            .vendors
            .values()
            .any(|v| v.details.vendor_code == code && Some(v.id) != owner);
        if taken {
            return Err(StoreError::Conflict(format!(
                "vendor_code `{code}` already exists"
            )));
        }
        Ok(())
    }

    fn ensure_po_number_free(&self, po_number: &str, owner: PurchaseOrderId) -> StoreResult<()> {
        let taken = self
            .orders
            .values()
            .any(|o| o.po_number == po_number && o.id != owner);
        if taken {
            return Err(StoreError::Conflict(format!(
                "po_number `{po_number}` already exists"
            )));
        }
        Ok(())
    }

    fn ensure_vendor_exists(&self, id: VendorId) -> StoreResult<()> {
        if !self.vendors.contains_key(&id) {
            return Err(StoreError::MissingReference(format!("vendor {id}")));
        }
        Ok(())
    }
}

/// In-memory store for tests/dev.
///
/// A single lock guards all three tables so cascades and reference checks
/// see a consistent view.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots recorded for a vendor, in append order.
    ///
    /// Inspection helper; the history table has no read path in the API.
    pub fn snapshots(&self, vendor: VendorId) -> StoreResult<Vec<HistoricalPerformance>> {
        Ok(self
            .read()?
            .history
            .iter()
            .filter(|s| s.vendor == vendor)
            .cloned()
            .collect())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))
    }
}

#[async_trait]
impl VendorStore for InMemoryStore {
    async fn insert_vendor(&self, vendor: Vendor) -> StoreResult<Vendor> {
        let mut tables = self.write()?;
        tables.ensure_vendor_code_free(&vendor.details.vendor_code, None)?;
        tables.vendors.insert(vendor.id, vendor.clone());
        Ok(vendor)
    }

    async fn get_vendor(&self, id: VendorId) -> StoreResult<Option<Vendor>> {
        Ok(self.read()?.vendors.get(&id).cloned())
    }

    async fn list_vendors(&self) -> StoreResult<Vec<Vendor>> {
        let mut vendors: Vec<Vendor> = self.read()?.vendors.values().cloned().collect();
        vendors.sort_by_key(|v| *v.id.as_uuid());
        Ok(vendors)
    }

    async fn update_vendor_details(
        &self,
        id: VendorId,
        details: VendorDetails,
    ) -> StoreResult<Vendor> {
        let mut tables = self.write()?;
        if !tables.vendors.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        tables.ensure_vendor_code_free(&details.vendor_code, Some(id))?;
        let vendor = tables.vendors.get_mut(&id).ok_or(StoreError::NotFound)?;
        vendor.details = details;
        Ok(vendor.clone())
    }

    async fn delete_vendor(&self, id: VendorId) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.vendors.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        tables.orders.retain(|_, o| o.vendor != id);
        tables.history.retain(|s| s.vendor != id);
        Ok(())
    }

    async fn set_metric(&self, id: VendorId, metric: Metric, value: f64) -> StoreResult<()> {
        let mut tables = self.write()?;
        let vendor = tables.vendors.get_mut(&id).ok_or(StoreError::NotFound)?;
        vendor.performance.set(metric, value);
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, order: PurchaseOrder) -> StoreResult<PurchaseOrder> {
        let mut tables = self.write()?;
        tables.ensure_vendor_exists(order.vendor)?;
        tables.ensure_po_number_free(&order.po_number, order.id)?;
        if tables.orders.contains_key(&order.id) {
            return Err(StoreError::Conflict(format!("order {} already exists", order.id)));
        }
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn update_order(&self, order: PurchaseOrder) -> StoreResult<PurchaseOrder> {
        let mut tables = self.write()?;
        if !tables.orders.contains_key(&order.id) {
            return Err(StoreError::NotFound);
        }
        tables.ensure_vendor_exists(order.vendor)?;
        tables.ensure_po_number_free(&order.po_number, order.id)?;
        tables.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: PurchaseOrderId) -> StoreResult<Option<PurchaseOrder>> {
        Ok(self.read()?.orders.get(&id).cloned())
    }

    async fn list_orders(&self, vendor: Option<VendorId>) -> StoreResult<Vec<PurchaseOrder>> {
        let mut orders: Vec<PurchaseOrder> = self
            .read()?
            .orders
            .values()
            .filter(|o| vendor.is_none_or(|v| o.vendor == v))
            .cloned()
            .collect();
        orders.sort_by_key(|o| *o.id.as_uuid());
        Ok(orders)
    }

    async fn delete_order(&self, id: PurchaseOrderId) -> StoreResult<()> {
        match self.write()?.orders.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound),
        }
    }
}

#[async_trait]
impl HistoryStore for InMemoryStore {
    async fn append_snapshot(&self, snapshot: HistoricalPerformance) -> StoreResult<()> {
        let mut tables = self.write()?;
        tables.ensure_vendor_exists(snapshot.vendor)?;
        tables.history.push(snapshot);
        Ok(())
    }
}
