//! Order mutation pipeline.
//!
//! Every purchase-order write goes through [`OrderMutationHandler`]:
//!
//! 1. the order is persisted (the order table is the source of truth);
//! 2. each registered [`OrderMutationHook`] runs against the persisted order.
//!
//! Vendor metric maintenance is one such hook ([`MetricsRecomputeHook`]). It
//! is not wired into the store, so it can be exercised on its own and
//! re-run through [`OrderMutationHandler::recompute`] when it fails after the
//! order was already saved.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use vendorperf_core::{DomainError, PurchaseOrderId, VendorId};
use vendorperf_performance::{compute, stale_metrics};
use vendorperf_purchasing::{PurchaseOrder, PurchaseOrderDraft, PurchaseOrderPatch};
use vendorperf_vendors::Metric;

use crate::store::{OrderStore, StoreError, StoreResult, VendorStore};

/// What kind of write produced an [`OrderSaved`] notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Created,
    Updated,
    Acknowledged,
    /// Hooks re-run for an already persisted order, without a write.
    Replayed,
}

/// Post-persist notice handed to hooks.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSaved {
    pub order: PurchaseOrder,
    pub kind: MutationKind,
}

/// Runs after an order has been persisted.
#[async_trait]
pub trait OrderMutationHook: Send + Sync {
    /// Stable name used in logs and errors.
    fn name(&self) -> &'static str;

    async fn after_save(&self, saved: &OrderSaved) -> StoreResult<()>;
}

#[derive(Debug, Error)]
pub enum MutationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The order was persisted but a hook failed afterwards.
    #[error("hook `{hook}` failed for order {order_id}: {source}")]
    Hook {
        hook: &'static str,
        order_id: PurchaseOrderId,
        #[source]
        source: StoreError,
    },
}

/// Persists purchase orders and runs post-mutation hooks.
pub struct OrderMutationHandler {
    orders: Arc<dyn OrderStore>,
    hooks: Vec<Arc<dyn OrderMutationHook>>,
}

impl OrderMutationHandler {
    pub fn new(orders: Arc<dyn OrderStore>) -> Self {
        Self {
            orders,
            hooks: Vec::new(),
        }
    }

    pub fn with_hook(mut self, hook: Arc<dyn OrderMutationHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    #[instrument(skip(self, draft), fields(vendor_id = %draft.vendor), err)]
    pub async fn create(&self, draft: PurchaseOrderDraft) -> Result<PurchaseOrder, MutationError> {
        let order = PurchaseOrder::place(PurchaseOrderId::new(), draft)?;
        let saved = self.orders.insert_order(order).await?;
        self.notify(saved, MutationKind::Created).await
    }

    /// Full replacement (`PUT`).
    #[instrument(skip(self, draft), fields(order_id = %id), err)]
    pub async fn replace(
        &self,
        id: PurchaseOrderId,
        draft: PurchaseOrderDraft,
    ) -> Result<PurchaseOrder, MutationError> {
        let next = self.load(id).await?.replaced(draft)?;
        let saved = self.orders.update_order(next).await?;
        self.notify(saved, MutationKind::Updated).await
    }

    /// Partial update (`PATCH`).
    #[instrument(skip(self, patch), fields(order_id = %id), err)]
    pub async fn patch(
        &self,
        id: PurchaseOrderId,
        patch: PurchaseOrderPatch,
    ) -> Result<PurchaseOrder, MutationError> {
        let next = self.load(id).await?.patched(patch)?;
        let saved = self.orders.update_order(next).await?;
        self.notify(saved, MutationKind::Updated).await
    }

    /// Record the vendor's acknowledgment at `at` and save.
    #[instrument(skip(self), fields(order_id = %id), err)]
    pub async fn acknowledge(
        &self,
        id: PurchaseOrderId,
        at: DateTime<Utc>,
    ) -> Result<PurchaseOrder, MutationError> {
        let mut order = self.load(id).await?;
        order.acknowledge(at);
        let saved = self.orders.update_order(order).await?;
        self.notify(saved, MutationKind::Acknowledged).await
    }

    /// Re-run every hook for the stored order without writing it.
    #[instrument(skip(self), fields(order_id = %id), err)]
    pub async fn recompute(&self, id: PurchaseOrderId) -> Result<PurchaseOrder, MutationError> {
        let order = self.load(id).await?;
        self.notify(order, MutationKind::Replayed).await
    }

    async fn load(&self, id: PurchaseOrderId) -> Result<PurchaseOrder, MutationError> {
        self.orders
            .get_order(id)
            .await?
            .ok_or(MutationError::Store(StoreError::NotFound))
    }

    async fn notify(
        &self,
        order: PurchaseOrder,
        kind: MutationKind,
    ) -> Result<PurchaseOrder, MutationError> {
        let saved = OrderSaved { order, kind };
        for hook in &self.hooks {
            if let Err(source) = hook.after_save(&saved).await {
                warn!(
                    hook = hook.name(),
                    order_id = %saved.order.id,
                    kind = ?saved.kind,
                    error = %source,
                    "post-mutation hook failed; order remains persisted"
                );
                return Err(MutationError::Hook {
                    hook: hook.name(),
                    order_id: saved.order.id,
                    source,
                });
            }
        }
        Ok(saved.order)
    }
}

/// Keeps the vendor's cached metrics in line with its order history.
///
/// For each metric made stale by the saved order, re-reads the vendor's full
/// order set, recomputes that metric and writes it straight back. Metrics are
/// written one at a time; concurrent saves for the same vendor are not
/// serialized and the last write wins.
pub struct MetricsRecomputeHook {
    orders: Arc<dyn OrderStore>,
    vendors: Arc<dyn VendorStore>,
}

impl MetricsRecomputeHook {
    pub fn new(orders: Arc<dyn OrderStore>, vendors: Arc<dyn VendorStore>) -> Self {
        Self { orders, vendors }
    }

    /// Recompute a single metric for `vendor` and persist it.
    #[instrument(skip(self), fields(vendor_id = %vendor, metric = %metric), err)]
    pub async fn recompute_metric(&self, vendor: VendorId, metric: Metric) -> StoreResult<f64> {
        let orders = self.orders.list_orders(Some(vendor)).await?;
        let value = compute(metric, &orders);
        self.vendors.set_metric(vendor, metric, value).await?;
        debug!(order_count = orders.len(), value, "metric recomputed");
        Ok(value)
    }
}

#[async_trait]
impl OrderMutationHook for MetricsRecomputeHook {
    fn name(&self) -> &'static str {
        "vendor_metrics"
    }

    async fn after_save(&self, saved: &OrderSaved) -> StoreResult<()> {
        debug!(
            order_id = %saved.order.id,
            vendor_id = %saved.order.vendor,
            kind = ?saved.kind,
            "recomputing stale vendor metrics"
        );
        for metric in stale_metrics(&saved.order) {
            self.recompute_metric(saved.order.vendor, metric).await?;
        }
        Ok(())
    }
}
