use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

use vendorperf_core::error::check_text;
use vendorperf_core::{DomainResult, PurchaseOrderId, VendorId};

pub const PO_NUMBER_MAX_CHARS: usize = 100;
pub const STATUS_MAX_CHARS: usize = 50;

/// The one status value with special meaning for vendor metrics.
pub const COMPLETED: &str = "completed";

/// Free-form order status.
///
/// Any non-empty string is accepted; only [`COMPLETED`] is interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderStatus(String);

impl OrderStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn completed() -> Self {
        Self::new(COMPLETED)
    }

    /// Exact, case-sensitive comparison against `"completed"`.
    pub fn is_completed(&self) -> bool {
        self.0 == COMPLETED
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client-supplied purchase order fields (`POST` / `PUT` body).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderDraft {
    pub po_number: String,
    pub vendor: VendorId,
    pub order_date: DateTime<Utc>,
    pub delivery_date: DateTime<Utc>,
    pub items: JsonValue,
    pub quantity: i64,
    pub status: OrderStatus,
    #[serde(default)]
    pub quality_rating: Option<f64>,
    pub issue_date: DateTime<Utc>,
    #[serde(default)]
    pub acknowledgment_date: Option<DateTime<Utc>>,
}

/// Partial update (`PATCH` body).
///
/// Nullable fields use `Option<Option<_>>`: absent leaves the value alone,
/// explicit `null` clears it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PurchaseOrderPatch {
    pub po_number: Option<String>,
    pub vendor: Option<VendorId>,
    pub order_date: Option<DateTime<Utc>>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub items: Option<JsonValue>,
    pub quantity: Option<i64>,
    pub status: Option<OrderStatus>,
    #[serde(default, deserialize_with = "present")]
    pub quality_rating: Option<Option<f64>>,
    pub issue_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "present")]
    pub acknowledgment_date: Option<Option<DateTime<Utc>>>,
}

fn present<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// A persisted purchase order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: PurchaseOrderId,
    pub po_number: String,
    pub vendor: VendorId,
    pub order_date: DateTime<Utc>,
    pub delivery_date: DateTime<Utc>,
    pub items: JsonValue,
    pub quantity: i64,
    pub status: OrderStatus,
    pub quality_rating: Option<f64>,
    pub issue_date: DateTime<Utc>,
    pub acknowledgment_date: Option<DateTime<Utc>>,
}

impl PurchaseOrderDraft {
    pub fn validate(&self) -> DomainResult<()> {
        check_text("po_number", &self.po_number, PO_NUMBER_MAX_CHARS)?;
        check_text("status", self.status.as_str(), STATUS_MAX_CHARS)?;
        Ok(())
    }
}

impl PurchaseOrder {
    /// Build a new order from a validated draft.
    pub fn place(id: PurchaseOrderId, draft: PurchaseOrderDraft) -> DomainResult<Self> {
        draft.validate()?;
        Ok(Self {
            id,
            po_number: draft.po_number,
            vendor: draft.vendor,
            order_date: draft.order_date,
            delivery_date: draft.delivery_date,
            items: draft.items,
            quantity: draft.quantity,
            status: draft.status,
            quality_rating: draft.quality_rating,
            issue_date: draft.issue_date,
            acknowledgment_date: draft.acknowledgment_date,
        })
    }

    /// Full replacement (`PUT`), keeping the identifier.
    pub fn replaced(&self, draft: PurchaseOrderDraft) -> DomainResult<Self> {
        Self::place(self.id, draft)
    }

    /// Partial update (`PATCH`), re-validated as a whole.
    pub fn patched(&self, patch: PurchaseOrderPatch) -> DomainResult<Self> {
        let draft = PurchaseOrderDraft {
            po_number: patch.po_number.unwrap_or_else(|| self.po_number.clone()),
            vendor: patch.vendor.unwrap_or(self.vendor),
            order_date: patch.order_date.unwrap_or(self.order_date),
            delivery_date: patch.delivery_date.unwrap_or(self.delivery_date),
            items: patch.items.unwrap_or_else(|| self.items.clone()),
            quantity: patch.quantity.unwrap_or(self.quantity),
            status: patch.status.unwrap_or_else(|| self.status.clone()),
            quality_rating: patch.quality_rating.unwrap_or(self.quality_rating),
            issue_date: patch.issue_date.unwrap_or(self.issue_date),
            acknowledgment_date: patch
                .acknowledgment_date
                .unwrap_or(self.acknowledgment_date),
        };
        Self::place(self.id, draft)
    }

    /// Record the vendor's acknowledgment at `at`, overwriting any earlier one.
    pub fn acknowledge(&mut self, at: DateTime<Utc>) {
        self.acknowledgment_date = Some(at);
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }
}
