//! Postgres-backed store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (foreign key violation) | `23503` | `MissingReference` |
//! | Database (other) | Any other | `Storage` |
//! | Anything else (pool closed, network, decode) | N/A | `Storage` |
//!
//! Rows are mapped by hand from `PgRow` so the crate does not need sqlx's
//! derive macros.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{instrument, Span};

use vendorperf_core::{PurchaseOrderId, VendorId};
use vendorperf_purchasing::{OrderStatus, PurchaseOrder};
use vendorperf_vendors::{
    HistoricalPerformance, Metric, PerformanceMetrics, Vendor, VendorDetails,
};

use super::{HistoryStore, OrderStore, StoreError, StoreResult, VendorStore};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS vendors (
        id UUID PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        contact_details TEXT NOT NULL DEFAULT '',
        address TEXT NOT NULL DEFAULT '',
        vendor_code VARCHAR(50) NOT NULL UNIQUE,
        on_time_delivery_rate DOUBLE PRECISION NOT NULL DEFAULT 0,
        quality_rating_avg DOUBLE PRECISION NOT NULL DEFAULT 0,
        average_response_time DOUBLE PRECISION NOT NULL DEFAULT 0,
        fulfillment_rate DOUBLE PRECISION NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS purchase_orders (
        id UUID PRIMARY KEY,
        po_number VARCHAR(100) NOT NULL UNIQUE,
        vendor_id UUID NOT NULL REFERENCES vendors(id) ON DELETE CASCADE,
        order_date TIMESTAMPTZ NOT NULL,
        delivery_date TIMESTAMPTZ NOT NULL,
        items JSONB NOT NULL,
        quantity BIGINT NOT NULL,
        status VARCHAR(50) NOT NULL,
        quality_rating DOUBLE PRECISION NULL,
        issue_date TIMESTAMPTZ NOT NULL,
        acknowledgment_date TIMESTAMPTZ NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS purchase_orders_vendor_idx ON purchase_orders (vendor_id)",
    r#"
    CREATE TABLE IF NOT EXISTS historical_performances (
        id UUID PRIMARY KEY,
        vendor_id UUID NOT NULL REFERENCES vendors(id) ON DELETE CASCADE,
        date TIMESTAMPTZ NOT NULL,
        on_time_delivery_rate DOUBLE PRECISION NOT NULL,
        quality_rating_avg DOUBLE PRECISION NOT NULL,
        average_response_time DOUBLE PRECISION NOT NULL,
        fulfillment_rate DOUBLE PRECISION NOT NULL
    )
    "#,
];

const VENDOR_COLUMNS: &str = "id, name, contact_details, address, vendor_code, \
     on_time_delivery_rate, quality_rating_avg, average_response_time, fulfillment_rate";

const ORDER_COLUMNS: &str = "id, po_number, vendor_id, order_date, delivery_date, items, \
     quantity, status, quality_rating, issue_date, acknowledgment_date";

/// Postgres-backed vendor/order/history store.
///
/// Uses the SQLx connection pool, which is `Send + Sync`; cloning the store
/// shares the pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and build a store from a database URL.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create tables and indexes if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl VendorStore for PostgresStore {
    #[instrument(skip(self, vendor), fields(vendor_id = %vendor.id), err)]
    async fn insert_vendor(&self, vendor: Vendor) -> StoreResult<Vendor> {
        sqlx::query(
            r#"
            INSERT INTO vendors (
                id, name, contact_details, address, vendor_code,
                on_time_delivery_rate, quality_rating_avg, average_response_time, fulfillment_rate
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(vendor.id.as_uuid())
        .bind(&vendor.details.name)
        .bind(&vendor.details.contact_details)
        .bind(&vendor.details.address)
        .bind(&vendor.details.vendor_code)
        .bind(vendor.performance.on_time_delivery_rate)
        .bind(vendor.performance.quality_rating_avg)
        .bind(vendor.performance.average_response_time)
        .bind(vendor.performance.fulfillment_rate)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_vendor", e))?;

        Ok(vendor)
    }

    #[instrument(skip(self), fields(vendor_id = %id), err)]
    async fn get_vendor(&self, id: VendorId) -> StoreResult<Option<Vendor>> {
        let row = sqlx::query(&format!("SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_vendor", e))?;

        row.map(|r| vendor_from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error("get_vendor", e))
    }

    #[instrument(skip(self), fields(vendor_count = tracing::field::Empty), err)]
    async fn list_vendors(&self) -> StoreResult<Vec<Vendor>> {
        let rows = sqlx::query(&format!("SELECT {VENDOR_COLUMNS} FROM vendors ORDER BY id ASC"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_vendors", e))?;

        Span::current().record("vendor_count", rows.len());
        rows.iter()
            .map(vendor_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list_vendors", e))
    }

    #[instrument(skip(self, details), fields(vendor_id = %id), err)]
    async fn update_vendor_details(
        &self,
        id: VendorId,
        details: VendorDetails,
    ) -> StoreResult<Vendor> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE vendors
            SET name = $2, contact_details = $3, address = $4, vendor_code = $5
            WHERE id = $1
            RETURNING {VENDOR_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(&details.name)
        .bind(&details.contact_details)
        .bind(&details.address)
        .bind(&details.vendor_code)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_vendor_details", e))?
        .ok_or(StoreError::NotFound)?;

        vendor_from_row(&row).map_err(|e| map_sqlx_error("update_vendor_details", e))
    }

    #[instrument(skip(self), fields(vendor_id = %id), err)]
    async fn delete_vendor(&self, id: VendorId) -> StoreResult<()> {
        // Orders and snapshots go with it via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM vendors WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_vendor", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(vendor_id = %id, metric = %metric), err)]
    async fn set_metric(&self, id: VendorId, metric: Metric, value: f64) -> StoreResult<()> {
        // Column names come from a closed enum, never from input.
        let sql = format!("UPDATE vendors SET {} = $2 WHERE id = $1", metric.field_name());
        let result = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(value)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("set_metric", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    #[instrument(skip(self, order), fields(order_id = %order.id, vendor_id = %order.vendor), err)]
    async fn insert_order(&self, order: PurchaseOrder) -> StoreResult<PurchaseOrder> {
        sqlx::query(
            r#"
            INSERT INTO purchase_orders (
                id, po_number, vendor_id, order_date, delivery_date, items,
                quantity, status, quality_rating, issue_date, acknowledgment_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(&order.po_number)
        .bind(order.vendor.as_uuid())
        .bind(order.order_date)
        .bind(order.delivery_date)
        .bind(&order.items)
        .bind(order.quantity)
        .bind(order.status.as_str())
        .bind(order.quality_rating)
        .bind(order.issue_date)
        .bind(order.acknowledgment_date)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;

        Ok(order)
    }

    #[instrument(skip(self, order), fields(order_id = %order.id, vendor_id = %order.vendor), err)]
    async fn update_order(&self, order: PurchaseOrder) -> StoreResult<PurchaseOrder> {
        let result = sqlx::query(
            r#"
            UPDATE purchase_orders
            SET po_number = $2,
                vendor_id = $3,
                order_date = $4,
                delivery_date = $5,
                items = $6,
                quantity = $7,
                status = $8,
                quality_rating = $9,
                issue_date = $10,
                acknowledgment_date = $11
            WHERE id = $1
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(&order.po_number)
        .bind(order.vendor.as_uuid())
        .bind(order.order_date)
        .bind(order.delivery_date)
        .bind(&order.items)
        .bind(order.quantity)
        .bind(order.status.as_str())
        .bind(order.quality_rating)
        .bind(order.issue_date)
        .bind(order.acknowledgment_date)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_order", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(order)
    }

    #[instrument(skip(self), fields(order_id = %id), err)]
    async fn get_order(&self, id: PurchaseOrderId) -> StoreResult<Option<PurchaseOrder>> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM purchase_orders WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_order", e))?;

        row.map(|r| order_from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error("get_order", e))
    }

    #[instrument(skip(self), err)]
    async fn list_orders(&self, vendor: Option<VendorId>) -> StoreResult<Vec<PurchaseOrder>> {
        let vendor_param: Option<uuid::Uuid> = vendor.map(|v| *v.as_uuid());

        let rows = sqlx::query(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM purchase_orders
            WHERE ($1::uuid IS NULL OR vendor_id = $1)
            ORDER BY id ASC
            "#
        ))
        .bind(vendor_param)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_orders", e))?;

        rows.iter()
            .map(order_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| map_sqlx_error("list_orders", e))
    }

    #[instrument(skip(self), fields(order_id = %id), err)]
    async fn delete_order(&self, id: PurchaseOrderId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM purchase_orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_order", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for PostgresStore {
    #[instrument(skip(self, snapshot), fields(vendor_id = %snapshot.vendor), err)]
    async fn append_snapshot(&self, snapshot: HistoricalPerformance) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO historical_performances (
                id, vendor_id, date,
                on_time_delivery_rate, quality_rating_avg, average_response_time, fulfillment_rate
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(snapshot.id.as_uuid())
        .bind(snapshot.vendor.as_uuid())
        .bind(snapshot.date)
        .bind(snapshot.metrics.on_time_delivery_rate)
        .bind(snapshot.metrics.quality_rating_avg)
        .bind(snapshot.metrics.average_response_time)
        .bind(snapshot.metrics.fulfillment_rate)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("append_snapshot", e))?;

        Ok(())
    }
}

fn vendor_from_row(row: &PgRow) -> Result<Vendor, sqlx::Error> {
    Ok(Vendor {
        id: VendorId::from_uuid(row.try_get("id")?),
        details: VendorDetails {
            name: row.try_get("name")?,
            contact_details: row.try_get("contact_details")?,
            address: row.try_get("address")?,
            vendor_code: row.try_get("vendor_code")?,
        },
        performance: PerformanceMetrics {
            on_time_delivery_rate: row.try_get("on_time_delivery_rate")?,
            quality_rating_avg: row.try_get("quality_rating_avg")?,
            average_response_time: row.try_get("average_response_time")?,
            fulfillment_rate: row.try_get("fulfillment_rate")?,
        },
    })
}

fn order_from_row(row: &PgRow) -> Result<PurchaseOrder, sqlx::Error> {
    Ok(PurchaseOrder {
        id: PurchaseOrderId::from_uuid(row.try_get("id")?),
        po_number: row.try_get("po_number")?,
        vendor: VendorId::from_uuid(row.try_get("vendor_id")?),
        order_date: row.try_get("order_date")?,
        delivery_date: row.try_get("delivery_date")?,
        items: row.try_get("items")?,
        quantity: row.try_get("quantity")?,
        status: OrderStatus::new(row.try_get::<String, _>("status")?),
        quality_rating: row.try_get("quality_rating")?,
        issue_date: row.try_get("issue_date")?,
        acknowledgment_date: row.try_get("acknowledgment_date")?,
    })
}

/// Map SQLx errors to `StoreError`, tagging the message with the operation.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                Some("23503") => StoreError::MissingReference(msg),
                _ => StoreError::Storage(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Storage(format!("connection pool closed in {operation}"))
        }
        _ => StoreError::Storage(format!("sqlx error in {operation}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_closed_maps_to_storage_error() {
        let err = map_sqlx_error("list_orders", sqlx::Error::PoolClosed);
        assert_eq!(
            err,
            StoreError::Storage("connection pool closed in list_orders".to_string())
        );
    }

    #[test]
    fn row_not_found_maps_to_storage_error() {
        let err = map_sqlx_error("get_vendor", sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Storage(msg) if msg.contains("get_vendor")));
    }

    #[test]
    fn schema_declares_cascading_foreign_keys() {
        let cascades = SCHEMA
            .iter()
            .filter(|s| s.contains("REFERENCES vendors(id) ON DELETE CASCADE"))
            .count();
        assert_eq!(cascades, 2);
    }
}
