use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use vendorperf_core::{PurchaseOrderId, VendorId};
use vendorperf_purchasing::{PurchaseOrderDraft, PurchaseOrderPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route(
            "/:id",
            get(get_order)
                .put(replace_order)
                .patch(update_order)
                .delete(delete_order),
        )
        .route("/:id/acknowledge", post(acknowledge_order))
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    query: Result<Query<dto::ListOrdersQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };
    let vendor = match query.vendor.as_deref() {
        Some(raw) => match errors::parse_id::<VendorId>(raw) {
            Ok(id) => Some(id),
            Err(resp) => return resp,
        },
        None => None,
    };

    match services.orders.list_orders(vendor).await {
        Ok(items) => (StatusCode::OK, Json(json!({ "items": items }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<PurchaseOrderDraft>, JsonRejection>,
) -> axum::response::Response {
    let Json(draft) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.mutations.create(draft).await {
        Ok(order) => {
            tracing::info!(order_id = %order.id, vendor_id = %order.vendor, "purchase order created");
            (StatusCode::CREATED, Json(order)).into_response()
        }
        Err(e) => errors::mutation_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<PurchaseOrderId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.orders.get_order(id).await {
        Ok(Some(order)) => (StatusCode::OK, Json(order)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn replace_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<PurchaseOrderDraft>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_id::<PurchaseOrderId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(draft) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.mutations.replace(id, draft).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}

pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<PurchaseOrderPatch>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_id::<PurchaseOrderId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(patch) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.mutations.patch(id, patch).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}

/// Deleting an order leaves the vendor's cached metrics as they were.
pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<PurchaseOrderId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.orders.delete_order(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn acknowledge_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<PurchaseOrderId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.mutations.acknowledge(id, Utc::now()).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "status": "Purchase order acknowledged" })),
        )
            .into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}
