use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use vendorperf_core::VendorId;
use vendorperf_infra::store::StoreError;
use vendorperf_vendors::{HistoricalPerformance, Vendor, VendorDetails, VendorPatch};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_vendor).get(list_vendors))
        .route(
            "/:id",
            get(get_vendor)
                .put(replace_vendor)
                .patch(update_vendor)
                .delete(delete_vendor),
        )
        .route("/:id/performance", get(get_performance))
        .route("/:id/performance/snapshots", post(take_snapshot))
}

pub async fn list_vendors(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.vendors.list_vendors().await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<VendorDetails>, JsonRejection>,
) -> axum::response::Response {
    let Json(details) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let vendor = match Vendor::register(VendorId::new(), details) {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.vendors.insert_vendor(vendor).await {
        Ok(v) => {
            tracing::info!(vendor_id = %v.id, vendor_code = %v.details.vendor_code, "vendor registered");
            (StatusCode::CREATED, Json(v)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<VendorId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match load_vendor(&services, id).await {
        Ok(v) => (StatusCode::OK, Json(v)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn replace_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<VendorDetails>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_id::<VendorId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(details) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    if let Err(e) = details.validate() {
        return errors::domain_error_to_response(e);
    }

    match services.vendors.update_vendor_details(id, details).await {
        Ok(v) => (StatusCode::OK, Json(v)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Result<Json<VendorPatch>, JsonRejection>,
) -> axum::response::Response {
    let id = match errors::parse_id::<VendorId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let Json(patch) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    let current = match load_vendor(&services, id).await {
        Ok(v) => v,
        Err(e) => return errors::store_error_to_response(e),
    };
    let details = match current.details.patched(patch) {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.vendors.update_vendor_details(id, details).await {
        Ok(v) => (StatusCode::OK, Json(v)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_vendor(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<VendorId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.vendors.delete_vendor(id).await {
        Ok(()) => {
            tracing::info!(vendor_id = %id, "vendor deleted with its orders and snapshots");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// The four cached metrics, as last written by the recompute hook.
pub async fn get_performance(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match errors::parse_id::<VendorId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match load_vendor(&services, id).await {
        Ok(v) => (StatusCode::OK, Json(v.performance)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn take_snapshot(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    body: Bytes,
) -> axum::response::Response {
    let id = match errors::parse_id::<VendorId>(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    // An empty body means "now"; anything else must be a valid request.
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        dto::SnapshotRequest::default()
    } else {
        match serde_json::from_slice::<dto::SnapshotRequest>(&body) {
            Ok(req) => req,
            Err(e) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    format!("invalid snapshot request: {e}"),
                );
            }
        }
    };
    let date = request.date.unwrap_or_else(Utc::now);

    let vendor = match load_vendor(&services, id).await {
        Ok(v) => v,
        Err(e) => return errors::store_error_to_response(e),
    };

    let snapshot = HistoricalPerformance::capture(&vendor, date);
    match services.history.append_snapshot(snapshot.clone()).await {
        Ok(()) => (StatusCode::CREATED, Json(snapshot)).into_response(),
        Err(StoreError::MissingReference(_)) => {
            errors::store_error_to_response(StoreError::NotFound)
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn load_vendor(services: &AppServices, id: VendorId) -> Result<Vendor, StoreError> {
    services
        .vendors
        .get_vendor(id)
        .await?
        .ok_or(StoreError::NotFound)
}
