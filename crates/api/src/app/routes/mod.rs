use axum::{routing::post, Router};

pub mod purchase_orders;
pub mod system;
pub mod vendors;

/// Router for all resource endpoints.
///
/// Collection routes answer with and without the trailing slash.
pub fn router() -> Router {
    Router::new()
        .nest("/vendors", vendors::router())
        .route(
            "/vendors/",
            post(vendors::create_vendor).get(vendors::list_vendors),
        )
        .nest("/purchase-orders", purchase_orders::router())
        .route(
            "/purchase-orders/",
            post(purchase_orders::create_order).get(purchase_orders::list_orders),
        )
}
