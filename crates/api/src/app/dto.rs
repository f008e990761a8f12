use chrono::{DateTime, Utc};
use serde::Deserialize;

/// `GET /purchase-orders?vendor=<uuid>`
#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub vendor: Option<String>,
}

/// Optional body of `POST /vendors/:id/performance/snapshots`.
#[derive(Debug, Default, Deserialize)]
pub struct SnapshotRequest {
    /// Defaults to the time of the request.
    pub date: Option<DateTime<Utc>>,
}
