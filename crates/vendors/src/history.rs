use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vendorperf_core::{SnapshotId, VendorId};

use crate::metrics::PerformanceMetrics;
use crate::vendor::Vendor;

/// Immutable point-in-time copy of a vendor's metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPerformance {
    pub id: SnapshotId,
    pub vendor: VendorId,
    pub date: DateTime<Utc>,
    #[serde(flatten)]
    pub metrics: PerformanceMetrics,
}

impl HistoricalPerformance {
    /// Copy the vendor's current metrics as of `date`.
    pub fn capture(vendor: &Vendor, date: DateTime<Utc>) -> Self {
        Self {
            id: SnapshotId::new(),
            vendor: vendor.id,
            date,
            metrics: vendor.performance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Metric;
    use crate::vendor::VendorDetails;

    #[test]
    fn capture_copies_current_metrics() {
        let mut vendor = Vendor::register(
            VendorId::new(),
            VendorDetails {
                name: "Acme".to_string(),
                contact_details: String::new(),
                address: String::new(),
                vendor_code: "A1".to_string(),
            },
        )
        .unwrap();
        vendor.performance.set(Metric::FulfillmentRate, 75.0);

        let now = Utc::now();
        let snap = HistoricalPerformance::capture(&vendor, now);

        assert_eq!(snap.vendor, vendor.id);
        assert_eq!(snap.date, now);
        assert_eq!(snap.metrics.fulfillment_rate, 75.0);

        // Later changes to the vendor do not leak into the snapshot.
        vendor.performance.set(Metric::FulfillmentRate, 10.0);
        assert_eq!(snap.metrics.fulfillment_rate, 75.0);
    }
}
