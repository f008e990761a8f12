//! Which cached metrics a single order save invalidates.

use vendorperf_purchasing::PurchaseOrder;
use vendorperf_vendors::Metric;

/// Metrics to recompute after `order` has been persisted, in recompute order.
///
/// - completed orders refresh the on-time rate, and the quality average when
///   they carry a rating;
/// - acknowledged orders refresh the response time;
/// - the fulfillment rate is refreshed on every save.
pub fn stale_metrics(order: &PurchaseOrder) -> Vec<Metric> {
    let mut stale = Vec::with_capacity(Metric::ALL.len());

    if order.is_completed() {
        stale.push(Metric::OnTimeDeliveryRate);
        if order.quality_rating.is_some() {
            stale.push(Metric::QualityRatingAvg);
        }
    }

    if order.acknowledgment_date.is_some() {
        stale.push(Metric::AverageResponseTime);
    }

    stale.push(Metric::FulfillmentRate);
    stale
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vendorperf_core::{PurchaseOrderId, VendorId};
    use vendorperf_purchasing::OrderStatus;

    fn order(status: &str, rating: Option<f64>, acked: bool) -> PurchaseOrder {
        let now = Utc::now();
        PurchaseOrder {
            id: PurchaseOrderId::new(),
            po_number: "PO-1".to_string(),
            vendor: VendorId::new(),
            order_date: now,
            delivery_date: now,
            items: serde_json::json!([]),
            quantity: 1,
            status: OrderStatus::new(status),
            quality_rating: rating,
            issue_date: now,
            acknowledgment_date: acked.then_some(now),
        }
    }

    #[test]
    fn open_order_only_refreshes_fulfillment() {
        assert_eq!(
            stale_metrics(&order("pending", Some(5.0), false)),
            vec![Metric::FulfillmentRate]
        );
    }

    #[test]
    fn completed_unrated_order_skips_quality_average() {
        assert_eq!(
            stale_metrics(&order("completed", None, false)),
            vec![Metric::OnTimeDeliveryRate, Metric::FulfillmentRate]
        );
    }

    #[test]
    fn completed_rated_acknowledged_order_refreshes_everything() {
        assert_eq!(
            stale_metrics(&order("completed", Some(3.0), true)),
            vec![
                Metric::OnTimeDeliveryRate,
                Metric::QualityRatingAvg,
                Metric::AverageResponseTime,
                Metric::FulfillmentRate,
            ]
        );
    }

    #[test]
    fn acknowledged_open_order_leaves_completion_metrics_alone() {
        let stale = stale_metrics(&order("pending", Some(4.0), true));
        assert_eq!(
            stale,
            vec![Metric::AverageResponseTime, Metric::FulfillmentRate]
        );
        assert!(!stale.contains(&Metric::OnTimeDeliveryRate));
        assert!(!stale.contains(&Metric::QualityRatingAvg));
    }
}
