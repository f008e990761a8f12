//! The four vendor metrics.
//!
//! Every function takes the vendor's full order set and recomputes from
//! scratch. An empty subset (no completed orders, no acknowledged orders, no
//! orders at all) yields `0.0`, the same value a freshly registered vendor
//! carries.

use vendorperf_purchasing::PurchaseOrder;
use vendorperf_vendors::{Metric, PerformanceMetrics};

const SECONDS_PER_HOUR: f64 = 3600.0;

fn percentage(hits: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    hits as f64 / total as f64 * 100.0
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}

/// Share of completed orders with `delivery_date <= issue_date`, in percent.
pub fn on_time_delivery_rate(orders: &[PurchaseOrder]) -> f64 {
    let completed = orders.iter().filter(|o| o.is_completed());
    let (on_time, total) = completed.fold((0, 0), |(on_time, total), o| {
        let hit = usize::from(o.delivery_date <= o.issue_date);
        (on_time + hit, total + 1)
    });
    percentage(on_time, total)
}

/// Mean quality rating over completed orders that have one.
pub fn quality_rating_avg(orders: &[PurchaseOrder]) -> f64 {
    mean(
        orders
            .iter()
            .filter(|o| o.is_completed())
            .filter_map(|o| o.quality_rating),
    )
}

/// Mean of `acknowledgment_date - issue_date` over acknowledged orders, in hours.
///
/// Acknowledgments recorded before the issue date contribute negative
/// durations.
pub fn average_response_time(orders: &[PurchaseOrder]) -> f64 {
    let hours = orders.iter().filter_map(|o| {
        let ack = o.acknowledgment_date?;
        let elapsed = ack - o.issue_date;
        let seconds = match elapsed.num_microseconds() {
            Some(us) => us as f64 / 1_000_000.0,
            None => elapsed.num_milliseconds() as f64 / 1000.0,
        };
        Some(seconds / SECONDS_PER_HOUR)
    });
    mean(hours)
}

/// Share of all orders that are completed with `quality_rating >= 0`, in percent.
///
/// An order without a rating fails the comparison and does not count, even
/// when completed.
pub fn fulfillment_rate(orders: &[PurchaseOrder]) -> f64 {
    let fulfilled = orders
        .iter()
        .filter(|o| o.is_completed() && o.quality_rating.is_some_and(|q| q >= 0.0))
        .count();
    percentage(fulfilled, orders.len())
}

/// Compute a single metric.
pub fn compute(metric: Metric, orders: &[PurchaseOrder]) -> f64 {
    match metric {
        Metric::OnTimeDeliveryRate => on_time_delivery_rate(orders),
        Metric::QualityRatingAvg => quality_rating_avg(orders),
        Metric::AverageResponseTime => average_response_time(orders),
        Metric::FulfillmentRate => fulfillment_rate(orders),
    }
}

/// Compute all four metrics over the caller's order set.
pub fn compute_all(orders: &[PurchaseOrder]) -> PerformanceMetrics {
    PerformanceMetrics {
        on_time_delivery_rate: on_time_delivery_rate(orders),
        quality_rating_avg: quality_rating_avg(orders),
        average_response_time: average_response_time(orders),
        fulfillment_rate: fulfillment_rate(orders),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use vendorperf_core::{PurchaseOrderId, VendorId};
    use vendorperf_purchasing::OrderStatus;

    fn issued() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn order(status: &str) -> PurchaseOrder {
        PurchaseOrder {
            id: PurchaseOrderId::new(),
            po_number: format!("PO-{}", PurchaseOrderId::new()),
            vendor: VendorId::new(),
            order_date: issued(),
            delivery_date: issued() + Duration::days(1),
            items: serde_json::json!([]),
            quantity: 1,
            status: OrderStatus::new(status),
            quality_rating: None,
            issue_date: issued(),
            acknowledgment_date: None,
        }
    }

    fn rated(status: &str, rating: f64) -> PurchaseOrder {
        PurchaseOrder {
            quality_rating: Some(rating),
            ..order(status)
        }
    }

    #[test]
    fn empty_subsets_yield_zero() {
        let orders = vec![order("pending"), order("shipped")];
        assert_eq!(on_time_delivery_rate(&orders), 0.0);
        assert_eq!(quality_rating_avg(&orders), 0.0);
        assert_eq!(average_response_time(&orders), 0.0);
        assert_eq!(compute_all(&[]), PerformanceMetrics::default());
    }

    #[test]
    fn on_time_rate_counts_completed_orders_only() {
        let on_time = PurchaseOrder {
            delivery_date: issued() - Duration::hours(1),
            ..order("completed")
        };
        let late = PurchaseOrder {
            delivery_date: issued() + Duration::hours(1),
            ..order("completed")
        };
        let pending = PurchaseOrder {
            delivery_date: issued() - Duration::days(2),
            ..order("pending")
        };

        assert_eq!(on_time_delivery_rate(&[on_time, late, pending]), 50.0);
    }

    #[test]
    fn delivery_on_the_issue_instant_is_on_time() {
        let exact = PurchaseOrder {
            delivery_date: issued(),
            ..order("completed")
        };
        assert_eq!(on_time_delivery_rate(&[exact]), 100.0);
    }

    #[test]
    fn quality_average_skips_unrated_and_open_orders() {
        let orders = vec![
            rated("completed", 4.0),
            rated("completed", 5.0),
            order("completed"),
            rated("pending", 1.0),
        ];
        assert_eq!(quality_rating_avg(&orders), 4.5);
    }

    #[test]
    fn response_time_is_mean_hours_over_acknowledged_orders() {
        let two = PurchaseOrder {
            acknowledgment_date: Some(issued() + Duration::hours(2)),
            ..order("pending")
        };
        let four = PurchaseOrder {
            acknowledgment_date: Some(issued() + Duration::hours(4)),
            ..order("completed")
        };
        let unacked = order("pending");

        assert_eq!(average_response_time(&[two, four, unacked]), 3.0);
    }

    #[test]
    fn response_time_keeps_sub_hour_precision() {
        let o = PurchaseOrder {
            acknowledgment_date: Some(issued() + Duration::minutes(90)),
            ..order("pending")
        };
        assert_eq!(average_response_time(&[o]), 1.5);
    }

    #[test]
    fn response_time_keeps_microseconds() {
        let o = PurchaseOrder {
            acknowledgment_date: Some(
                issued() + Duration::hours(1) + Duration::microseconds(1_800),
            ),
            ..order("pending")
        };
        let expected = 3_600.0018 / SECONDS_PER_HOUR;
        assert!((average_response_time(&[o]) - expected).abs() < 1e-12);
    }

    #[test]
    fn fulfillment_excludes_null_rated_completed_orders() {
        let orders = vec![
            rated("completed", 4.0),
            rated("completed", 0.0),
            order("completed"),
            order("pending"),
        ];
        assert_eq!(fulfillment_rate(&orders), 50.0);
    }

    #[test]
    fn fulfillment_single_qualifying_order_of_four() {
        let orders = vec![
            rated("completed", 3.0),
            rated("completed", -1.0),
            order("completed"),
            order("pending"),
        ];
        assert_eq!(fulfillment_rate(&orders), 25.0);
    }

    #[test]
    fn compute_dispatches_to_each_metric() {
        let orders = vec![rated("completed", 2.0), order("pending")];
        let all = compute_all(&orders);
        for metric in Metric::ALL {
            assert_eq!(compute(metric, &orders), all.get(metric));
        }
    }

    fn arb_order() -> impl Strategy<Value = PurchaseOrder> {
        (
            prop::sample::select(vec!["completed", "pending", "cancelled"]),
            prop::option::of(-5.0f64..10.0),
            -240i64..240,
            prop::option::of(-240i64..240),
        )
            .prop_map(|(status, rating, delivery_offset, ack_offset)| PurchaseOrder {
                quality_rating: rating,
                delivery_date: issued() + Duration::hours(delivery_offset),
                acknowledgment_date: ack_offset.map(|h| issued() + Duration::hours(h)),
                ..order(status)
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Both rates are percentages for any order set.
        #[test]
        fn rates_stay_within_percentage_bounds(
            orders in prop::collection::vec(arb_order(), 0..40)
        ) {
            let m = compute_all(&orders);
            prop_assert!((0.0..=100.0).contains(&m.on_time_delivery_rate));
            prop_assert!((0.0..=100.0).contains(&m.fulfillment_rate));
        }

        /// Fulfilled orders are a subset of completed orders.
        #[test]
        fn fulfillment_never_exceeds_completed_share(
            orders in prop::collection::vec(arb_order(), 1..40)
        ) {
            let completed = orders.iter().filter(|o| o.is_completed()).count();
            let share = completed as f64 / orders.len() as f64 * 100.0;
            prop_assert!(fulfillment_rate(&orders) <= share + 1e-9);
        }

        #[test]
        fn single_metric_matches_compute_all(
            orders in prop::collection::vec(arb_order(), 0..40)
        ) {
            let all = compute_all(&orders);
            for metric in Metric::ALL {
                prop_assert_eq!(compute(metric, &orders), all.get(metric));
            }
        }
    }
}
