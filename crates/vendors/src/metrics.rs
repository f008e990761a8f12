use serde::{Deserialize, Serialize};

/// One of the four cached performance metrics on a vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    OnTimeDeliveryRate,
    QualityRatingAvg,
    AverageResponseTime,
    FulfillmentRate,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::OnTimeDeliveryRate,
        Metric::QualityRatingAvg,
        Metric::AverageResponseTime,
        Metric::FulfillmentRate,
    ];

    /// Field/column name used in JSON bodies and the relational schema.
    pub fn field_name(self) -> &'static str {
        match self {
            Metric::OnTimeDeliveryRate => "on_time_delivery_rate",
            Metric::QualityRatingAvg => "quality_rating_avg",
            Metric::AverageResponseTime => "average_response_time",
            Metric::FulfillmentRate => "fulfillment_rate",
        }
    }
}

impl core::fmt::Display for Metric {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.field_name())
    }
}

/// The four denormalized metrics cached on a vendor.
///
/// Rates are percentages in `[0, 100]`, the quality average is on the rating
/// scale used by orders, and the response time is in hours. Everything starts
/// at zero and is only rewritten by the order mutation handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub on_time_delivery_rate: f64,
    pub quality_rating_avg: f64,
    pub average_response_time: f64,
    pub fulfillment_rate: f64,
}

impl PerformanceMetrics {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::OnTimeDeliveryRate => self.on_time_delivery_rate,
            Metric::QualityRatingAvg => self.quality_rating_avg,
            Metric::AverageResponseTime => self.average_response_time,
            Metric::FulfillmentRate => self.fulfillment_rate,
        }
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        let slot = match metric {
            Metric::OnTimeDeliveryRate => &mut self.on_time_delivery_rate,
            Metric::QualityRatingAvg => &mut self.quality_rating_avg,
            Metric::AverageResponseTime => &mut self.average_response_time,
            Metric::FulfillmentRate => &mut self.fulfillment_rate,
        };
        *slot = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_only_touches_the_named_metric() {
        let mut m = PerformanceMetrics::default();
        m.set(Metric::AverageResponseTime, 3.0);

        assert_eq!(m.get(Metric::AverageResponseTime), 3.0);
        for other in Metric::ALL.into_iter().filter(|x| *x != Metric::AverageResponseTime) {
            assert_eq!(m.get(other), 0.0);
        }
    }

    #[test]
    fn serializes_exactly_four_fields() {
        let json = serde_json::to_value(PerformanceMetrics::default()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        for metric in Metric::ALL {
            assert!(obj.contains_key(metric.field_name()));
        }
    }
}
