use serde::{Deserialize, Serialize};

use vendorperf_core::error::check_text;
use vendorperf_core::{DomainResult, VendorId};

use crate::metrics::PerformanceMetrics;

pub const NAME_MAX_CHARS: usize = 100;
pub const VENDOR_CODE_MAX_CHARS: usize = 50;

/// Client-editable vendor fields.
///
/// Metric fields are not part of this type; clients that send them have them
/// dropped on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorDetails {
    pub name: String,
    #[serde(default)]
    pub contact_details: String,
    #[serde(default)]
    pub address: String,
    pub vendor_code: String,
}

impl VendorDetails {
    pub fn validate(&self) -> DomainResult<()> {
        check_text("name", &self.name, NAME_MAX_CHARS)?;
        check_text("vendor_code", &self.vendor_code, VENDOR_CODE_MAX_CHARS)?;
        Ok(())
    }

    /// Merge a partial update, then re-validate the result.
    pub fn patched(&self, patch: VendorPatch) -> DomainResult<Self> {
        let next = Self {
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            contact_details: patch
                .contact_details
                .unwrap_or_else(|| self.contact_details.clone()),
            address: patch.address.unwrap_or_else(|| self.address.clone()),
            vendor_code: patch.vendor_code.unwrap_or_else(|| self.vendor_code.clone()),
        };
        next.validate()?;
        Ok(next)
    }
}

/// Partial update of [`VendorDetails`] (`PATCH`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VendorPatch {
    pub name: Option<String>,
    pub contact_details: Option<String>,
    pub address: Option<String>,
    pub vendor_code: Option<String>,
}

/// A vendor and its last-computed performance metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: VendorId,
    #[serde(flatten)]
    pub details: VendorDetails,
    #[serde(flatten)]
    pub performance: PerformanceMetrics,
}

impl Vendor {
    /// Register a new vendor with all metrics at zero.
    pub fn register(id: VendorId, details: VendorDetails) -> DomainResult<Self> {
        details.validate()?;
        Ok(Self {
            id,
            details,
            performance: PerformanceMetrics::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vendorperf_core::DomainError;

    fn details() -> VendorDetails {
        VendorDetails {
            name: "Acme Supplies".to_string(),
            contact_details: "ops@acme.test".to_string(),
            address: "1 Dock Road".to_string(),
            vendor_code: "ACME-01".to_string(),
        }
    }

    #[test]
    fn register_starts_with_zeroed_metrics() {
        let v = Vendor::register(VendorId::new(), details()).unwrap();
        assert_eq!(v.performance, PerformanceMetrics::default());
    }

    #[test]
    fn register_rejects_blank_vendor_code() {
        let mut d = details();
        d.vendor_code = " ".to_string();
        let err = Vendor::register(VendorId::new(), d).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn register_rejects_overlong_name() {
        let mut d = details();
        d.name = "x".repeat(NAME_MAX_CHARS + 1);
        assert!(Vendor::register(VendorId::new(), d).is_err());
    }

    #[test]
    fn patched_keeps_unspecified_fields() {
        let d = details();
        let next = d
            .patched(VendorPatch {
                address: Some("2 Quay Street".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(next.address, "2 Quay Street");
        assert_eq!(next.name, d.name);
        assert_eq!(next.vendor_code, d.vendor_code);
    }

    #[test]
    fn metric_fields_in_request_bodies_are_ignored() {
        let body = serde_json::json!({
            "name": "Acme",
            "vendor_code": "A1",
            "on_time_delivery_rate": 99.0
        });
        let d: VendorDetails = serde_json::from_value(body).unwrap();
        let v = Vendor::register(VendorId::new(), d).unwrap();
        assert_eq!(v.performance.on_time_delivery_rate, 0.0);
    }

    #[test]
    fn vendor_json_is_flat() {
        let v = Vendor::register(VendorId::new(), details()).unwrap();
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["vendor_code"], "ACME-01");
        assert_eq!(json["fulfillment_rate"], 0.0);
    }
}
