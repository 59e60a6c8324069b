//! Edge certificate planning.

use crate::error::{PlanError, PlanResult};
use crate::resolve::DomainSpec;
use serde::Serialize;
use std::collections::BTreeSet;

/// CDN edge certificates are only honored from this region, wherever the
/// rest of the deployment runs.
pub const CDN_CERT_REGION: &str = "us-east-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CertPurpose {
    Site,
    Api,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateRequirement {
    pub purpose: CertPurpose,
    pub primary_domain: String,
    pub alternate_names: BTreeSet<String>,
    pub pinned_region: String,
}

/// Site certificate for apex + www, and an api certificate when `needs_api`.
pub fn plan_certificates(domain: &DomainSpec, needs_api: bool) -> Vec<CertificateRequirement> {
    let mut certs = Vec::with_capacity(2);

    let mut sans = BTreeSet::new();
    if domain.www != domain.apex {
        sans.insert(domain.www.clone());
    }
    certs.push(CertificateRequirement {
        purpose: CertPurpose::Site,
        primary_domain: domain.apex.clone(),
        alternate_names: sans,
        pinned_region: CDN_CERT_REGION.to_string(),
    });

    if needs_api {
        certs.push(CertificateRequirement {
            purpose: CertPurpose::Api,
            primary_domain: domain.api_sub.clone(),
            alternate_names: BTreeSet::new(),
            pinned_region: CDN_CERT_REGION.to_string(),
        });
    }

    certs
}

/// Reject any attempt to move certificates out of the CDN region.
pub fn check_region_override(requested: Option<&str>) -> PlanResult<()> {
    match requested {
        Some(r) if !r.is_empty() && r != CDN_CERT_REGION => {
            Err(PlanError::CertificateRegionMismatch {
                requested: r.to_string(),
                pinned: CDN_CERT_REGION.to_string(),
            })
        }
        _ => Ok(()),
    }
}

impl CertificateRequirement {
    /// Every name the certificate covers, primary first.
    pub fn names(&self) -> Vec<&str> {
        std::iter::once(self.primary_domain.as_str())
            .chain(self.alternate_names.iter().map(String::as_str))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::normalize;
    use pretty_assertions::assert_eq;

    #[test]
    fn site_only_without_api() {
        let d = normalize("Example.com").unwrap();
        let certs = plan_certificates(&d, false);
        assert_eq!(certs.len(), 1);
        assert_eq!(certs[0].purpose, CertPurpose::Site);
        assert_eq!(certs[0].names(), vec!["example.com", "www.example.com"]);
        assert_eq!(certs[0].pinned_region, CDN_CERT_REGION);
    }

    #[test]
    fn api_cert_is_pinned_too() {
        let d = normalize("example.com").unwrap();
        let certs = plan_certificates(&d, true);
        let api = certs.iter().find(|c| c.purpose == CertPurpose::Api).unwrap();
        assert_eq!(api.names(), vec!["api.example.com"]);
        assert_eq!(api.pinned_region, "us-east-1");
    }

    #[test]
    fn www_domain_has_no_duplicate_san() {
        let d = normalize("www.example.com").unwrap();
        let certs = plan_certificates(&d, false);
        assert!(certs[0].alternate_names.is_empty());
    }

    #[test]
    fn region_override_must_match_pin() {
        assert!(check_region_override(None).is_ok());
        assert!(check_region_override(Some("us-east-1")).is_ok());
        assert!(matches!(
            check_region_override(Some("eu-central-1")),
            Err(PlanError::CertificateRegionMismatch { .. })
        ));
    }
}
