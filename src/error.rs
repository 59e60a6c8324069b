//! Planner error taxonomy.
//!
//! Every variant here is fatal: planning stops and nothing is written.
//! Conditions that only deserve operator attention are `PlanWarning`s and
//! travel inside the finished plan instead.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    /// The domain input is empty or malformed.
    #[error("invalid domain {input:?}: {reason}")]
    InvalidDomain { input: String, reason: String },

    /// Neither an override, a custom domain nor a default endpoint exists.
    #[error(
        "no API endpoint could be resolved: supply an endpoint override, a custom domain or the api unit's default url"
    )]
    UnresolvableEndpoint,

    /// The unit dependency graph is not a DAG.
    #[error("dependency cycle between deployment units: {}", cycle.join(" -> "))]
    PlanCycle { cycle: Vec<String> },

    /// A unit names a dependency that is not part of the plan.
    #[error("unit {unit:?} depends on unknown unit {dependency:?}")]
    UnknownDependency { unit: String, dependency: String },

    /// Edge certificates must live in the CDN region.
    #[error("certificate region {requested:?} rejected: CDN certificates are pinned to {pinned}")]
    CertificateRegionMismatch { requested: String, pinned: String },

    /// The DNS provider lookup itself failed (not a miss).
    #[error("hosted zone lookup for {zone:?} failed: {reason}")]
    ZoneLookupFailed { zone: String, reason: String },

    /// The named zone exists but cannot hold records for the domain.
    #[error("hosted zone {zone:?} cannot serve domain {domain:?}")]
    ZoneDomainMismatch { zone: String, domain: String },

    /// Lookup missed and the fallback policy forbids declaring a new zone.
    #[error("hosted zone {zone:?} not found and zone creation is disabled")]
    ZoneCreationDenied { zone: String },
}

pub type PlanResult<T> = std::result::Result<T, PlanError>;

/// Non-fatal findings surfaced alongside a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    /// A named zone was expected to exist but will be created instead.
    ZoneLookupAmbiguity { requested: String, created: String },
}

impl std::fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanWarning::ZoneLookupAmbiguity { requested, created } => write!(
                f,
                "hosted zone {:?} was not found; a new zone for {:?} will be created",
                requested, created
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_error_lists_path() {
        let err = PlanError::PlanCycle {
            cycle: vec!["api".into(), "ui".into(), "api".into()],
        };
        assert_eq!(
            err.to_string(),
            "dependency cycle between deployment units: api -> ui -> api"
        );
    }

    #[test]
    fn region_mismatch_names_both_regions() {
        let err = PlanError::CertificateRegionMismatch {
            requested: "eu-west-1".into(),
            pinned: "us-east-1".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("eu-west-1"));
        assert!(msg.contains("us-east-1"));
    }

    #[test]
    fn ambiguity_warning_serializes_with_kind_tag() {
        let w = PlanWarning::ZoneLookupAmbiguity {
            requested: "exmaple.com".into(),
            created: "example.com".into(),
        };
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["kind"], "zone_lookup_ambiguity");
        assert_eq!(json["requested"], "exmaple.com");
    }
}
