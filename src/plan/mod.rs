//! Plan layer: turn a validated `PlannerConfig` into deployment units.
//!
//! Flow per run (single-threaded, no retries):
//! 1) normalize the domain
//! 2) resolve the hosted zone and plan certificates (custom domain only)
//! 3) resolve the api endpoint
//! 4) assemble units, check the graph, attach the runtime config artifact
//!
//! Any error aborts the run; a partial plan is never returned.

pub mod artifact;
pub mod builder;
pub mod dag;

pub use artifact::RuntimeConfigArtifact;
pub use builder::{UnitSettings, build_plan};

use crate::config::PlannerConfig;
use crate::error::{PlanResult, PlanWarning};
use crate::resolve::{
    CertPurpose, CertificateRequirement, EndpointResolution, ZoneDecision, ZoneHints, ZoneLookup,
    check_region_override, normalize, plan_certificates, resolve_endpoint, resolve_zone,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

pub const DNS_UNIT: &str = "dns";
pub const API_UNIT: &str = "api";
pub const UI_UNIT: &str = "ui";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeploymentUnit {
    pub name: String,
    pub region: String,
    pub depends_on: BTreeSet<String>,
    pub config: BTreeMap<String, String>,
    pub outputs: BTreeMap<String, UnitOutput>,
}

/// A stack output. Values known at plan time are echoed back; the rest are
/// filled in by the provisioning engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitOutput {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl UnitOutput {
    pub fn reported(description: &str) -> Self {
        Self {
            description: description.to_string(),
            value: None,
        }
    }

    pub fn known(description: &str, value: &str) -> Self {
        Self {
            description: description.to_string(),
            value: Some(value.to_string()),
        }
    }
}

/// A resolved plan. The dns unit exists only when a custom domain is planned.
#[derive(Debug, Clone)]
pub struct Plan {
    pub dns: Option<DeploymentUnit>,
    pub api: DeploymentUnit,
    pub ui: DeploymentUnit,
    /// Topological order: dependencies first.
    pub order: Vec<String>,
    pub zone: Option<ZoneDecision>,
    pub certificates: Vec<CertificateRequirement>,
    pub endpoint: EndpointResolution,
    pub artifact: RuntimeConfigArtifact,
    pub warnings: Vec<PlanWarning>,
}

impl Plan {
    pub fn unit(&self, name: &str) -> Option<&DeploymentUnit> {
        match name {
            DNS_UNIT => self.dns.as_ref(),
            API_UNIT => Some(&self.api),
            UI_UNIT => Some(&self.ui),
            _ => None,
        }
    }

    /// Units in deployment order.
    pub fn units(&self) -> Vec<&DeploymentUnit> {
        self.order.iter().filter_map(|n| self.unit(n)).collect()
    }
}

pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn plan(&self, lookup: &dyn ZoneLookup) -> PlanResult<Plan> {
        let cfg = &self.config;
        check_region_override(cfg.certificate_region.as_deref())?;

        let domain = cfg.domain.as_deref().map(normalize).transpose()?;
        let override_url = cfg.api_endpoint_override.as_deref();
        let mut warnings = Vec::new();

        let (zone, certs) = match domain.as_ref().filter(|_| cfg.custom_domain) {
            Some(d) => {
                info!(
                    domain = %d.normalized,
                    www = %d.www,
                    api = %d.api_sub,
                    "custom domain requested"
                );
                let res = resolve_zone(
                    &d.normalized,
                    ZoneHints {
                        zone_id: cfg.hosted_zone_id.as_deref(),
                        zone_name: cfg.hosted_zone_name.as_deref(),
                    },
                    cfg.zone_fallback,
                    lookup,
                )?;
                warnings.extend(res.warning);

                // An external endpoint is not served from the api subdomain.
                let certs = plan_certificates(d, override_url.is_none());
                (Some(res.decision), certs)
            }
            None => (None, Vec::new()),
        };

        let api_cert_planned = certs.iter().any(|c| c.purpose == CertPurpose::Api);
        let endpoint = resolve_endpoint(
            override_url,
            cfg.api.default_url.as_deref(),
            api_cert_planned,
            domain.as_ref().map(|d| d.api_sub.as_str()),
        )?;
        info!(
            url = %endpoint.url,
            source = ?endpoint.source,
            wait_for_api = endpoint.requires_dependency_edge,
            "resolved api endpoint"
        );

        let plan = build_plan(
            zone.as_ref(),
            &certs,
            &endpoint,
            UnitSettings {
                api: &cfg.api,
                ui: &cfg.ui,
            },
            warnings,
        )?;
        info!(order = ?plan.order, "plan assembled");
        Ok(plan)
    }
}
