//! Deployment graph assembly.
//!
//! Units and edges:
//!   dns -> api   only when the api serves its own certificate
//!   dns -> ui    whenever the site certificate exists
//!   api -> ui    unless the endpoint was supplied from outside
//!
//! The api unit never consumes ui output.

use crate::config::{ApiSettings, UiSettings};
use crate::error::{PlanError, PlanResult, PlanWarning};
use crate::plan::artifact::{CALCULATE_SEGMENT, RuntimeConfigArtifact};
use crate::plan::dag::topo_order;
use crate::plan::{API_UNIT, DNS_UNIT, DeploymentUnit, Plan, UI_UNIT, UnitOutput};
use crate::resolve::{
    CDN_CERT_REGION, CertPurpose, CertificateRequirement, EndpointResolution, ZoneDecision,
    ZoneMode,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Cross-unit output reference, resolved by the provisioning engine.
fn output_ref(unit: &str, output: &str) -> String {
    format!("${{{}.{}}}", unit, output)
}

/// Per-unit settings the builder turns into config payloads.
#[derive(Debug, Clone)]
pub struct UnitSettings<'a> {
    pub api: &'a ApiSettings,
    pub ui: &'a UiSettings,
}

pub fn build_plan(
    zone: Option<&ZoneDecision>,
    certs: &[CertificateRequirement],
    endpoint: &EndpointResolution,
    settings: UnitSettings<'_>,
    warnings: Vec<PlanWarning>,
) -> PlanResult<Plan> {
    let site_cert = certs.iter().find(|c| c.purpose == CertPurpose::Site);
    let api_cert = certs.iter().find(|c| c.purpose == CertPurpose::Api);

    let dns = if zone.is_some() || !certs.is_empty() {
        Some(dns_unit(zone, certs))
    } else {
        None
    };
    let has_dns = dns.is_some();

    let api = api_unit(settings.api, api_cert.filter(|_| has_dns));
    let artifact = RuntimeConfigArtifact::from_endpoint(endpoint, &settings.ui.artifact_path);
    let ui = ui_unit(settings.ui, site_cert.filter(|_| has_dns), endpoint, &artifact);

    if api.depends_on.contains(UI_UNIT) {
        return Err(PlanError::PlanCycle {
            cycle: vec![API_UNIT.to_string(), UI_UNIT.to_string(), API_UNIT.to_string()],
        });
    }

    let mut units: Vec<&DeploymentUnit> = vec![&api, &ui];
    if let Some(d) = &dns {
        units.push(d);
    }
    let order = topo_order(&units)?;

    for u in &units {
        debug!(
            unit = %u.name,
            region = %u.region,
            depends_on = ?u.depends_on,
            config = ?u.config,
            "assembled unit"
        );
    }

    Ok(Plan {
        dns,
        api,
        ui,
        order,
        zone: zone.cloned(),
        certificates: certs.to_vec(),
        endpoint: endpoint.clone(),
        artifact,
        warnings,
    })
}

fn dns_unit(zone: Option<&ZoneDecision>, certs: &[CertificateRequirement]) -> DeploymentUnit {
    let mut config = BTreeMap::new();
    let mut outputs = BTreeMap::new();

    if let Some(z) = zone {
        config.insert("zone.mode".to_string(), mode_name(z).to_string());
        config.insert("zone.domain".to_string(), z.domain.clone());
        if let Some(id) = &z.zone_id {
            config.insert("zone.id".to_string(), id.clone());
        }
        outputs.insert(
            "NameServers".to_string(),
            UnitOutput::reported("Name servers for the hosted zone"),
        );
    }

    for c in certs {
        let (prefix, export, description) = match c.purpose {
            CertPurpose::Site => (
                "cert.site",
                "MainCertificateArn",
                "ARN of the main domain certificate",
            ),
            CertPurpose::Api => (
                "cert.api",
                "ApiCertificateArn",
                "ARN of the API domain certificate",
            ),
        };
        config.insert(format!("{}.domain", prefix), c.primary_domain.clone());
        if !c.alternate_names.is_empty() {
            config.insert(
                format!("{}.alternate_names", prefix),
                join(c.alternate_names.iter()),
            );
        }
        config.insert(format!("{}.region", prefix), c.pinned_region.clone());
        config.insert(format!("{}.validation", prefix), "dns".to_string());
        outputs.insert(export.to_string(), UnitOutput::reported(description));
    }

    DeploymentUnit {
        name: DNS_UNIT.to_string(),
        // Certificates are what forces the region; the zone itself is global.
        region: CDN_CERT_REGION.to_string(),
        depends_on: BTreeSet::new(),
        config,
        outputs,
    }
}

fn api_unit(api: &ApiSettings, cert: Option<&CertificateRequirement>) -> DeploymentUnit {
    let mut config = BTreeMap::new();
    config.insert("function.runtime".to_string(), api.runtime.clone());
    config.insert("function.handler".to_string(), api.handler.clone());
    config.insert("function.code_dir".to_string(), api.code_dir.clone());
    config.insert("function.timeout_secs".to_string(), api.timeout_secs.to_string());
    config.insert("function.memory_mb".to_string(), api.memory_mb.to_string());
    config.insert(
        "function.env.PARAMETER_NAME".to_string(),
        api.secret_parameter.clone(),
    );
    config.insert("secret.parameter".to_string(), api.secret_parameter.clone());
    config.insert("secret.grant".to_string(), "ssm:GetParameter".to_string());
    config.insert("route".to_string(), format!("POST /{}", CALCULATE_SEGMENT));
    config.insert("cors.allow_origins".to_string(), "*".to_string());
    config.insert("cors.allow_methods".to_string(), "*".to_string());
    config.insert("stage".to_string(), api.stage.clone());

    let mut depends_on = BTreeSet::new();
    if let Some(c) = cert {
        config.insert("custom_domain".to_string(), c.primary_domain.clone());
        config.insert(
            "custom_domain.certificate".to_string(),
            output_ref(DNS_UNIT, "ApiCertificateArn"),
        );
        config.insert(
            "records".to_string(),
            format!("A {}", c.primary_domain),
        );
        depends_on.insert(DNS_UNIT.to_string());
    }

    let mut outputs = BTreeMap::new();
    outputs.insert(
        "ApiUrl".to_string(),
        UnitOutput::reported("Provider-assigned API endpoint"),
    );
    if let Some(c) = cert {
        outputs.insert(
            "CustomDomain".to_string(),
            UnitOutput::known("Custom domain for the API", &c.primary_domain),
        );
    }

    DeploymentUnit {
        name: API_UNIT.to_string(),
        region: api.region.clone(),
        depends_on,
        config,
        outputs,
    }
}

fn ui_unit(
    ui: &UiSettings,
    cert: Option<&CertificateRequirement>,
    endpoint: &EndpointResolution,
    artifact: &RuntimeConfigArtifact,
) -> DeploymentUnit {
    let mut config = BTreeMap::new();
    config.insert("bucket.asset_dir".to_string(), ui.asset_dir.clone());
    config.insert("bucket.index_document".to_string(), ui.index_document.clone());
    config.insert("cdn.viewer_protocol".to_string(), "redirect-to-https".to_string());
    config.insert(
        "cdn.error_response".to_string(),
        format!("404 -> 200 /{}", ui.index_document),
    );
    config.insert("cdn.invalidation".to_string(), "/*".to_string());

    let mut depends_on = BTreeSet::new();
    let mut outputs = BTreeMap::new();
    outputs.insert(
        "DistributionDomainName".to_string(),
        UnitOutput::reported("The CDN distribution domain name"),
    );
    outputs.insert(
        "ApiEndpoint".to_string(),
        UnitOutput::known("API endpoint the ui calls", &endpoint.url),
    );

    if let Some(c) = cert {
        let names = c.names();
        config.insert("cdn.domain_names".to_string(), names.join(","));
        config.insert(
            "cdn.certificate".to_string(),
            output_ref(DNS_UNIT, "MainCertificateArn"),
        );
        let records: Vec<String> = names
            .iter()
            .flat_map(|n| [format!("A {}", n), format!("AAAA {}", n)])
            .collect();
        config.insert("records".to_string(), records.join(","));
        outputs.insert(
            "CustomDomain".to_string(),
            UnitOutput::known("Custom domain for the application", &c.primary_domain),
        );
        depends_on.insert(DNS_UNIT.to_string());
    }

    if endpoint.requires_dependency_edge {
        depends_on.insert(API_UNIT.to_string());
    }

    // The artifact lands here and nowhere else.
    config.insert("API_ENDPOINT".to_string(), artifact.api_endpoint.clone());
    config.insert("runtime_config.path".to_string(), artifact.path.clone());
    config.insert("runtime_config.content".to_string(), artifact.render());

    DeploymentUnit {
        name: UI_UNIT.to_string(),
        region: ui.region.clone(),
        depends_on,
        config,
        outputs,
    }
}

fn mode_name(z: &ZoneDecision) -> &'static str {
    match z.mode {
        ZoneMode::Imported => "imported",
        ZoneMode::Created => "created",
    }
}

fn join<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items.map(String::as_str).collect::<Vec<_>>().join(",")
}
