use crate::error::PlanWarning;
use crate::plan::{DeploymentUnit, Plan, RuntimeConfigArtifact};
use crate::resolve::{CertificateRequirement, EndpointResolution, ZoneDecision};
use serde::Serialize;

/// Serialized plan handed to the provisioning engine.
///
/// `units` is already in deployment order; `order` repeats just the names.
#[derive(Debug, Serialize)]
pub struct PlanDocument<'a> {
    pub order: &'a [String],
    pub units: Vec<&'a DeploymentUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<&'a ZoneDecision>,
    pub certificates: &'a [CertificateRequirement],
    pub endpoint: &'a EndpointResolution,
    pub artifact: &'a RuntimeConfigArtifact,
    pub warnings: Vec<WarningView>,
}

#[derive(Debug, Serialize)]
pub struct WarningView {
    #[serde(flatten)]
    pub warning: PlanWarning,
    pub message: String,
}

impl<'a> PlanDocument<'a> {
    pub fn new(plan: &'a Plan) -> Self {
        Self {
            order: &plan.order,
            units: plan.units(),
            zone: plan.zone.as_ref(),
            certificates: &plan.certificates,
            endpoint: &plan.endpoint,
            artifact: &plan.artifact,
            warnings: plan
                .warnings
                .iter()
                .map(|w| WarningView {
                    warning: w.clone(),
                    message: w.to_string(),
                })
                .collect(),
        }
    }
}

/// Pretty JSON with a trailing newline; key order is stable across runs.
pub fn render_plan_json(plan: &Plan) -> anyhow::Result<String> {
    let mut out = serde_json::to_string_pretty(&PlanDocument::new(plan))?;
    out.push('\n');
    Ok(out)
}
