//! Domain normalization.
//!
//! Every name that later lands in a certificate or a DNS record is derived
//! from one `DomainSpec`, so casing is decided exactly once.

use crate::error::{PlanError, PlanResult};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainSpec {
    pub raw_input: String,
    pub normalized: String,
    pub apex: String,
    pub www: String,
    pub api_sub: String,
}

/// Lower-case `raw` and derive the apex, `www.` and `api.` names.
pub fn normalize(raw: &str) -> PlanResult<DomainSpec> {
    if raw.is_empty() {
        return Err(invalid(raw, "domain is empty"));
    }
    if raw.chars().any(char::is_whitespace) {
        return Err(invalid(raw, "domain contains whitespace"));
    }

    let normalized = raw.to_lowercase();
    let www = if normalized.starts_with("www.") {
        normalized.clone()
    } else {
        format!("www.{}", normalized)
    };

    Ok(DomainSpec {
        raw_input: raw.to_string(),
        apex: normalized.clone(),
        api_sub: format!("api.{}", normalized),
        www,
        normalized,
    })
}

fn invalid(input: &str, reason: &str) -> PlanError {
    PlanError::InvalidDomain {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}
