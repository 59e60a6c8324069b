//! Hosted zone resolution: import an existing zone or declare a new one.
//!
//! Lookup and fallback are separate steps. `ZoneLookup::find_by_name`
//! answers "does this zone exist"; the decision to create on a miss is made
//! here, against the configured `ZoneFallback`, so that the branch is visible
//! in logs and in the plan's warnings.

use crate::error::{PlanError, PlanResult, PlanWarning};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A zone known to the DNS provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HostedZone {
    pub id: String,
    pub name: String,
}

/// Read-only existence check against the DNS provider.
///
/// `Ok(None)` is a miss. `Err` means the provider could not answer and the
/// planning run must stop.
pub trait ZoneLookup {
    fn find_by_name(&self, name: &str) -> anyhow::Result<Option<HostedZone>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneFallback {
    /// A lookup miss declares a new managed zone.
    #[default]
    Create,
    /// A lookup miss is fatal.
    Deny,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneMode {
    Imported,
    Created,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneDecision {
    pub mode: ZoneMode,
    pub domain: String,
    /// Known only for imported zones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneResolution {
    pub decision: ZoneDecision,
    pub warning: Option<PlanWarning>,
}

/// Hints supplied by the operator. Both empty means "look up the domain".
#[derive(Debug, Clone, Default)]
pub struct ZoneHints<'a> {
    pub zone_id: Option<&'a str>,
    pub zone_name: Option<&'a str>,
}

/// Decide how the zone for `domain` (already normalized) is obtained.
///
/// Order: id hint, then name hint, then the domain itself.
pub fn resolve_zone(
    domain: &str,
    hints: ZoneHints<'_>,
    fallback: ZoneFallback,
    lookup: &dyn ZoneLookup,
) -> PlanResult<ZoneResolution> {
    if let Some(id) = hints.zone_id.filter(|s| !s.is_empty()) {
        info!(zone_id = id, domain, "importing hosted zone by id");
        return Ok(ZoneResolution {
            decision: ZoneDecision {
                mode: ZoneMode::Imported,
                domain: domain.to_string(),
                zone_id: Some(id.to_string()),
            },
            warning: None,
        });
    }

    let name_hint = hints
        .zone_name
        .map(|s| s.trim_end_matches('.').to_lowercase())
        .filter(|s| !s.is_empty());
    let query = name_hint.clone().unwrap_or_else(|| domain.to_string());

    let found = lookup
        .find_by_name(&query)
        .map_err(|e| PlanError::ZoneLookupFailed {
            zone: query.clone(),
            reason: format!("{:#}", e),
        })?;

    if let Some(zone) = found {
        if !zone_covers(&query, domain) {
            return Err(PlanError::ZoneDomainMismatch {
                zone: query,
                domain: domain.to_string(),
            });
        }
        info!(zone_id = %zone.id, zone = %query, "found existing hosted zone");
        return Ok(ZoneResolution {
            decision: ZoneDecision {
                mode: ZoneMode::Imported,
                domain: query,
                zone_id: Some(zone.id),
            },
            warning: None,
        });
    }

    if fallback == ZoneFallback::Deny {
        return Err(PlanError::ZoneCreationDenied { zone: query });
    }

    // A miss on an explicit name hint is the case most likely to be a typo.
    let warning = match name_hint {
        Some(requested) => {
            warn!(
                requested = %requested,
                created = domain,
                "named hosted zone not found; declaring a new zone"
            );
            Some(PlanWarning::ZoneLookupAmbiguity {
                requested,
                created: domain.to_string(),
            })
        }
        None => {
            info!(domain, "no hosted zone found; declaring a new zone");
            None
        }
    };

    Ok(ZoneResolution {
        decision: ZoneDecision {
            mode: ZoneMode::Created,
            domain: domain.to_string(),
            zone_id: None,
        },
        warning,
    })
}

/// True when records for `domain` can live in `zone`.
fn zone_covers(zone: &str, domain: &str) -> bool {
    domain == zone
        || domain
            .strip_suffix(zone)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
