//! Resolver layer: pure decisions made before any unit is assembled.
//!
//! - domain: one canonical casing for every derived name
//! - zone: import vs. create, with an explicit fallback branch
//! - cert: edge certificates pinned to the CDN region
//! - endpoint: which url the ui talks to, and whether it must wait for it

pub mod cert;
pub mod domain;
pub mod endpoint;
pub mod zone;

pub use cert::{
    CDN_CERT_REGION, CertPurpose, CertificateRequirement, check_region_override, plan_certificates,
};
pub use domain::{DomainSpec, normalize};
pub use endpoint::{EndpointResolution, EndpointSource, resolve_endpoint};
pub use zone::{
    HostedZone, ZoneDecision, ZoneFallback, ZoneHints, ZoneLookup, ZoneMode, resolve_zone,
};
