//! API endpoint resolution.
//!
//! Priority: explicit override, then the planned custom api domain, then the
//! api unit's provider-assigned url. Only an override lets the ui deploy
//! without waiting on the api unit.

use crate::error::{PlanError, PlanResult};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EndpointSource {
    Override,
    CustomDomain,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointResolution {
    pub url: String,
    pub source: EndpointSource,
    pub requires_dependency_edge: bool,
}

impl EndpointResolution {
    fn new(url: String, source: EndpointSource) -> Self {
        Self {
            url,
            requires_dependency_edge: source != EndpointSource::Override,
            source,
        }
    }
}

pub fn resolve_endpoint(
    explicit_override: Option<&str>,
    api_default_url: Option<&str>,
    custom_domain_planned: bool,
    api_sub: Option<&str>,
) -> PlanResult<EndpointResolution> {
    if let Some(url) = explicit_override.filter(|s| !s.is_empty()) {
        return Ok(EndpointResolution::new(
            url.to_string(),
            EndpointSource::Override,
        ));
    }

    if custom_domain_planned {
        if let Some(sub) = api_sub.filter(|s| !s.is_empty()) {
            return Ok(EndpointResolution::new(
                format!("https://{}", sub),
                EndpointSource::CustomDomain,
            ));
        }
    }

    match api_default_url.filter(|s| !s.is_empty()) {
        Some(url) => Ok(EndpointResolution::new(
            url.to_string(),
            EndpointSource::Default,
        )),
        None => Err(PlanError::UnresolvableEndpoint),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn override_wins_over_everything() {
        let r = resolve_endpoint(
            Some("https://override.example/"),
            Some("https://default.example/"),
            true,
            Some("api.example.com"),
        )
        .unwrap();
        assert_eq!(r.url, "https://override.example/");
        assert_eq!(r.source, EndpointSource::Override);
        assert!(!r.requires_dependency_edge);
    }

    #[test]
    fn empty_override_is_ignored() {
        let r = resolve_endpoint(Some(""), Some("https://default.example/"), false, None).unwrap();
        assert_eq!(r.source, EndpointSource::Default);
    }

    #[test]
    fn custom_domain_beats_default() {
        let r = resolve_endpoint(
            None,
            Some("https://default.example/"),
            true,
            Some("api.example.com"),
        )
        .unwrap();
        assert_eq!(
            r,
            EndpointResolution {
                url: "https://api.example.com".into(),
                source: EndpointSource::CustomDomain,
                requires_dependency_edge: true,
            }
        );
    }

    #[test]
    fn custom_domain_without_sub_uses_default() {
        let r = resolve_endpoint(None, Some("https://default.example/"), true, None).unwrap();
        assert_eq!(r.source, EndpointSource::Default);
    }

    #[test]
    fn default_requires_edge() {
        let r = resolve_endpoint(None, Some("https://default.example/"), false, None).unwrap();
        assert_eq!(r.source, EndpointSource::Default);
        assert!(r.requires_dependency_edge);
    }

    #[test]
    fn nothing_to_resolve_is_an_error() {
        assert!(matches!(
            resolve_endpoint(None, None, false, None),
            Err(PlanError::UnresolvableEndpoint)
        ));
    }

    #[test]
    fn source_serializes_camel_case() {
        let json = serde_json::to_string(&EndpointSource::CustomDomain).unwrap();
        assert_eq!(json, "\"customDomain\"");
    }
}
