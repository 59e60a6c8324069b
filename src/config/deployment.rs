//! Deployment file (deploy.json) plus the layers stacked on top of it.
//!
//! JSON shape (every field optional):
//! {
//!   "domain": "example.com",
//!   "custom_domain": true,
//!   "api_endpoint": "https://...",       // skip the api dependency
//!   "hosted_zone_id": "Z0123",
//!   "hosted_zone_name": "example.com",
//!   "zone_fallback": "create",           // or "deny"
//!   "certificate_region": "us-east-1",   // may only restate the pin
//!   "api": { "region": "us-west-2", "stage": "prod", "rest_api_id": "abc123", ... },
//!   "ui":  { "region": "us-west-2", "artifact_path": "runtime-config.toml", ... }
//! }
//!
//! Layering, later wins: this file, then the `.env` file, then CLI flags.
//! The validated result is `PlannerConfig`; nothing past this module reads
//! the environment.

use crate::env::EnvIndex;
use crate::resolve::ZoneFallback;
use anyhow::bail;
use serde::Deserialize;

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_STAGE: &str = "prod";
pub const DEFAULT_SECRET_PARAMETER: &str = "/calculator/anthropic-api-key";
pub const DEFAULT_ARTIFACT_PATH: &str = "runtime-config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeploymentFile {
    #[serde(default)]
    pub domain: Option<String>,

    #[serde(default)]
    pub custom_domain: Option<bool>,

    #[serde(default)]
    pub api_endpoint: Option<String>,

    #[serde(default)]
    pub hosted_zone_id: Option<String>,

    #[serde(default)]
    pub hosted_zone_name: Option<String>,

    #[serde(default)]
    pub zone_fallback: Option<String>,

    #[serde(default)]
    pub certificate_region: Option<String>,

    #[serde(default)]
    pub api: RawApi,

    #[serde(default)]
    pub ui: RawUi,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawApi {
    pub region: Option<String>,
    pub runtime: Option<String>,
    pub handler: Option<String>,
    pub code_dir: Option<String>,
    pub timeout_secs: Option<u32>,
    pub memory_mb: Option<u32>,
    pub stage: Option<String>,
    pub secret_parameter: Option<String>,
    /// Provider-assigned url, when already known.
    pub default_url: Option<String>,
    /// Used to derive `default_url` when that is absent.
    pub rest_api_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawUi {
    pub region: Option<String>,
    pub asset_dir: Option<String>,
    pub index_document: Option<String>,
    pub artifact_path: Option<String>,
}

/// Values from the `.env` file or the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub domain: Option<String>,
    pub custom_domain: Option<bool>,
    pub api_endpoint: Option<String>,
    pub hosted_zone_id: Option<String>,
    pub hosted_zone_name: Option<String>,
    pub zone_fallback: Option<String>,
    pub api_region: Option<String>,
    pub ui_region: Option<String>,
    pub artifact_path: Option<String>,
}

impl ConfigOverrides {
    /// Map the well-known `.env` keys. Unknown keys are ignored; the file is
    /// often shared with other tools.
    pub fn from_env_index(env: &EnvIndex) -> anyhow::Result<Self> {
        let get = |k: &str| env.get(k).map(|e| e.value.clone()).filter(|v| !v.is_empty());
        let region = get("AWS_REGION");

        let custom_domain = match get("USE_CUSTOM_DOMAIN") {
            None => None,
            Some(v) => Some(parse_bool(&v).ok_or_else(|| {
                anyhow::anyhow!("USE_CUSTOM_DOMAIN must be true or false, got {:?}", v)
            })?),
        };

        Ok(Self {
            domain: get("CUSTOM_DOMAIN"),
            custom_domain,
            api_endpoint: get("API_ENDPOINT"),
            hosted_zone_id: get("HOSTED_ZONE_ID"),
            hosted_zone_name: get("HOSTED_ZONE_NAME"),
            zone_fallback: get("ZONE_FALLBACK"),
            api_region: get("API_REGION").or_else(|| region.clone()),
            ui_region: get("UI_REGION").or(region),
            artifact_path: None,
        })
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Validated planner input.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Raw, un-normalized domain input.
    pub domain: Option<String>,
    pub custom_domain: bool,
    pub api_endpoint_override: Option<String>,
    pub hosted_zone_id: Option<String>,
    pub hosted_zone_name: Option<String>,
    pub zone_fallback: ZoneFallback,
    pub certificate_region: Option<String>,
    pub api: ApiSettings,
    pub ui: UiSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiSettings {
    pub region: String,
    pub runtime: String,
    pub handler: String,
    pub code_dir: String,
    pub timeout_secs: u32,
    pub memory_mb: u32,
    pub stage: String,
    pub secret_parameter: String,
    pub default_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiSettings {
    pub region: String,
    pub asset_dir: String,
    pub index_document: String,
    pub artifact_path: String,
}

impl DeploymentFile {
    /// Stack `overrides` on top of the file. `None` fields leave the file alone.
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        fn set<T: Clone>(slot: &mut Option<T>, v: &Option<T>) {
            if v.is_some() {
                *slot = v.clone();
            }
        }
        set(&mut self.domain, &overrides.domain);
        set(&mut self.custom_domain, &overrides.custom_domain);
        set(&mut self.api_endpoint, &overrides.api_endpoint);
        set(&mut self.hosted_zone_id, &overrides.hosted_zone_id);
        set(&mut self.hosted_zone_name, &overrides.hosted_zone_name);
        set(&mut self.zone_fallback, &overrides.zone_fallback);
        set(&mut self.api.region, &overrides.api_region);
        set(&mut self.ui.region, &overrides.ui_region);
        set(&mut self.ui.artifact_path, &overrides.artifact_path);
    }

    /// Fill defaults and reject values the planner cannot use.
    pub fn validate_and_build(&self) -> anyhow::Result<PlannerConfig> {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());

        let zone_fallback = match self.zone_fallback.as_deref().map(str::trim) {
            None | Some("") | Some("create") => ZoneFallback::Create,
            Some("deny") => ZoneFallback::Deny,
            Some(other) => bail!("zone_fallback must be \"create\" or \"deny\", got {:?}", other),
        };

        // An explicit request for a custom domain needs a domain to go with it.
        let domain = self.domain.clone();
        if self.custom_domain == Some(true) && domain.is_none() {
            bail!("custom_domain is enabled but no domain was given");
        }
        let custom_domain = self.custom_domain.unwrap_or(domain.is_some());

        let api = &self.api;
        let timeout_secs = api.timeout_secs.unwrap_or(30);
        if timeout_secs == 0 {
            bail!("api.timeout_secs must be positive");
        }
        let memory_mb = api.memory_mb.unwrap_or(256);
        if memory_mb == 0 {
            bail!("api.memory_mb must be positive");
        }

        let api_region = non_empty(&api.region).unwrap_or_else(|| DEFAULT_REGION.to_string());
        let stage = non_empty(&api.stage).unwrap_or_else(|| DEFAULT_STAGE.to_string());
        let default_url = non_empty(&api.default_url).or_else(|| {
            non_empty(&api.rest_api_id).map(|id| {
                format!("https://{}.execute-api.{}.amazonaws.com/{}", id, api_region, stage)
            })
        });

        let ui = &self.ui;
        let artifact_path =
            non_empty(&ui.artifact_path).unwrap_or_else(|| DEFAULT_ARTIFACT_PATH.to_string());

        Ok(PlannerConfig {
            domain,
            custom_domain,
            api_endpoint_override: non_empty(&self.api_endpoint),
            hosted_zone_id: non_empty(&self.hosted_zone_id),
            hosted_zone_name: non_empty(&self.hosted_zone_name),
            zone_fallback,
            certificate_region: non_empty(&self.certificate_region),
            api: ApiSettings {
                region: api_region,
                runtime: non_empty(&api.runtime).unwrap_or_else(|| "python3.9".to_string()),
                handler: non_empty(&api.handler)
                    .unwrap_or_else(|| "lambda_function.lambda_handler".to_string()),
                code_dir: non_empty(&api.code_dir).unwrap_or_else(|| "lambda".to_string()),
                timeout_secs,
                memory_mb,
                stage,
                secret_parameter: non_empty(&api.secret_parameter)
                    .unwrap_or_else(|| DEFAULT_SECRET_PARAMETER.to_string()),
                default_url,
            },
            ui: UiSettings {
                region: non_empty(&ui.region).unwrap_or_else(|| DEFAULT_REGION.to_string()),
                asset_dir: non_empty(&ui.asset_dir).unwrap_or_else(|| "ui/build".to_string()),
                index_document: non_empty(&ui.index_document)
                    .unwrap_or_else(|| "index.html".to_string()),
                artifact_path,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::parse_env_str;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gets_defaults() {
        let cfg: DeploymentFile = serde_json::from_str("{}").unwrap();
        let cfg = cfg.validate_and_build().unwrap();
        assert_eq!(cfg.domain, None);
        assert!(!cfg.custom_domain);
        assert_eq!(cfg.zone_fallback, ZoneFallback::Create);
        assert_eq!(cfg.api.region, "us-west-2");
        assert_eq!(cfg.api.timeout_secs, 30);
        assert_eq!(cfg.api.memory_mb, 256);
        assert_eq!(cfg.api.secret_parameter, "/calculator/anthropic-api-key");
        assert_eq!(cfg.api.default_url, None);
        assert_eq!(cfg.ui.artifact_path, "runtime-config.toml");
    }

    #[test]
    fn domain_implies_custom_domain_unless_disabled() {
        let mut f = DeploymentFile {
            domain: Some("Example.com".into()),
            ..Default::default()
        };
        assert!(f.validate_and_build().unwrap().custom_domain);

        f.custom_domain = Some(false);
        let cfg = f.validate_and_build().unwrap();
        assert!(!cfg.custom_domain);
        assert_eq!(cfg.domain.as_deref(), Some("Example.com"));
    }

    #[test]
    fn custom_domain_without_domain_is_rejected() {
        let f = DeploymentFile {
            custom_domain: Some(true),
            ..Default::default()
        };
        assert!(f.validate_and_build().is_err());
    }

    #[test]
    fn rest_api_id_derives_default_url() {
        let f: DeploymentFile = serde_json::from_str(
            r#"{ "api": { "rest_api_id": "40bfeqva02", "region": "us-west-2" } }"#,
        )
        .unwrap();
        let cfg = f.validate_and_build().unwrap();
        assert_eq!(
            cfg.api.default_url.as_deref(),
            Some("https://40bfeqva02.execute-api.us-west-2.amazonaws.com/prod")
        );
    }

    #[test]
    fn rejects_bad_values() {
        for json in [
            r#"{ "zone_fallback": "maybe" }"#,
            r#"{ "api": { "timeout_secs": 0 } }"#,
            r#"{ "api": { "memory_mb": 0 } }"#,
        ] {
            let f: DeploymentFile = serde_json::from_str(json).unwrap();
            assert!(f.validate_and_build().is_err(), "accepted {}", json);
        }
        assert!(serde_json::from_str::<DeploymentFile>(r#"{ "domian": "x" }"#).is_err());
    }

    #[test]
    fn later_layers_win() {
        let mut f: DeploymentFile = serde_json::from_str(
            r#"{ "domain": "file.example", "hosted_zone_name": "file.example", "api": { "region": "eu-west-1" } }"#,
        )
        .unwrap();

        let env = parse_env_str("CUSTOM_DOMAIN=env.example\nAWS_REGION=ap-south-1\n").unwrap();
        f.apply(&ConfigOverrides::from_env_index(&env).unwrap());

        let cli = ConfigOverrides {
            api_endpoint: Some("https://cli.example/prod".into()),
            ..Default::default()
        };
        f.apply(&cli);

        let cfg = f.validate_and_build().unwrap();
        assert_eq!(cfg.domain.as_deref(), Some("env.example"));
        assert_eq!(cfg.hosted_zone_name.as_deref(), Some("file.example"));
        assert_eq!(cfg.api.region, "ap-south-1");
        assert_eq!(cfg.ui.region, "ap-south-1");
        assert_eq!(
            cfg.api_endpoint_override.as_deref(),
            Some("https://cli.example/prod")
        );
    }

    #[test]
    fn env_custom_domain_flag_must_be_boolean() {
        let env = parse_env_str("USE_CUSTOM_DOMAIN=sometimes\n").unwrap();
        assert!(ConfigOverrides::from_env_index(&env).is_err());

        let env = parse_env_str("USE_CUSTOM_DOMAIN=no\n").unwrap();
        let o = ConfigOverrides::from_env_index(&env).unwrap();
        assert_eq!(o.custom_domain, Some(false));
    }
}
