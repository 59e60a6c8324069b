use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{Level, info, warn};

mod config;
mod env;
mod error;
mod plan;
mod render;
mod resolve;
mod telemetry;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "calcplan")]
#[command(about = "Deployment plan resolver for the calculator stack", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the deployment plan, print a summary and optionally write it.
    Plan {
        #[command(flatten)]
        input: InputArgs,

        /// Write the plan as JSON.
        #[arg(short = 'o', long)]
        out: Option<String>,

        /// Write the runtime config artifact here (also the path the ui fetches).
        #[arg(long)]
        artifact: Option<String>,
    },

    /// Resolve the plan and write only the runtime config artifact.
    Artifact {
        #[command(flatten)]
        input: InputArgs,

        /// Defaults to the ui artifact path from the deployment file.
        #[arg(short = 'o', long)]
        out: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
struct InputArgs {
    /// Deployment file (deploy.json).
    #[arg(long)]
    config: Option<String>,

    /// `.env` file layered over the deployment file.
    #[arg(long)]
    env_file: Option<String>,

    /// Hosted zone inventory (zones.json) used for zone lookups.
    #[arg(long)]
    zones: Option<String>,

    #[arg(long, env = "CUSTOM_DOMAIN")]
    domain: Option<String>,

    /// Externally deployed API endpoint; the ui then skips waiting on the api.
    #[arg(long, env = "API_ENDPOINT")]
    api_endpoint: Option<String>,

    #[arg(long, env = "HOSTED_ZONE_ID")]
    hosted_zone_id: Option<String>,

    #[arg(long, env = "HOSTED_ZONE_NAME")]
    hosted_zone_name: Option<String>,

    /// Keep the provider-assigned names even when a domain is set.
    #[arg(long)]
    no_custom_domain: bool,

    #[arg(long)]
    api_region: Option<String>,

    #[arg(long)]
    ui_region: Option<String>,

    /// What to do when a hosted zone lookup finds nothing.
    #[arg(long, value_parser = ["create", "deny"])]
    zone_fallback: Option<String>,
}

impl InputArgs {
    fn overrides(&self, artifact_path: Option<&str>) -> config::ConfigOverrides {
        config::ConfigOverrides {
            domain: self.domain.clone(),
            custom_domain: self.no_custom_domain.then_some(false),
            api_endpoint: self.api_endpoint.clone(),
            hosted_zone_id: self.hosted_zone_id.clone(),
            hosted_zone_name: self.hosted_zone_name.clone(),
            zone_fallback: self.zone_fallback.clone(),
            api_region: self.api_region.clone(),
            ui_region: self.ui_region.clone(),
            artifact_path: artifact_path.map(str::to_string),
        }
    }

    /// Layer deployment file, `.env` file and flags into one validated config.
    fn load_config(&self, artifact_path: Option<&str>) -> Result<config::PlannerConfig> {
        let mut file = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("read deployment file {}", path))?;
                serde_json::from_str::<config::DeploymentFile>(&text)
                    .with_context(|| format!("parse deployment file {}", path))?
            }
            None => config::DeploymentFile::default(),
        };

        if let Some(path) = &self.env_file {
            let index = env::parse_env_file(path)?;
            let overrides = config::ConfigOverrides::from_env_index(&index)
                .with_context(|| format!("env file {}", path))?;
            file.apply(&overrides);
        }

        file.apply(&self.overrides(artifact_path));
        file.validate_and_build()
            .context("invalid deployment configuration")
    }

    fn load_zones(&self) -> Result<config::ZoneInventory> {
        match &self.zones {
            Some(path) => config::ZoneInventory::load(path),
            None => Ok(config::ZoneInventory::default()),
        }
    }

    fn resolve(&self, artifact_path: Option<&str>) -> Result<plan::Plan> {
        // 1) Configuration + zone inventory.
        let cfg = self.load_config(artifact_path)?;
        let zones = self.load_zones()?;
        if zones.is_empty() && cfg.domain.is_some() && cfg.custom_domain {
            info!("no zone inventory given; every zone lookup will miss");
        }

        // 2) Plan. Errors here abort before anything is written.
        let plan = plan::Planner::new(cfg)
            .plan(&zones)
            .context("planning failed")?;
        for w in &plan.warnings {
            warn!("{}", w);
        }
        Ok(plan)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    telemetry::init_tracing(cli.json, level);

    match cli.cmd {
        Commands::Plan {
            input,
            out,
            artifact,
        } => {
            let plan = input.resolve(artifact.as_deref())?;
            let json = render::render_plan_json(&plan)?;

            print!("{}", render::render_summary(&plan));

            if let Some(out) = out {
                std::fs::write(&out, json).with_context(|| format!("write plan {}", out))?;
                println!("Wrote {}", out);
            }
            if artifact.is_some() {
                write_artifact(&plan.artifact)?;
            }
        }
        Commands::Artifact { input, out } => {
            let plan = input.resolve(out.as_deref())?;
            write_artifact(&plan.artifact)?;
        }
    }

    Ok(())
}

fn write_artifact(artifact: &plan::RuntimeConfigArtifact) -> Result<()> {
    std::fs::write(&artifact.path, artifact.render())
        .with_context(|| format!("write runtime config {}", artifact.path))?;
    println!("Wrote {}", artifact.path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_beat_env_file_beat_deployment_file() {
        let dir = tempfile::tempdir().unwrap();

        let deploy = dir.path().join("deploy.json");
        std::fs::write(
            &deploy,
            r#"{ "domain": "file.example", "api": { "region": "eu-west-1", "rest_api_id": "abc" } }"#,
        )
        .unwrap();

        let env_path = dir.path().join(".env");
        let mut f = std::fs::File::create(&env_path).unwrap();
        writeln!(f, "CUSTOM_DOMAIN=Env.Example").unwrap();
        writeln!(f, "HOSTED_ZONE_NAME=env.example").unwrap();

        let input = InputArgs {
            config: Some(deploy.to_str().unwrap().to_string()),
            env_file: Some(env_path.to_str().unwrap().to_string()),
            api_region: Some("us-west-1".into()),
            no_custom_domain: true,
            ..Default::default()
        };
        let cfg = input.load_config(Some("public/runtime-config.toml")).unwrap();

        assert_eq!(cfg.domain.as_deref(), Some("Env.Example"));
        assert_eq!(cfg.hosted_zone_name.as_deref(), Some("env.example"));
        assert!(!cfg.custom_domain);
        assert_eq!(cfg.api.region, "us-west-1");
        assert_eq!(cfg.ui.artifact_path, "public/runtime-config.toml");
        assert_eq!(
            cfg.api.default_url.as_deref(),
            Some("https://abc.execute-api.us-west-1.amazonaws.com/prod")
        );
    }

    #[test]
    fn zone_inventory_feeds_the_planner() {
        let dir = tempfile::tempdir().unwrap();
        let zones = dir.path().join("zones.json");
        std::fs::write(
            &zones,
            r#"{ "zones": [ { "id": "Z77", "name": "calc.example." } ] }"#,
        )
        .unwrap();

        let input = InputArgs {
            zones: Some(zones.to_str().unwrap().to_string()),
            domain: Some("Calc.Example".into()),
            ..Default::default()
        };
        let plan = input.resolve(None).unwrap();
        let zone = plan.zone.unwrap();
        assert_eq!(zone.mode, resolve::ZoneMode::Imported);
        assert_eq!(zone.zone_id.as_deref(), Some("Z77"));
    }

    #[test]
    fn zone_hint_for_another_domain_stops_planning() {
        let dir = tempfile::tempdir().unwrap();
        let zones = dir.path().join("zones.json");
        std::fs::write(&zones, r#"{ "zones": [ { "id": "Z1", "name": "other.com." } ] }"#)
            .unwrap();

        let input = InputArgs {
            zones: Some(zones.to_str().unwrap().to_string()),
            domain: Some("example.com".into()),
            hosted_zone_name: Some("Other.com.".into()),
            ..Default::default()
        };
        let err = input.resolve(None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<error::PlanError>(),
            Some(error::PlanError::ZoneDomainMismatch { zone, domain })
                if zone == "other.com" && domain == "example.com"
        ));
    }

    #[test]
    fn planning_errors_keep_their_kind() {
        let input = InputArgs::default();
        let err = input.resolve(None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<error::PlanError>(),
            Some(error::PlanError::UnresolvableEndpoint)
        ));
    }
}
