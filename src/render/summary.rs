use crate::plan::Plan;
use crate::resolve::ZoneMode;
use std::fmt::Write;

/// Human-readable plan summary for the terminal.
pub fn render_summary(plan: &Plan) -> String {
    let mut out = String::new();

    match &plan.zone {
        Some(z) => {
            let mode = match z.mode {
                ZoneMode::Imported => "import",
                ZoneMode::Created => "create",
            };
            let id = z.zone_id.as_deref().map(|i| format!(" ({})", i)).unwrap_or_default();
            let _ = writeln!(out, "zone:      {} {}{}", mode, z.domain, id);
        }
        None => {
            let _ = writeln!(out, "zone:      none (no custom domain)");
        }
    }

    for c in &plan.certificates {
        let _ = writeln!(
            out,
            "cert:      {:?} {} [{}]",
            c.purpose,
            c.names().join(", "),
            c.pinned_region
        );
    }

    let _ = writeln!(
        out,
        "endpoint:  {} ({:?}{})",
        plan.endpoint.url,
        plan.endpoint.source,
        if plan.endpoint.requires_dependency_edge {
            ", ui waits for api"
        } else {
            ""
        }
    );

    let _ = writeln!(out, "units:");
    for (i, u) in plan.units().iter().enumerate() {
        let deps = if u.depends_on.is_empty() {
            "-".to_string()
        } else {
            u.depends_on.iter().cloned().collect::<Vec<_>>().join(", ")
        };
        let _ = writeln!(
            out,
            "  {}. {:<4} {:<12} after: {}",
            i + 1,
            u.name,
            u.region,
            deps
        );
    }

    for w in &plan.warnings {
        let _ = writeln!(out, "WARN: {}", w);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeploymentFile;
    use crate::plan::Planner;
    use crate::resolve::zone::testing::RecordingLookup;
    use pretty_assertions::assert_eq;

    #[test]
    fn summary_for_override_plan() {
        let f: DeploymentFile =
            serde_json::from_str(r#"{ "api_endpoint": "https://o.example/prod" }"#).unwrap();
        let plan = Planner::new(f.validate_and_build().unwrap())
            .plan(&RecordingLookup::default())
            .unwrap();

        assert_eq!(
            render_summary(&plan),
            "zone:      none (no custom domain)\n\
             endpoint:  https://o.example/prod (Override)\n\
             units:\n\
             \x20 1. api  us-west-2    after: -\n\
             \x20 2. ui   us-west-2    after: -\n"
        );
    }

    #[test]
    fn summary_lists_certificates_and_waits() {
        let f: DeploymentFile =
            serde_json::from_str(r#"{ "domain": "example.com" }"#).unwrap();
        let plan = Planner::new(f.validate_and_build().unwrap())
            .plan(&RecordingLookup::default())
            .unwrap();
        let s = render_summary(&plan);
        assert!(s.contains("zone:      create example.com\n"), "{s}");
        assert!(s.contains("cert:      Site example.com, www.example.com [us-east-1]"), "{s}");
        assert!(s.contains("cert:      Api api.example.com [us-east-1]"), "{s}");
        assert!(s.contains("(CustomDomain, ui waits for api)"), "{s}");
        assert!(s.contains("3. ui   us-west-2    after: api, dns"), "{s}");
    }
}
