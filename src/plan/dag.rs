//! Unit dependency graph validation.
//!
//! Edges point from a unit to the units it depends on. A valid plan is a
//! DAG; the returned order lists every dependency before its dependents, with
//! ties broken by unit name so the order is stable across runs.

use crate::error::{PlanError, PlanResult};
use crate::plan::DeploymentUnit;
use std::collections::BTreeMap;

/// Check references and acyclicity, then return a topological order.
pub fn topo_order(units: &[&DeploymentUnit]) -> PlanResult<Vec<String>> {
    // 1) Index by name; every dependency must be a known unit.
    let mut deps = BTreeMap::<&str, Vec<&str>>::new();
    for u in units {
        deps.insert(u.name.as_str(), u.depends_on.iter().map(String::as_str).collect());
    }
    for u in units {
        for d in &u.depends_on {
            if !deps.contains_key(d.as_str()) {
                return Err(PlanError::UnknownDependency {
                    unit: u.name.clone(),
                    dependency: d.clone(),
                });
            }
        }
    }

    // 2) DFS coloring; post-order emits dependencies first.
    #[derive(Copy, Clone, PartialEq, Eq)]
    enum Mark {
        Temp,
        Perm,
    }

    fn dfs<'a>(
        v: &'a str,
        deps: &BTreeMap<&'a str, Vec<&'a str>>,
        marks: &mut BTreeMap<&'a str, Mark>,
        stack: &mut Vec<&'a str>,
        order: &mut Vec<String>,
    ) -> PlanResult<()> {
        match marks.get(v) {
            Some(Mark::Perm) => return Ok(()),
            Some(Mark::Temp) => {
                // v is on the current path => cycle
                let start = stack.iter().position(|s| *s == v).unwrap_or(0);
                let mut cycle: Vec<String> = stack[start..].iter().map(|s| s.to_string()).collect();
                cycle.push(v.to_string());
                return Err(PlanError::PlanCycle { cycle });
            }
            None => {}
        }

        marks.insert(v, Mark::Temp);
        stack.push(v);

        if let Some(ds) = deps.get(v) {
            for d in ds {
                dfs(*d, deps, marks, stack, order)?;
            }
        }

        stack.pop();
        marks.insert(v, Mark::Perm);
        order.push(v.to_string());
        Ok(())
    }

    let mut marks = BTreeMap::<&str, Mark>::new();
    let mut stack = Vec::<&str>::new();
    let mut order = Vec::with_capacity(units.len());
    for name in deps.keys() {
        stack.clear();
        dfs(*name, &deps, &mut marks, &mut stack, &mut order)?;
    }

    Ok(order)
}
