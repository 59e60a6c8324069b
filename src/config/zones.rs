//! Hosted zone inventory (zones.json), the offline answer to zone lookups.
//!
//! JSON shape:
//! {
//!   "zones": [ { "id": "Z0123456789", "name": "example.com." } ]
//! }
//!
//! Names are matched case-insensitively and a trailing root dot is ignored,
//! the way the DNS provider reports them.

use crate::resolve::{HostedZone, ZoneLookup};
use anyhow::{Context, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZonesFile {
    #[serde(default)]
    pub zones: Vec<HostedZone>,
}

/// Validated inventory keyed by canonical zone name.
#[derive(Debug, Clone, Default)]
pub struct ZoneInventory {
    by_name: BTreeMap<String, HostedZone>,
}

fn canonical(name: &str) -> String {
    name.trim().trim_end_matches('.').to_lowercase()
}

impl ZonesFile {
    pub fn validate_and_build(&self) -> anyhow::Result<ZoneInventory> {
        let mut by_name = BTreeMap::new();
        for z in &self.zones {
            if z.id.trim().is_empty() {
                bail!("zone {:?} has an empty id", z.name);
            }
            let key = canonical(&z.name);
            if key.is_empty() {
                bail!("zone {} has an empty name", z.id);
            }
            let zone = HostedZone {
                id: z.id.trim().to_string(),
                name: key.clone(),
            };
            if let Some(prev) = by_name.insert(key.clone(), zone) {
                bail!("duplicate zone name {} (ids {} and {})", key, prev.id, z.id);
            }
        }
        Ok(ZoneInventory { by_name })
    }
}

impl ZoneInventory {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("read zones file {}", path))?;
        let file: ZonesFile =
            serde_json::from_str(&text).with_context(|| format!("parse zones file {}", path))?;
        file.validate_and_build()
            .with_context(|| format!("validate zones file {}", path))
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl ZoneLookup for ZoneInventory {
    fn find_by_name(&self, name: &str) -> anyhow::Result<Option<HostedZone>> {
        Ok(self.by_name.get(&canonical(name)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn lookup_ignores_case_and_root_dot() {
        let file: ZonesFile =
            serde_json::from_str(r#"{ "zones": [ { "id": "Z1", "name": "Example.com." } ] }"#)
                .unwrap();
        let inv = file.validate_and_build().unwrap();
        let z = inv.find_by_name("example.COM").unwrap().unwrap();
        assert_eq!(
            z,
            HostedZone {
                id: "Z1".into(),
                name: "example.com".into()
            }
        );
        assert_eq!(inv.find_by_name("other.com").unwrap(), None);
    }

    #[test]
    fn duplicates_and_blanks_are_rejected() {
        for json in [
            r#"{ "zones": [ { "id": "Z1", "name": "a.com" }, { "id": "Z2", "name": "A.com." } ] }"#,
            r#"{ "zones": [ { "id": " ", "name": "a.com" } ] }"#,
            r#"{ "zones": [ { "id": "Z1", "name": "." } ] }"#,
        ] {
            let file: ZonesFile = serde_json::from_str(json).unwrap();
            assert!(file.validate_and_build().is_err(), "accepted {}", json);
        }
    }

    #[test]
    fn load_from_disk() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{ "zones": [ {{ "id": "Z9", "name": "calc.example" }} ] }}"#).unwrap();
        let inv = ZoneInventory::load(f.path().to_str().unwrap()).unwrap();
        assert!(!inv.is_empty());
        assert!(inv.find_by_name("calc.example").unwrap().is_some());
    }
}
