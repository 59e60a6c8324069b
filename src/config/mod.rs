//! Configuration layer: JSON input schemas + validated in-memory structures.
//!
//! Owns:
//! - deploy.json, layered with `.env` and CLI overrides into `PlannerConfig`
//! - zones.json, the hosted zone inventory used for lookups

pub mod deployment;
pub mod zones;

pub use deployment::{ApiSettings, ConfigOverrides, DeploymentFile, PlannerConfig, UiSettings};
pub use zones::ZoneInventory;
