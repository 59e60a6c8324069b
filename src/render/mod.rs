//! Output layer: what the provisioning engine and the operator get to see.

pub mod json;
pub mod summary;

pub use json::render_plan_json;
pub use summary::render_summary;
