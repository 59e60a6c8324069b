//! Runtime config artifact: the one file the ui fetches at load time to find
//! its backend.

use crate::resolve::EndpointResolution;
use serde::Serialize;

/// Path segment of the calculation route on the api.
pub const CALCULATE_SEGMENT: &str = "calculate";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeConfigArtifact {
    /// Where the ui build expects the file.
    pub path: String,
    /// Fully qualified calculation url.
    pub api_endpoint: String,
}

impl RuntimeConfigArtifact {
    pub fn from_endpoint(endpoint: &EndpointResolution, path: &str) -> Self {
        Self {
            path: path.to_string(),
            api_endpoint: format!(
                "{}/{}",
                endpoint.url.trim_end_matches('/'),
                CALCULATE_SEGMENT
            ),
        }
    }

    /// File content. Output depends only on `api_endpoint`.
    pub fn render(&self) -> String {
        let escaped = self.api_endpoint.replace('\\', "\\\\").replace('"', "\\\"");
        format!("API_ENDPOINT = \"{}\"\n", escaped)
    }
}
