use std::collections::BTreeSet;
use std::time::Duration;

use jenkins_config::Configuration;

/// Everything a transport needs to issue one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub server_url: String,
    pub auth_token: Option<String>,
    pub job_filter: Option<BTreeSet<String>>,
    /// Transports should pass this to their HTTP client. The engine enforces
    /// it independently.
    pub timeout: Duration,
}

impl TransportRequest {
    pub fn from_config(config: &Configuration) -> Self {
        Self {
            server_url: config.server_url.clone(),
            auth_token: config.auth_token.clone(),
            job_filter: config.job_filter.clone(),
            timeout: config.fetch_timeout(),
        }
    }
}

/// A job exactly as the server described it, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawJob {
    /// Short name inside the parent folder.
    pub name: String,
    /// Folder-qualified name when the server reports one.
    pub full_name: Option<String>,
    pub display_name: Option<String>,
    pub url: String,
    pub color: Option<String>,
    pub last_build: Option<RawBuild>,
    pub jobs: Vec<RawJob>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBuild {
    pub number: i64,
    pub result: Option<String>,
    pub building: bool,
    pub url: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: Option<i64>,
}
