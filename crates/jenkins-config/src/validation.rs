//! Configuration validation logic.
//!
//! Validation runs before any network I/O. A configuration that fails here
//! is fatal to the engine until the host supplies a corrected one.

use url::Url;

use crate::errors::ConfigError;
use crate::types::Configuration;

/// URL schemes the transport layer can talk to.
pub const SUPPORTED_SCHEMES: [&str; 2] = ["http", "https"];

/// Validate a Configuration, returning the first problem found.
///
/// # Validation Rules
///
/// - Server URL must be set, parse as an absolute URL, use http(s) and name a host
/// - Poll interval must be greater than zero
/// - Fetch timeout must be greater than zero and no longer than the poll interval
/// - Job filter entries must be non-empty
pub fn validate_config(config: &Configuration) -> Result<(), ConfigError> {
    let raw_url = config.server_url.trim();
    if raw_url.is_empty() {
        return Err(ConfigError::MissingField {
            field: "server.url".to_string(),
        });
    }

    let url = Url::parse(raw_url).map_err(|e| ConfigError::InvalidUrl {
        url: raw_url.to_string(),
        reason: e.to_string(),
    })?;

    if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
        return Err(ConfigError::InvalidUrl {
            url: raw_url.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::InvalidUrl {
            url: raw_url.to_string(),
            reason: "missing host".to_string(),
        });
    }

    if config.poll_interval_secs == 0 {
        return Err(ConfigError::InvalidInterval {
            message: "poll interval must be greater than zero".to_string(),
        });
    }

    if config.fetch_timeout_secs == 0 {
        return Err(ConfigError::InvalidInterval {
            message: "fetch timeout must be greater than zero".to_string(),
        });
    }

    if config.fetch_timeout_secs > config.poll_interval_secs {
        return Err(ConfigError::InvalidInterval {
            message: format!(
                "fetch timeout ({}s) must not exceed poll interval ({}s)",
                config.fetch_timeout_secs, config.poll_interval_secs
            ),
        });
    }

    if let Some(ref jobs) = config.job_filter
        && jobs.iter().any(|job| job.trim().is_empty())
    {
        return Err(ConfigError::InvalidConfiguration {
            message: "job filter contains an empty job name".to_string(),
        });
    }

    Ok(())
}
