//! Configuration type definitions.
//!
//! [`ConfigFile`] is the on-disk shape, with every field optional so user and
//! project files can be merged. [`ConfigFile::resolve`] turns the merged file
//! into the [`Configuration`] value the polling engine consumes.
//!
//! # Example Configuration
//!
//! ```toml
//! [server]
//! url = "https://ci.example.com"
//! auth_token = "alice:11e2b5c0d1"
//!
//! [polling]
//! interval_secs = 30
//! timeout_secs = 10
//! jobs = ["api", "platform/deploy"]
//!
//! [ui]
//! layout = "split"
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults::{DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_SECS};
use crate::errors::ConfigError;

/// Which host surface receives engine callbacks.
///
/// Does not change polling behaviour, only which layout strategy the host
/// builds at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Browser and latest-build panel share one tool window.
    #[default]
    Single,
    /// Browser in the tool window, latest builds in a status-bar widget.
    Split,
}

impl LayoutMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutMode::Single => "single",
            LayoutMode::Split => "split",
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(LayoutMode::Single),
            "split" => Ok(LayoutMode::Split),
            other => Err(ConfigError::InvalidConfiguration {
                message: format!("Unknown layout '{}'. Valid options: single, split", other),
            }),
        }
    }
}

/// Read-only configuration snapshot handed to the polling engine.
///
/// Owned by the host. The engine never reloads it implicitly; the host calls
/// `reconfigure` with a fresh value whenever settings change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// Base URL of the Jenkins server, e.g. `https://ci.example.com/`.
    pub server_url: String,
    /// Credential passed through to the transport (`user:api-token`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    pub poll_interval_secs: u64,
    pub fetch_timeout_secs: u64,
    /// Job names to watch. `None` watches every job on the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_filter: Option<BTreeSet<String>>,
    #[serde(default)]
    pub layout: LayoutMode,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            server_url: String::new(),
            auth_token: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            job_filter: None,
            layout: LayoutMode::default(),
        }
    }
}

impl Configuration {
    /// Configuration for `server_url` with every other setting at its default.
    pub fn for_server(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Self::default()
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Whether `other` points at a different server than `self`.
    ///
    /// Trailing slashes are ignored so `https://ci/` and `https://ci` compare equal.
    pub fn targets_other_server(&self, other: &Configuration) -> bool {
        self.server_url.trim_end_matches('/') != other.server_url.trim_end_matches('/')
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

/// `[polling]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<Vec<String>>,
}

/// `[ui]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutMode>,
}

/// On-disk configuration file.
///
/// Fields are `Option<T>` so that only explicitly-set values override
/// lower-priority files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub polling: PollingSection,
    #[serde(default)]
    pub ui: UiSection,
}

impl ConfigFile {
    /// Fill unset values with defaults and produce the engine-facing value.
    ///
    /// Does not validate; an unset server URL resolves to an empty string
    /// which validation rejects as a missing field.
    pub fn resolve(self) -> Configuration {
        let job_filter = self
            .polling
            .jobs
            .map(|jobs| jobs.into_iter().collect::<BTreeSet<_>>())
            .filter(|jobs| !jobs.is_empty());

        Configuration {
            server_url: self.server.url.unwrap_or_default(),
            auth_token: self.server.auth_token,
            poll_interval_secs: self
                .polling
                .interval_secs
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            fetch_timeout_secs: self
                .polling
                .timeout_secs
                .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
            job_filter,
            layout: self.ui.layout.unwrap_or_default(),
        }
    }
}
