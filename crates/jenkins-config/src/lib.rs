//! # jenkins-config
//!
//! Configuration for jenkins-watch: the read-only [`Configuration`] value the
//! polling engine consumes, its validation rules, and the TOML file hierarchy
//! the host loads it from.
//!
//! The polling core never reads files itself. Hosts call [`load_hierarchy`],
//! apply their own overrides, resolve a [`Configuration`], and hand it to the
//! engine explicitly.

mod defaults;
mod loading;
mod validation;

pub mod errors;
pub mod paths;
pub mod types;

// Public API re-exports
pub use defaults::{DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_SECS, TOKEN_ENV_VAR};
pub use errors::ConfigError;
pub use loading::{load_config_file, load_hierarchy, load_hierarchy_from, merge_files};
pub use paths::{PathError, WatchPaths};
pub use types::{
    ConfigFile, Configuration, LayoutMode, PollingSection, ServerSection, UiSection,
};
pub use validation::{SUPPORTED_SCHEMES, validate_config};

impl Configuration {
    /// Validate the configuration.
    ///
    /// See [`validation::validate_config`] for details.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validation::validate_config(self)
    }
}
