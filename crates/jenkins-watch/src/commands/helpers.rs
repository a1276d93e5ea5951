use clap::ArgMatches;
use tracing::{error, warn};

use jenkins_config::{
    ConfigError, ConfigFile, Configuration, LayoutMode, PollingSection, ServerSection, UiSection,
    load_hierarchy, merge_files,
};
use jenkins_core::{WatchError, events};

use crate::color;
use crate::transport::CurlTransport;

/// Load config files, falling back to defaults with a warning on errors.
fn load_config_with_warning() -> ConfigFile {
    match load_hierarchy() {
        Ok(file) => file,
        Err(e) => {
            eprintln!(
                "{} {}",
                color::warning(&format!("Warning: Could not load config: {}. Using defaults.", e)),
                color::hint(
                    "Tip: Check ~/.jenkins-watch/config.toml and ./.jenkins-watch/config.toml for syntax errors."
                )
            );
            warn!(
                event = "cli.config.load_failed",
                error = %e,
                error_code = e.error_code()
            );
            ConfigFile::default()
        }
    }
}

/// Flags map onto a config file layer so they merge like any other source.
///
/// Uses `try_get_*` because not every command defines every flag.
fn cli_overrides(matches: &ArgMatches) -> ConfigFile {
    let server = matches.try_get_one::<String>("server").ok().flatten();
    let interval = matches.try_get_one::<u64>("interval").ok().flatten();
    let timeout = matches.try_get_one::<u64>("timeout").ok().flatten();
    let layout = matches
        .try_get_one::<String>("layout")
        .ok()
        .flatten()
        .and_then(|s| s.parse::<LayoutMode>().ok());
    let jobs = matches
        .try_get_many::<String>("job")
        .ok()
        .flatten()
        .map(|values| values.cloned().collect::<Vec<_>>());

    ConfigFile {
        server: ServerSection {
            url: server.cloned(),
            auth_token: None,
        },
        polling: PollingSection {
            interval_secs: interval.copied(),
            timeout_secs: timeout.copied(),
            jobs,
        },
        ui: UiSection { layout },
    }
}

/// Config files, then environment, then flags. Validated before returning.
pub(crate) fn resolve_config(matches: &ArgMatches) -> Result<Configuration, ConfigError> {
    let config = merge_files(load_config_with_warning(), cli_overrides(matches)).resolve();
    if let Err(e) = config.validate() {
        eprintln!("{}", color::error(&format!("Invalid configuration: {}", e)));
        if matches!(e, ConfigError::MissingField { .. }) {
            eprintln!(
                "{}",
                color::hint("Tip: Pass --server <URL> or set server.url in ~/.jenkins-watch/config.toml.")
            );
        }
        error!(
            event = "cli.config.validation_failed",
            error = %e,
            error_code = e.error_code()
        );
        return Err(e);
    }
    events::log_config_resolved(&config);
    Ok(config)
}

pub(crate) fn require_curl() -> Result<CurlTransport, Box<dyn std::error::Error>> {
    let transport = CurlTransport;
    if !transport.is_available() {
        eprintln!("{}", color::error("curl was not found on PATH."));
        eprintln!(
            "{}",
            color::hint("Tip: Install curl, or run from an environment where it is available.")
        );
        error!(event = "cli.transport.unavailable", transport = "curl");
        return Err("curl not found".into());
    }
    Ok(transport)
}
