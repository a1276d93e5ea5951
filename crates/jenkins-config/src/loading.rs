//! Configuration loading and merging logic.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in the following order (later sources override earlier ones):
//! 1. **Hardcoded defaults** - Built-in fallback values
//! 2. **User config** - `~/.jenkins-watch/config.toml`
//! 3. **Project config** - `./.jenkins-watch/config.toml`
//! 4. **Environment** - `JENKINS_WATCH_TOKEN` when no file set a token
//! 5. **CLI arguments** - applied by the host on the returned [`ConfigFile`]

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::defaults::TOKEN_ENV_VAR;
use crate::errors::ConfigError;
use crate::paths::WatchPaths;
use crate::types::{ConfigFile, PollingSection, ServerSection, UiSection};

/// Load and merge the user and project config files for the current process.
///
/// Missing files are not errors. Parse errors are.
pub fn load_hierarchy() -> Result<ConfigFile, ConfigError> {
    let paths = WatchPaths::resolve().map_err(|e| ConfigError::InvalidConfiguration {
        message: e.to_string(),
    })?;
    let project_root = std::env::current_dir()?;
    load_hierarchy_from(&paths, &project_root)
}

/// Load and merge config files rooted at explicit locations.
pub fn load_hierarchy_from(
    paths: &WatchPaths,
    project_root: &Path,
) -> Result<ConfigFile, ConfigError> {
    let mut config = ConfigFile::default();

    if let Some(user) = load_optional(&paths.user_config())? {
        config = merge_files(config, user);
    }

    if let Some(project) = load_optional(&WatchPaths::project_config(project_root))? {
        config = merge_files(config, project);
    }

    if config.server.auth_token.is_none()
        && let Ok(token) = std::env::var(TOKEN_ENV_VAR)
        && !token.is_empty()
    {
        debug!(event = "config.token_from_env", var = TOKEN_ENV_VAR);
        config.server.auth_token = Some(token);
    }

    Ok(config)
}

fn load_optional(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    match load_config_file(path) {
        Ok(file) => {
            debug!(event = "config.file_loaded", path = %path.display());
            Ok(Some(file))
        }
        Err(ConfigError::IoError { source }) if source.kind() == std::io::ErrorKind::NotFound => {
            debug!(event = "config.file_missing", path = %path.display());
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Load a single configuration file.
pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
        message: format!("'{}': {}", path.display(), e),
    })
}

/// Merge two files, with `override_file` taking precedence for every set field.
pub fn merge_files(base: ConfigFile, override_file: ConfigFile) -> ConfigFile {
    ConfigFile {
        server: ServerSection {
            url: override_file.server.url.or(base.server.url),
            auth_token: override_file.server.auth_token.or(base.server.auth_token),
        },
        polling: PollingSection {
            interval_secs: override_file
                .polling
                .interval_secs
                .or(base.polling.interval_secs),
            timeout_secs: override_file
                .polling
                .timeout_secs
                .or(base.polling.timeout_secs),
            // Job lists replace, never union.
            jobs: override_file.polling.jobs.or(base.polling.jobs),
        },
        ui: UiSection {
            layout: override_file.ui.layout.or(base.ui.layout),
        },
    }
}
