use jenkins_config::Configuration;
use tracing::{error, info};

pub fn log_app_startup(command: &str) {
    info!(
        event = "core.app.startup_completed",
        version = env!("CARGO_PKG_VERSION"),
        command
    );
}

pub fn log_app_shutdown(command: &str) {
    info!(event = "core.app.shutdown_started", command);
}

pub fn log_app_error(command: &str, error: &dyn std::error::Error) {
    error!(
        event = "core.app.error_occurred",
        command,
        error = %error,
        error_type = std::any::type_name_of_val(error)
    );
}

/// Record the effective configuration once it has passed validation.
///
/// The auth token is never logged, only whether one is set.
pub fn log_config_resolved(config: &Configuration) {
    info!(
        event = "core.app.config_resolved",
        server = %config.server_url,
        interval_secs = config.poll_interval_secs,
        timeout_secs = config.fetch_timeout_secs,
        layout = %config.layout,
        job_filters = config.job_filter.as_ref().map_or(0, |jobs| jobs.len()),
        authenticated = config.auth_token.is_some()
    );
}
