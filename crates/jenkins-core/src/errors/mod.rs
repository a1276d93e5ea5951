use std::error::Error;

/// Base trait for all application errors
pub trait WatchError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling
    fn error_code(&self) -> &'static str;

    /// Whether this error should be logged as an error or warning
    fn is_user_error(&self) -> bool {
        false
    }
}

impl WatchError for jenkins_config::ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            jenkins_config::ConfigError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            jenkins_config::ConfigError::MissingField { .. } => "CONFIG_MISSING_FIELD",
            jenkins_config::ConfigError::InvalidUrl { .. } => "CONFIG_INVALID_URL",
            jenkins_config::ConfigError::InvalidInterval { .. } => "CONFIG_INVALID_INTERVAL",
            jenkins_config::ConfigError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            jenkins_config::ConfigError::IoError { .. } => "CONFIG_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        !matches!(self, jenkins_config::ConfigError::IoError { .. })
    }
}
