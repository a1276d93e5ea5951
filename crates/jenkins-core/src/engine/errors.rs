use jenkins_config::ConfigError;

use crate::errors::WatchError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Engine configuration rejected: {source}")]
    InvalidConfiguration {
        #[from]
        source: ConfigError,
    },
}

impl WatchError for EngineError {
    fn error_code(&self) -> &'static str {
        match self {
            EngineError::InvalidConfiguration { source } => source.error_code(),
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            EngineError::InvalidConfiguration { source } => source.is_user_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configuration_delegates_code() {
        let error = EngineError::from(ConfigError::InvalidUrl {
            url: "not a url".to_string(),
            reason: "relative URL without a base".to_string(),
        });
        assert_eq!(error.error_code(), "CONFIG_INVALID_URL");
        assert!(error.is_user_error());
        assert!(error.to_string().starts_with("Engine configuration rejected:"));
    }
}
