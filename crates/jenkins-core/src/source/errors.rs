use std::fmt;

use serde::Serialize;

use crate::errors::WatchError;

/// Coarse category of a failed fetch, handed to the host with the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    Unreachable,
    ServerRejected,
    ParseFailure,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Unreachable => "unreachable",
            TransportErrorKind::ServerRejected => "server_rejected",
            TransportErrorKind::ParseFailure => "parse_failure",
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single poll failed. Transient: the next scheduled tick retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Jenkins server unreachable: {message}")]
    Unreachable { message: String },

    #[error("Jenkins server rejected the request (HTTP {status}): {message}")]
    ServerRejected { status: u16, message: String },

    #[error("Failed to parse Jenkins response: {message}")]
    ParseFailure { message: String },
}

impl TransportError {
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            TransportError::Unreachable { .. } => TransportErrorKind::Unreachable,
            TransportError::ServerRejected { .. } => TransportErrorKind::ServerRejected,
            TransportError::ParseFailure { .. } => TransportErrorKind::ParseFailure,
        }
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        TransportError::Unreachable {
            message: message.into(),
        }
    }

    pub fn parse_failure(message: impl Into<String>) -> Self {
        TransportError::ParseFailure {
            message: message.into(),
        }
    }
}

impl WatchError for TransportError {
    fn error_code(&self) -> &'static str {
        match self {
            TransportError::Unreachable { .. } => "TRANSPORT_UNREACHABLE",
            TransportError::ServerRejected { .. } => "TRANSPORT_SERVER_REJECTED",
            TransportError::ParseFailure { .. } => "TRANSPORT_PARSE_FAILURE",
        }
    }

    fn is_user_error(&self) -> bool {
        // 401/403/404 mean the configured credentials or URL are wrong.
        matches!(
            self,
            TransportError::ServerRejected { status, .. } if matches!(status, 401 | 403 | 404)
        )
    }
}
