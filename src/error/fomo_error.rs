//! Unified error type for the fomo client.

use std::fmt;

use super::auth::AuthError;
use super::category::ErrorCategory;
use super::network::NetworkError;
use super::protocol::ProtocolError;

/// Unified error type consolidating the domain-specific errors.
#[derive(Debug)]
pub enum FomoError {
    Network(NetworkError),
    Auth(AuthError),
    Protocol(ProtocolError),
    /// Filesystem/OS errors.
    Io(std::io::Error),
    /// Invalid configuration or arguments.
    Configuration { message: String },
}

impl FomoError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FomoError::Network(NetworkError::Api { status, .. }) => match *status {
                401 | 403 => ErrorCategory::Auth,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::User,
            },
            FomoError::Network(NetworkError::InvalidResponse { .. }) => ErrorCategory::Protocol,
            FomoError::Network(_) => ErrorCategory::Network,
            FomoError::Auth(_) => ErrorCategory::Auth,
            FomoError::Protocol(ProtocolError::Server { .. }) => ErrorCategory::Server,
            FomoError::Protocol(_) => ErrorCategory::Protocol,
            FomoError::Io(_) => ErrorCategory::System,
            FomoError::Configuration { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            FomoError::Network(err) => err.is_retryable(),
            _ => self.category().is_retryable(),
        }
    }

    pub fn requires_reauth(&self) -> bool {
        match self {
            FomoError::Auth(err) => err.requires_reauth(),
            FomoError::Network(NetworkError::Api { status: 401, .. }) => true,
            _ => false,
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            FomoError::Network(err) => err.user_message(),
            FomoError::Auth(err) => err.user_message(),
            FomoError::Protocol(err) => err.user_message(),
            FomoError::Io(err) => format!("System error: {}", err),
            FomoError::Configuration { message } => format!("Configuration error: {}", message),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            FomoError::Network(err) => err.error_code(),
            FomoError::Auth(err) => err.error_code(),
            FomoError::Protocol(err) => err.error_code(),
            FomoError::Io(_) => "E_SYS_IO",
            FomoError::Configuration { .. } => "E_CONFIG",
        }
    }

    pub fn recovery_hint(&self) -> &'static str {
        self.category().recovery_hint()
    }
}

impl fmt::Display for FomoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FomoError::Network(err) => write!(f, "{}", err),
            FomoError::Auth(err) => write!(f, "{}", err),
            FomoError::Protocol(err) => write!(f, "{}", err),
            FomoError::Io(err) => write!(f, "IO error: {}", err),
            FomoError::Configuration { message } => write!(f, "Configuration error: {}", message),
        }
    }
}

impl std::error::Error for FomoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FomoError::Network(err) => Some(err),
            FomoError::Auth(err) => Some(err),
            FomoError::Protocol(err) => Some(err),
            FomoError::Io(err) => Some(err),
            FomoError::Configuration { .. } => None,
        }
    }
}

impl From<NetworkError> for FomoError {
    fn from(err: NetworkError) -> Self {
        FomoError::Network(err)
    }
}

impl From<AuthError> for FomoError {
    fn from(err: AuthError) -> Self {
        FomoError::Auth(err)
    }
}

impl From<ProtocolError> for FomoError {
    fn from(err: ProtocolError) -> Self {
        FomoError::Protocol(err)
    }
}

impl From<std::io::Error> for FomoError {
    fn from(err: std::io::Error) -> Self {
        FomoError::Io(err)
    }
}

impl From<serde_json::Error> for FomoError {
    fn from(err: serde_json::Error) -> Self {
        FomoError::Network(NetworkError::InvalidResponse {
            message: err.to_string(),
        })
    }
}

impl From<reqwest::Error> for FomoError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        FomoError::Network(super::network::classify_reqwest_error(&err, &url))
    }
}
