//! Authentication-related error types.

use std::fmt;

/// Errors around the API key used for REST calls and the `auth` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No API key has been stored (user not logged in).
    NotAuthenticated,

    /// The server rejected the API key.
    Rejected { message: String },

    /// Credentials could not be loaded.
    CredentialsLoadFailed { message: String },

    /// Credentials could not be saved.
    CredentialsSaveFailed { message: String },
}

impl AuthError {
    /// Check if logging in again is the way out of this error.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, AuthError::NotAuthenticated | AuthError::Rejected { .. })
    }

    pub fn user_message(&self) -> String {
        match self {
            AuthError::NotAuthenticated => {
                "Not authenticated. Please login with your API key.".to_string()
            }
            AuthError::Rejected { .. } => {
                "The server rejected your API key. Please login again.".to_string()
            }
            AuthError::CredentialsLoadFailed { .. } => {
                "Could not load your credentials. Please login again.".to_string()
            }
            AuthError::CredentialsSaveFailed { .. } => {
                "Could not save your credentials. Please check file permissions.".to_string()
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::NotAuthenticated => "E_AUTH_NONE",
            AuthError::Rejected { .. } => "E_AUTH_REJECTED",
            AuthError::CredentialsLoadFailed { .. } => "E_AUTH_LOAD",
            AuthError::CredentialsSaveFailed { .. } => "E_AUTH_SAVE",
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::NotAuthenticated => write!(f, "Not authenticated"),
            AuthError::Rejected { message } => write!(f, "API key rejected: {}", message),
            AuthError::CredentialsLoadFailed { message } => {
                write!(f, "Failed to load credentials: {}", message)
            }
            AuthError::CredentialsSaveFailed { message } => {
                write!(f, "Failed to save credentials: {}", message)
            }
        }
    }
}

impl std::error::Error for AuthError {}
