//! Credentials provider trait abstraction.
//!
//! Provides a trait-based abstraction for API key storage and retrieval,
//! so the CLI can be exercised against an in-memory store in tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::Credentials;

/// Credentials operation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("Failed to load credentials: {0}")]
    LoadFailed(String),
    #[error("Failed to save credentials: {0}")]
    SaveFailed(String),
    #[error("Failed to clear credentials: {0}")]
    ClearFailed(String),
    #[error("Credentials not found")]
    NotFound,
    #[error("Credentials error: {0}")]
    Other(String),
}

/// Storage for the API key used to authenticate sockets and REST calls.
///
/// # Example
///
/// ```ignore
/// use fomo::traits::CredentialsProvider;
///
/// async fn api_key<P: CredentialsProvider>(provider: &P) -> Option<String> {
///     provider.load().await.ok().flatten().and_then(|c| c.api_key)
/// }
/// ```
#[async_trait]
pub trait CredentialsProvider: Send + Sync {
    /// Load stored credentials.
    ///
    /// # Returns
    /// - `Ok(Some(credentials))` if credentials exist
    /// - `Ok(None)` if nothing is stored
    /// - `Err(error)` if the store could not be read
    async fn load(&self) -> Result<Option<Credentials>, CredentialsError>;

    /// Persist credentials, replacing whatever was stored.
    async fn save(&self, credentials: &Credentials) -> Result<(), CredentialsError>;

    /// Remove stored credentials. Clearing an empty store succeeds.
    async fn clear(&self) -> Result<(), CredentialsError>;

    /// Whether a usable API key is stored.
    async fn has_api_key(&self) -> bool {
        matches!(self.load().await, Ok(Some(credentials)) if credentials.has_api_key())
    }
}

impl From<CredentialsError> for crate::error::AuthError {
    fn from(err: CredentialsError) -> Self {
        match err {
            CredentialsError::NotFound => crate::error::AuthError::NotAuthenticated,
            CredentialsError::SaveFailed(message) | CredentialsError::ClearFailed(message) => {
                crate::error::AuthError::CredentialsSaveFailed { message }
            }
            CredentialsError::LoadFailed(message) | CredentialsError::Other(message) => {
                crate::error::AuthError::CredentialsLoadFailed { message }
            }
        }
    }
}
