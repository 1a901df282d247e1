//! File-based credentials provider adapter.
//!
//! Wraps [`CredentialsManager`] behind the [`CredentialsProvider`] trait.

use async_trait::async_trait;

use crate::auth::credentials::{Credentials, CredentialsManager};
use crate::traits::{CredentialsError, CredentialsProvider};

/// File-based credentials provider.
///
/// Credentials are stored in `~/.fomo/credentials.json` unless a custom
/// manager is supplied.
#[derive(Debug, Clone)]
pub struct FileCredentialsProvider {
    manager: CredentialsManager,
}

impl FileCredentialsProvider {
    /// Create a provider backed by the default credentials file.
    ///
    /// # Returns
    /// The provider, or an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, CredentialsError> {
        CredentialsManager::new()
            .map(Self::with_manager)
            .ok_or_else(|| {
                CredentialsError::Other("Failed to determine home directory".to_string())
            })
    }

    pub fn with_manager(manager: CredentialsManager) -> Self {
        Self { manager }
    }

    /// Get a reference to the underlying credentials manager.
    pub fn manager(&self) -> &CredentialsManager {
        &self.manager
    }

    /// Get the path to the credentials file.
    pub fn credentials_path(&self) -> &std::path::Path {
        self.manager.credentials_path()
    }
}

#[async_trait]
impl CredentialsProvider for FileCredentialsProvider {
    async fn load(&self) -> Result<Option<Credentials>, CredentialsError> {
        // The manager hands back defaults when the file is missing
        let creds = self.manager.load();
        if creds.api_key.is_none() {
            Ok(None)
        } else {
            Ok(Some(creds))
        }
    }

    async fn save(&self, creds: &Credentials) -> Result<(), CredentialsError> {
        if self.manager.save(creds) {
            Ok(())
        } else {
            Err(CredentialsError::SaveFailed(format!(
                "Failed to write {}",
                self.credentials_path().display()
            )))
        }
    }

    async fn clear(&self) -> Result<(), CredentialsError> {
        if self.manager.clear() {
            Ok(())
        } else {
            Err(CredentialsError::ClearFailed(format!(
                "Failed to delete {}",
                self.credentials_path().display()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_provider(dir: &TempDir) -> FileCredentialsProvider {
        FileCredentialsProvider::with_manager(CredentialsManager::with_path(
            dir.path().join("credentials.json"),
        ))
    }

    #[test]
    fn test_default_path_ends_with_credentials_json() {
        if let Ok(provider) = FileCredentialsProvider::new() {
            assert!(provider.credentials_path().ends_with(".fomo/credentials.json"));
        }
    }

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let provider = temp_provider(&dir);
        assert!(provider.load().await.unwrap().is_none());
        assert!(!provider.has_api_key().await);
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let dir = TempDir::new().unwrap();
        let provider = temp_provider(&dir);

        provider
            .save(&Credentials::with_api_key("fomo_key"))
            .await
            .unwrap();
        let loaded = provider.load().await.unwrap().unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("fomo_key"));
        assert!(provider.has_api_key().await);

        provider.clear().await.unwrap();
        assert!(provider.load().await.unwrap().is_none());
    }
}
