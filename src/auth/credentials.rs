//! Credentials storage and management for fomo.
//!
//! The API key is stored in `~/.fomo/credentials.json`.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The credentials directory name.
const CREDENTIALS_DIR: &str = ".fomo";

/// The credentials file name.
const CREDENTIALS_FILE: &str = "credentials.json";

/// Authentication credentials for the fomo platform.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Project API key, sent in the socket `auth` command and as a Bearer token.
    pub api_key: Option<String>,
}

impl Credentials {
    /// Create new empty credentials.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
        }
    }

    /// Check for a non-blank API key.
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Manages credential storage and retrieval.
#[derive(Debug, Clone)]
pub struct CredentialsManager {
    /// Path to the credentials file.
    credentials_path: PathBuf,
}

impl CredentialsManager {
    /// Create a manager for `~/.fomo/credentials.json`.
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn new() -> Option<Self> {
        let home = dirs::home_dir()?;
        Some(Self::with_path(home.join(CREDENTIALS_DIR).join(CREDENTIALS_FILE)))
    }

    /// Create a manager for an explicit file path.
    pub fn with_path(credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
        }
    }

    /// Get the path to the credentials file.
    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }

    /// Load credentials from the credentials file.
    ///
    /// Returns default credentials if the file doesn't exist or can't be read.
    pub fn load(&self) -> Credentials {
        if !self.credentials_path.exists() {
            return Credentials::default();
        }

        let file = match File::open(&self.credentials_path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Failed to open credentials file: {}", e);
                return Credentials::default();
            }
        };

        match serde_json::from_reader(BufReader::new(file)) {
            Ok(creds) => creds,
            Err(e) => {
                warn!("Ignoring unreadable credentials file: {}", e);
                Credentials::default()
            }
        }
    }

    /// Save credentials to the credentials file.
    ///
    /// Creates the parent directory if it doesn't exist.
    /// Returns `true` if successful, `false` otherwise.
    pub fn save(&self, credentials: &Credentials) -> bool {
        if let Some(parent) = self.credentials_path.parent() {
            if !parent.exists() && fs::create_dir_all(parent).is_err() {
                return false;
            }
        }

        let file = match File::create(&self.credentials_path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Failed to create credentials file: {}", e);
                return false;
            }
        };

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(&self.credentials_path, fs::Permissions::from_mode(0o600)) {
                debug!("Could not restrict credentials file permissions: {}", e);
            }
        }

        let mut writer = BufWriter::new(file);
        if serde_json::to_writer_pretty(&mut writer, credentials).is_err() {
            return false;
        }

        writer.flush().is_ok()
    }

    /// Clear all stored credentials.
    ///
    /// Returns `true` if successful or file didn't exist, `false` otherwise.
    pub fn clear(&self) -> bool {
        if !self.credentials_path.exists() {
            return true;
        }

        fs::remove_file(&self.credentials_path).is_ok()
    }
}
