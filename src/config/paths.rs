//! Path management for pgvault
//!
//! Resolves the configuration directory holding settings, the encrypted
//! credential store and the master key file.
//!
//! ## Path Resolution Order
//!
//! 1. `PGVAULT_CONFIG_DIR` environment variable (if set)
//! 2. The platform configuration directory reported by `directories`

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::VaultError;

/// Environment variable overriding the configuration directory
pub const CONFIG_DIR_ENV: &str = "PGVAULT_CONFIG_DIR";

/// Manages all paths used by pgvault
#[derive(Debug, Clone)]
pub struct VaultPaths {
    /// Base directory for all pgvault configuration
    base_dir: PathBuf,
}

impl VaultPaths {
    /// Create a new VaultPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined and no
    /// override is set.
    pub fn new() -> Result<Self, VaultError> {
        let base_dir = if let Ok(custom) = std::env::var(CONFIG_DIR_ENV) {
            PathBuf::from(custom)
        } else {
            ProjectDirs::from("", "", "pgvault")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    VaultError::Config("Could not determine configuration directory".into())
                })?
        };

        Ok(Self { base_dir })
    }

    /// Create VaultPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the encrypted credential store
    pub fn credentials_file(&self) -> PathBuf {
        self.base_dir.join("credentials.json")
    }

    /// Get the path to the master key file
    pub fn master_key_file(&self) -> PathBuf {
        self.base_dir.join("master.key")
    }

    /// Ensure the configuration directory exists
    pub fn ensure_directories(&self) -> Result<(), VaultError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| VaultError::Io(format!("Failed to create config directory: {}", e)))
    }

    /// Check if pgvault has been configured (settings file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}
