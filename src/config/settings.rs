//! Settings for pgvault
//!
//! Connection parameters, storage locations, retention periods, alerting
//! and tool locations. Settings are loaded once at startup and passed by
//! reference to every component; nothing mutates them afterwards.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::VaultPaths;
use crate::backup::BackupTier;
use crate::error::VaultError;

/// Retention periods per backup tier, in days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Days a daily backup is kept
    pub daily_days: u32,
    /// Days a monthly backup is kept
    pub monthly_days: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            daily_days: 30,
            monthly_days: 365,
        }
    }
}

impl RetentionPolicy {
    /// Retention period for a tier
    pub fn days_for(&self, tier: BackupTier) -> u32 {
        match tier {
            BackupTier::Daily => self.daily_days,
            BackupTier::Monthly => self.monthly_days,
        }
    }
}

/// Settings for pgvault
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Database server host
    #[serde(default = "default_server_host")]
    pub server_host: String,

    /// Database server port
    #[serde(default = "default_server_port")]
    pub server_port: u16,

    /// Database to back up
    #[serde(default = "default_database")]
    pub database: String,

    /// Role the backup is expected to run as
    ///
    /// The username stored in the credential record is what is actually
    /// passed to the dump tool; a mismatch is logged as a warning.
    #[serde(default = "default_connect_user")]
    pub connect_user: String,

    /// Name of the credential record holding the database login
    #[serde(default = "default_credential_target")]
    pub credential_target: String,

    /// Prefix of generated artifact filenames
    #[serde(default = "default_artifact_prefix")]
    pub artifact_prefix: String,

    /// Root directory (possibly a network share) holding the tier directories
    #[serde(default = "default_base_backup_path")]
    pub base_backup_path: PathBuf,

    /// Directory name for daily backups under the root
    #[serde(default = "default_daily_dir_name")]
    pub daily_dir_name: String,

    /// Directory name for monthly backups under the root
    #[serde(default = "default_monthly_dir_name")]
    pub monthly_dir_name: String,

    /// Retention periods
    #[serde(default)]
    pub retention: RetentionPolicy,

    /// Directory holding the daily log files
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// SMTP relay host
    #[serde(default = "default_smtp_server")]
    pub smtp_server: String,

    /// SMTP relay port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Sender address of failure alerts
    #[serde(default = "default_sender_address")]
    pub sender_address: String,

    /// Operators receiving failure alerts
    #[serde(default)]
    pub recipient_addresses: Vec<String>,

    /// Explicit path to `pg_dump`; resolved from `PATH` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dump_tool_path: Option<PathBuf>,

    /// Explicit path to `pg_restore`; resolved from `PATH` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_tool_path: Option<PathBuf>,
}

fn default_schema_version() -> u32 {
    1
}

fn default_server_host() -> String {
    "localhost".to_string()
}

fn default_server_port() -> u16 {
    5432
}

fn default_database() -> String {
    "postgres".to_string()
}

fn default_connect_user() -> String {
    "postgres".to_string()
}

fn default_credential_target() -> String {
    "pgvault/postgres".to_string()
}

fn default_artifact_prefix() -> String {
    "postgres".to_string()
}

fn default_base_backup_path() -> PathBuf {
    PathBuf::from("/var/backups/pgvault")
}

fn default_daily_dir_name() -> String {
    "Daily".to_string()
}

fn default_monthly_dir_name() -> String {
    "Monthly".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/var/log/pgvault")
}

fn default_smtp_server() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    25
}

fn default_sender_address() -> String {
    "pgvault@localhost".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            server_host: default_server_host(),
            server_port: default_server_port(),
            database: default_database(),
            connect_user: default_connect_user(),
            credential_target: default_credential_target(),
            artifact_prefix: default_artifact_prefix(),
            base_backup_path: default_base_backup_path(),
            daily_dir_name: default_daily_dir_name(),
            monthly_dir_name: default_monthly_dir_name(),
            retention: RetentionPolicy::default(),
            log_dir: default_log_dir(),
            smtp_server: default_smtp_server(),
            smtp_port: default_smtp_port(),
            sender_address: default_sender_address(),
            recipient_addresses: Vec::new(),
            dump_tool_path: None,
            restore_tool_path: None,
        }
    }
}

impl Settings {
    /// Load settings from disk, failing if the file doesn't exist
    ///
    /// A scheduled run must never fall back to defaults silently.
    pub fn load(paths: &VaultPaths) -> Result<Self, VaultError> {
        let settings_path = paths.settings_file();

        if !settings_path.exists() {
            return Err(VaultError::Config(format!(
                "Settings file not found: {} (run 'pgvault config init')",
                settings_path.display()
            )));
        }

        let contents = std::fs::read_to_string(&settings_path)
            .map_err(|e| VaultError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| VaultError::Config(format!("Failed to parse settings file: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from disk, or return defaults if the file doesn't exist
    pub fn load_or_default(paths: &VaultPaths) -> Result<Self, VaultError> {
        if paths.settings_file().exists() {
            Self::load(paths)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &VaultPaths) -> Result<(), VaultError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| VaultError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| VaultError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject settings that can never produce a usable run
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.database.trim().is_empty() {
            return Err(VaultError::Config("database must not be empty".into()));
        }
        if self.credential_target.trim().is_empty() {
            return Err(VaultError::Config("credential_target must not be empty".into()));
        }
        if self.artifact_prefix.is_empty() || self.artifact_prefix.contains(&['/', '\\'][..]) {
            return Err(VaultError::Config(format!(
                "Invalid artifact_prefix: '{}'",
                self.artifact_prefix
            )));
        }
        if self.daily_dir_name == self.monthly_dir_name {
            return Err(VaultError::Config(
                "daily_dir_name and monthly_dir_name must differ".into(),
            ));
        }
        Ok(())
    }

    /// Storage directory of a tier
    pub fn tier_dir(&self, tier: BackupTier) -> PathBuf {
        match tier {
            BackupTier::Daily => self.base_backup_path.join(&self.daily_dir_name),
            BackupTier::Monthly => self.base_backup_path.join(&self.monthly_dir_name),
        }
    }
}
