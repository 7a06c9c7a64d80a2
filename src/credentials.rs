//! Credential provider backed by an encrypted store
//!
//! Records are keyed by target name and hold a username plus a secret
//! sealed with AES-256-GCM. The master passphrase comes from the
//! `PGVAULT_MASTER_KEY` environment variable or, if that is unset, from
//! the `master.key` file in the config directory.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::VaultPaths;
use crate::crypto::{derive_master_key, open, seal, KdfParams, MasterKey, SealedSecret, SecureString};
use crate::error::{VaultError, VaultResult};

/// Environment variable holding the master passphrase
pub const MASTER_KEY_ENV: &str = "PGVAULT_MASTER_KEY";

/// A database login resolved for one run
///
/// The secret is wiped from memory when the credential is dropped.
pub struct Credential {
    /// Database role
    pub username: String,
    /// Password
    pub secret: SecureString,
}

impl Credential {
    /// Create a new credential
    pub fn new(username: impl Into<String>, secret: impl Into<SecureString>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("secret", &self.secret)
            .finish()
    }
}

/// Resolves a named secret to a credential
pub trait CredentialProvider {
    /// Look up a target
    ///
    /// `Ok(None)` means no record exists; callers treat that as a failed
    /// precondition. Errors are reserved for an unreadable store.
    fn resolve(&self, target: &str) -> VaultResult<Option<Credential>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialRecord {
    username: String,
    secret: SealedSecret,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    kdf: KdfParams,
    #[serde(default)]
    records: BTreeMap<String, CredentialRecord>,
}

/// Encrypted credential store on disk
pub struct CredentialStore {
    path: PathBuf,
    passphrase: Option<SecureString>,
    key_file: Option<PathBuf>,
}

impl CredentialStore {
    /// Store at an explicit location with an explicit passphrase
    pub fn new(path: PathBuf, passphrase: Option<SecureString>) -> Self {
        Self {
            path,
            passphrase,
            key_file: None,
        }
    }

    /// Store in the config directory, passphrase from env or key file
    ///
    /// The key file is only read when a secret actually has to be sealed
    /// or opened, so problems with it surface as resolve errors.
    pub fn from_paths(paths: &VaultPaths) -> Self {
        let passphrase = std::env::var(MASTER_KEY_ENV)
            .ok()
            .filter(|value| !value.is_empty())
            .map(SecureString::new);
        Self {
            path: paths.credentials_file(),
            passphrase,
            key_file: Some(paths.master_key_file()),
        }
    }

    /// Path of the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add or replace a record
    pub fn set(&self, target: &str, username: &str, secret: &SecureString) -> VaultResult<()> {
        if target.trim().is_empty() {
            return Err(VaultError::Config("Credential target must not be empty".into()));
        }

        let mut store = match self.load()? {
            Some(store) => store,
            None => StoreFile {
                kdf: KdfParams::generate(),
                records: BTreeMap::new(),
            },
        };

        let key = self.master_key(&store.kdf)?;
        let record = CredentialRecord {
            username: username.to_string(),
            secret: seal(secret.as_str(), &key)?,
        };
        store.records.insert(target.to_string(), record);

        self.write(&store)
    }

    /// Remove a record, returning whether it existed
    pub fn remove(&self, target: &str) -> VaultResult<bool> {
        let Some(mut store) = self.load()? else {
            return Ok(false);
        };
        let existed = store.records.remove(target).is_some();
        if existed {
            self.write(&store)?;
        }
        Ok(existed)
    }

    /// List target names with their usernames
    pub fn list(&self) -> VaultResult<Vec<(String, String)>> {
        Ok(self
            .load()?
            .map(|store| {
                store
                    .records
                    .into_iter()
                    .map(|(target, record)| (target, record.username))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn master_key(&self, params: &KdfParams) -> VaultResult<MasterKey> {
        let from_file = match (&self.passphrase, &self.key_file) {
            (None, Some(key_file)) => read_key_file(key_file)?,
            _ => None,
        };
        let passphrase = self.passphrase.as_ref().or(from_file.as_ref()).ok_or_else(|| {
            VaultError::Encryption(format!(
                "No master passphrase: set {} or create a master.key file",
                MASTER_KEY_ENV
            ))
        })?;
        derive_master_key(passphrase.as_str(), params)
    }

    fn load(&self) -> VaultResult<Option<StoreFile>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .map_err(|e| VaultError::Io(format!("Failed to read credential store: {}", e)))?;

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| VaultError::Json(format!("Failed to parse credential store: {}", e)))
    }

    fn write(&self, store: &StoreFile) -> VaultResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(store)?;

        // Write to temp, then rename so a crash never leaves a torn store
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, json)
            .map_err(|e| VaultError::Io(format!("Failed to write credential store: {}", e)))?;
        restrict_permissions(&temp_path)?;
        fs::rename(&temp_path, &self.path)
            .map_err(|e| VaultError::Io(format!("Failed to replace credential store: {}", e)))?;

        Ok(())
    }
}

impl CredentialProvider for CredentialStore {
    fn resolve(&self, target: &str) -> VaultResult<Option<Credential>> {
        let Some(store) = self.load()? else {
            return Ok(None);
        };
        let Some(record) = store.records.get(target) else {
            return Ok(None);
        };

        let key = self.master_key(&store.kdf)?;
        let secret = open(&record.secret, &key)?;

        Ok(Some(Credential {
            username: record.username.clone(),
            secret,
        }))
    }
}

fn read_key_file(path: &Path) -> VaultResult<Option<SecureString>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| VaultError::Io(format!("Failed to read master key file: {}", e)))?;
    let secret = SecureString::new(contents.trim_end_matches(&['\r', '\n'][..]));
    Ok((!secret.is_empty()).then_some(secret))
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> VaultResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
        .map_err(|e| VaultError::Io(format!("Failed to restrict store permissions: {}", e)))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> VaultResult<()> {
    Ok(())
}
