//! Credential CLI commands
//!
//! Manages records in the encrypted credential store. Secrets are always
//! prompted for, never taken from the command line.

use clap::Subcommand;

use crate::config::VaultPaths;
use crate::credentials::CredentialStore;
use crate::crypto::SecureString;
use crate::error::{VaultError, VaultResult};

/// Credential store subcommands
#[derive(Subcommand)]
pub enum CredentialCommands {
    /// Store or replace the login for a target
    Set {
        /// Record name (matches `credential_target` in the settings)
        target: String,
        /// Database role
        #[arg(short, long)]
        username: String,
    },

    /// Delete the login for a target
    Remove {
        /// Record name
        target: String,
    },

    /// List stored targets (secrets are never shown)
    List,
}

/// Handle a credential command
pub fn handle_credential_command(paths: &VaultPaths, cmd: CredentialCommands) -> VaultResult<()> {
    let store = CredentialStore::from_paths(paths);

    match cmd {
        CredentialCommands::Set { target, username } => {
            let secret = prompt_secret(&format!("Password for {}@{}: ", username, target))?;
            let confirm = prompt_secret("Confirm password: ")?;
            if secret.as_str() != confirm.as_str() {
                return Err(VaultError::Config("Passwords do not match".into()));
            }

            store.set(&target, &username, &secret)?;
            println!("Stored credential '{}' for user '{}'", target, username);
        }
        CredentialCommands::Remove { target } => {
            if store.remove(&target)? {
                println!("Removed credential '{}'", target);
            } else {
                println!("No credential named '{}'", target);
            }
        }
        CredentialCommands::List => {
            let records = store.list()?;
            if records.is_empty() {
                println!("No credentials stored in {}", store.path().display());
            } else {
                for (target, username) in records {
                    println!("{}  (user: {})", target, username);
                }
            }
        }
    }

    Ok(())
}

fn prompt_secret(prompt: &str) -> VaultResult<SecureString> {
    rpassword::prompt_password(prompt)
        .map(SecureString::new)
        .map_err(|e| VaultError::Io(format!("Failed to read password: {}", e)))
}
