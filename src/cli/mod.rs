//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the backup pipeline.

pub mod backup;
pub mod config;
pub mod credential;

pub use backup::{handle_list_command, handle_verify_command, run_scheduled, TierArg};
pub use config::{handle_config_command, ConfigCommands};
pub use credential::{handle_credential_command, CredentialCommands};
