//! pgvault - Unattended scheduled PostgreSQL backups
//!
//! Each invocation performs one pass: it classifies the run as a daily or
//! monthly backup from the local wall clock, dumps the database with
//! `pg_dump`, checks the artifact with `pg_restore --list`, then removes
//! artifacts of the same tier that have outlived their retention window.
//! Fatal failures are logged and reported to operators by email.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `clock`: Injectable local wall clock
//! - `logging`: Daily rotating log file
//! - `crypto` / `credentials`: Encrypted credential store
//! - `guard`: Destination directory checks
//! - `backup`: Tiering, dump, verification and retention
//! - `notify`: Email alerts
//! - `orchestrator`: One scheduled run end to end
//! - `cli`: Command handlers for the `pgvault` binary
//!
//! # Example
//!
//! ```rust,ignore
//! use pgvault::config::{Settings, VaultPaths};
//!
//! let paths = VaultPaths::new()?;
//! let settings = Settings::load(&paths)?;
//! let exit_code = pgvault::cli::run_scheduled(&paths, &settings);
//! ```

pub mod backup;
pub mod cli;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod crypto;
pub mod error;
pub mod guard;
pub mod logging;
pub mod notify;
pub mod orchestrator;

#[cfg(test)]
mod testing;

pub use error::VaultError;
