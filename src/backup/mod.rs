//! Backup system for pgvault
//!
//! Produces one full logical dump per run, checks it can be listed, and
//! keeps each tier's directory within its retention period.
//!
//! # Architecture
//!
//! - `tier`: Daily/Monthly classification from the run's start time
//! - `artifact`: artifact naming and discovery
//! - `tools`: external process invocation (`pg_dump`, `pg_restore`)
//! - `engine`: `BackupEngine`, one dump plus verification
//! - `verify`: structural integrity check of an artifact
//! - `retention`: deletion of expired artifacts
//!
//! # Artifact Format
//!
//! `pg_dump` custom-format archives at maximum compression, named
//! `<prefix>_<YYYY_MM_DD_HHMMSS>_<7 digits>.backup`.
//!
//! # Example
//!
//! ```rust,ignore
//! use pgvault::backup::{BackupEngine, BackupTier, retention};
//!
//! let engine = BackupEngine::new(&settings, &store, &ProcessRunner, &clock, &logger);
//! let outcome = engine.run(&settings.tier_dir(BackupTier::Daily), BackupTier::Daily)?;
//! let report = retention::sweep(&dir, &settings.artifact_prefix, 30, clock.now(), &logger)?;
//! ```

pub mod artifact;
pub mod engine;
pub mod retention;
pub mod tier;
pub mod tools;
pub mod verify;

pub use artifact::{list_artifacts, BackupArtifact};
pub use engine::{BackupEngine, BackupOutcome};
pub use retention::{sweep, SweepReport};
pub use tier::BackupTier;
pub use tools::{ProcessRunner, ToolRunner};
