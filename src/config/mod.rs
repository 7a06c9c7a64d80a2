//! Configuration module for pgvault
//!
//! This module provides configuration management including:
//! - Config directory resolution
//! - Settings persistence
//! - Retention policy

pub mod paths;
pub mod settings;

pub use paths::VaultPaths;
pub use settings::{RetentionPolicy, Settings};
