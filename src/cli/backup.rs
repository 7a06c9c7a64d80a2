//! Backup CLI commands
//!
//! The scheduled run itself, plus manual verification and listing of
//! existing artifacts.

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDateTime;
use clap::ValueEnum;

use crate::backup::retention::{age_days, is_expired};
use crate::backup::tools::resolve_tool;
use crate::backup::verify::{verify, RESTORE_TOOL};
use crate::backup::{list_artifacts, BackupArtifact, BackupTier, ProcessRunner};
use crate::clock::{Clock, SystemClock};
use crate::config::{Settings, VaultPaths};
use crate::credentials::CredentialStore;
use crate::error::VaultResult;
use crate::logging::Logger;
use crate::notify::SmtpNotifier;
use crate::orchestrator::{Orchestrator, RunOutcome, EXIT_FAILURE, EXIT_SUCCESS};

/// Tier selector for the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TierArg {
    Daily,
    Monthly,
}

impl From<TierArg> for BackupTier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::Daily => BackupTier::Daily,
            TierArg::Monthly => BackupTier::Monthly,
        }
    }
}

/// Perform one scheduled run and return the process exit code
pub fn run_scheduled(paths: &VaultPaths, settings: &Settings) -> i32 {
    let clock = SystemClock;
    let logger = Logger::new(&settings.log_dir, Arc::new(clock));
    let store = CredentialStore::from_paths(paths);
    let notifier = SmtpNotifier::from_settings(settings);

    let report = Orchestrator::new(settings, &store, &ProcessRunner, &notifier, &clock, &logger).run();

    match &report.outcome {
        RunOutcome::Completed { backup, sweep } => {
            println!("{} backup created: {}", report.tier, backup.artifact.display());
            if let Some(sweep) = sweep {
                println!("Expired backups removed: {}", sweep.removed_count());
            }
        }
        RunOutcome::Failed(e) => eprintln!("{} backup failed: {}", report.tier, e),
    }

    report.exit_code()
}

/// Check an existing artifact with the restore tool
pub fn handle_verify_command(settings: &Settings, artifact: &Path) -> VaultResult<i32> {
    let clock = SystemClock;
    let logger = Logger::new(&settings.log_dir, Arc::new(clock));
    let restore_tool = resolve_tool(settings.restore_tool_path.as_deref(), RESTORE_TOOL)?;

    if verify(&ProcessRunner, &restore_tool, artifact, &logger) {
        println!("OK: {}", artifact.display());
        Ok(EXIT_SUCCESS)
    } else {
        println!("FAILED: {}", artifact.display());
        Ok(EXIT_FAILURE)
    }
}

/// List artifacts of one or both tiers
pub fn handle_list_command(settings: &Settings, tier: Option<TierArg>) -> VaultResult<()> {
    let tiers: Vec<BackupTier> = match tier {
        Some(tier) => vec![tier.into()],
        None => BackupTier::ALL.to_vec(),
    };
    let now = SystemClock.now();

    for tier in tiers {
        let dir = settings.tier_dir(tier);
        let retention = settings.retention.days_for(tier);
        println!("{} backups in {} (retention {} days)", tier, dir.display(), retention);

        if !dir.exists() {
            println!("  (directory does not exist)");
            println!();
            continue;
        }

        let artifacts = list_artifacts(&dir, &settings.artifact_prefix, tier)?;
        print!("{}", format_artifact_list(&artifacts, now, retention));
        println!();
    }

    Ok(())
}

/// Format artifacts as a table with age, size and expiry status
pub fn format_artifact_list(artifacts: &[BackupArtifact], now: NaiveDateTime, retention_days: u32) -> String {
    if artifacts.is_empty() {
        return "  No backups found.\n".to_string();
    }

    let name_width = artifacts
        .iter()
        .map(|a| a.filename().len())
        .max()
        .unwrap_or(4)
        .max(4);

    let mut output = String::new();
    output.push_str(&format!(
        "  {:<name_width$}  {:>6}  {:>12}  {}\n",
        "Name",
        "Age",
        "Size",
        "Status",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "  {:-<name_width$}  {:->6}  {:->12}  {:-<7}\n",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for artifact in artifacts {
        let (age, status) = match artifact.created_at() {
            Ok(created) => {
                let status = if is_expired(created, now, retention_days) { "expired" } else { "" };
                (format!("{}d", age_days(created, now)), status)
            }
            Err(_) => ("?".to_string(), "unknown"),
        };

        output.push_str(&format!(
            "  {:<name_width$}  {:>6}  {:>12}  {}\n",
            artifact.filename(),
            age,
            format_size(artifact.size_bytes()),
            status,
            name_width = name_width,
        ));
    }

    output
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
