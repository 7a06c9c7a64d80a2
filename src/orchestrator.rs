//! Top-level control flow of a scheduled run
//!
//! One pass per invocation: classify, validate paths, back up, sweep.
//! Every fatal failure ends up at a single boundary that logs it, sends
//! exactly one alert and turns it into a nonzero exit code.

use std::path::PathBuf;

use uuid::Uuid;

use crate::backup::{retention, BackupEngine, BackupOutcome, BackupTier, SweepReport, ToolRunner};
use crate::clock::Clock;
use crate::config::Settings;
use crate::credentials::CredentialProvider;
use crate::error::{VaultError, VaultResult};
use crate::guard;
use crate::logging::Logger;
use crate::notify::{dispatch, FailureReport, Notifier};

/// Exit code of a successful run
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code of a run that hit a fatal failure
pub const EXIT_FAILURE: i32 = 1;

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// Backup succeeded; the sweep may still have reported problems
    Completed {
        backup: BackupOutcome,
        sweep: Option<SweepReport>,
    },
    /// A fatal failure stopped the run
    Failed(VaultError),
}

/// Result of one orchestrated run
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub tier: BackupTier,
    pub outcome: RunOutcome,
    /// Number of alerts handed to the notifier
    pub notifications: usize,
}

impl RunReport {
    /// Process exit status for this run
    pub fn exit_code(&self) -> i32 {
        match self.outcome {
            RunOutcome::Completed { .. } => EXIT_SUCCESS,
            RunOutcome::Failed(_) => EXIT_FAILURE,
        }
    }

    pub fn artifact(&self) -> Option<&PathBuf> {
        match &self.outcome {
            RunOutcome::Completed { backup, .. } => Some(&backup.artifact),
            RunOutcome::Failed(_) => None,
        }
    }
}

/// Sequences path guard, backup engine and retention sweep
pub struct Orchestrator<'a> {
    settings: &'a Settings,
    credentials: &'a dyn CredentialProvider,
    runner: &'a dyn ToolRunner,
    notifier: &'a dyn Notifier,
    clock: &'a dyn Clock,
    logger: &'a Logger,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        settings: &'a Settings,
        credentials: &'a dyn CredentialProvider,
        runner: &'a dyn ToolRunner,
        notifier: &'a dyn Notifier,
        clock: &'a dyn Clock,
        logger: &'a Logger,
    ) -> Self {
        Self {
            settings,
            credentials,
            runner,
            notifier,
            clock,
            logger,
        }
    }

    /// Perform one scheduled run
    pub fn run(&self) -> RunReport {
        let run_id = Uuid::new_v4();
        let tier = BackupTier::classify(self.clock.now());
        self.logger.info(format!(
            "Run {} started: {} backup of '{}'",
            run_id, tier, self.settings.database
        ));

        let mut notifications = 0;
        let outcome = match self.backup(tier) {
            Ok(backup) => {
                let sweep = self.cleanup(tier, &mut notifications);
                RunOutcome::Completed { backup, sweep }
            }
            Err(e) => {
                self.report_failure(tier, &e, &mut notifications);
                RunOutcome::Failed(e)
            }
        };

        let report = RunReport {
            run_id,
            tier,
            outcome,
            notifications,
        };
        self.logger.info(format!(
            "Run {} finished with exit code {}",
            run_id,
            report.exit_code()
        ));
        report
    }

    /// Validate both tier directories, then dump into the selected one
    fn backup(&self, tier: BackupTier) -> VaultResult<BackupOutcome> {
        for candidate in BackupTier::ALL {
            let dir = self.settings.tier_dir(candidate);
            guard::ensure(&dir).map_err(|e| VaultError::PathsUnavailable(e.to_string()))?;
        }
        self.logger.info("Backup directories validated");

        BackupEngine::new(
            self.settings,
            self.credentials,
            self.runner,
            self.clock,
            self.logger,
        )
        .run(&self.settings.tier_dir(tier), tier)
    }

    /// Sweep the selected tier; problems are reported, never fatal
    fn cleanup(&self, tier: BackupTier, notifications: &mut usize) -> Option<SweepReport> {
        let dir = self.settings.tier_dir(tier);
        let days = self.settings.retention.days_for(tier);

        match retention::sweep(&dir, &self.settings.artifact_prefix, days, self.clock.now(), self.logger) {
            Ok(report) => {
                if !report.is_clean() {
                    let detail = report
                        .failures
                        .iter()
                        .map(|(path, reason)| format!("{}: {}", path.display(), reason))
                        .collect::<Vec<_>>()
                        .join("\n");
                    let error = VaultError::Cleanup(format!(
                        "{} of {} expired backups could not be removed\n{}",
                        report.failures.len(),
                        report.failures.len() + report.removed_count(),
                        detail
                    ));
                    self.report_failure(tier, &error, notifications);
                }
                Some(report)
            }
            Err(e) => {
                self.report_failure(tier, &e, notifications);
                None
            }
        }
    }

    /// Log a failure at a level matching its severity and alert operators
    fn report_failure(&self, tier: BackupTier, error: &VaultError, notifications: &mut usize) {
        if error.is_fatal() {
            self.logger.error(format!("{} backup failed: {}", tier, error));
        } else {
            self.logger.warning(format!("{} backup completed with problems: {}", tier, error));
        }
        self.alert(FailureReport::from_error(tier, error), notifications);
    }

    fn alert(&self, report: FailureReport, notifications: &mut usize) {
        let subject = report.subject();
        let body = report.body(self.settings, self.clock.now());
        dispatch(self.notifier, self.logger, &subject, &body);
        *notifications += 1;
    }
}
