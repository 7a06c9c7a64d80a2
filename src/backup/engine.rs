//! Backup engine
//!
//! Drives a single dump: names the artifact, resolves the login, runs the
//! dump tool with the password in the child's environment, and verifies
//! the result. A dump that cannot be listed afterwards is a failed dump.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::artifact::generate_filename;
use super::tier::BackupTier;
use super::tools::{resolve_tool, ToolInvocation, ToolOutput, ToolRunner, PASSWORD_ENV};
use super::verify::{verify, RESTORE_TOOL};
use crate::clock::Clock;
use crate::config::Settings;
use crate::credentials::{Credential, CredentialProvider};
use crate::error::{VaultError, VaultResult};
use crate::logging::Logger;

/// Name of the dump tool looked up on the search path
pub const DUMP_TOOL: &str = "pg_dump";

/// Maximum compression level of the custom archive format
const COMPRESSION_LEVEL: u8 = 9;

const REDACTED: &str = "[REDACTED]";

/// A completed, verified backup
#[derive(Debug, Clone)]
pub struct BackupOutcome {
    /// Path of the new artifact
    pub artifact: PathBuf,
    /// Wall-clock duration of dump plus verification
    pub elapsed: Duration,
}

/// Runs one dump operation
pub struct BackupEngine<'a> {
    settings: &'a Settings,
    credentials: &'a dyn CredentialProvider,
    runner: &'a dyn ToolRunner,
    clock: &'a dyn Clock,
    logger: &'a Logger,
}

impl<'a> BackupEngine<'a> {
    pub fn new(
        settings: &'a Settings,
        credentials: &'a dyn CredentialProvider,
        runner: &'a dyn ToolRunner,
        clock: &'a dyn Clock,
        logger: &'a Logger,
    ) -> Self {
        Self {
            settings,
            credentials,
            runner,
            clock,
            logger,
        }
    }

    /// Dump the database into `target_dir` and verify the artifact
    pub fn run(&self, target_dir: &Path, tier: BackupTier) -> VaultResult<BackupOutcome> {
        let started = Instant::now();
        let artifact = target_dir.join(generate_filename(
            &self.settings.artifact_prefix,
            self.clock.now(),
        ));

        self.logger.info(format!(
            "Starting {} backup of '{}' on {}:{} to {}",
            tier,
            self.settings.database,
            self.settings.server_host,
            self.settings.server_port,
            artifact.display()
        ));

        let credential = self
            .credentials
            .resolve(&self.settings.credential_target)?
            .ok_or_else(|| VaultError::NoCredentials(self.settings.credential_target.clone()))?;

        if credential.username != self.settings.connect_user {
            self.logger.warning(format!(
                "Credential '{}' is for user '{}', expected '{}'",
                self.settings.credential_target, credential.username, self.settings.connect_user
            ));
        }

        let dump_tool = resolve_tool(self.settings.dump_tool_path.as_deref(), DUMP_TOOL)?;
        let output = self.dump(&dump_tool, &artifact, credential)?;

        if !output.success() {
            self.logger.error(format!(
                "{} exited with {:?}: {}",
                DUMP_TOOL, output.exit_code, output.stderr
            ));
            return Err(VaultError::DumpFailed {
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }
        self.logger.info(format!("Dump finished: {}", artifact.display()));

        let restore_tool = resolve_tool(self.settings.restore_tool_path.as_deref(), RESTORE_TOOL)?;
        if !verify(self.runner, &restore_tool, &artifact, self.logger) {
            // Left in place for manual inspection
            return Err(VaultError::IntegrityCheckFailed { artifact });
        }

        let elapsed = started.elapsed();
        let size = std::fs::metadata(&artifact).map(|m| m.len()).unwrap_or(0);
        self.logger.info(format!(
            "Backup completed in {:.1}s ({} bytes): {}",
            elapsed.as_secs_f64(),
            size,
            artifact.display()
        ));

        Ok(BackupOutcome { artifact, elapsed })
    }

    /// Run the dump tool, consuming the credential
    ///
    /// The secret lives only in the invocation, which is dropped (and the
    /// secret wiped) before this returns, whatever the outcome.
    fn dump(&self, tool: &Path, artifact: &Path, credential: Credential) -> VaultResult<ToolOutput> {
        let Credential { username, secret } = credential;
        let scrub = secret.clone();

        let invocation = ToolInvocation::new(tool)
            .arg("--host")
            .arg(self.settings.server_host.clone())
            .arg("--port")
            .arg(self.settings.server_port.to_string())
            .arg("--username")
            .arg(username)
            .arg("--dbname")
            .arg(self.settings.database.clone())
            .arg("--format=custom")
            .arg(format!("--compress={}", COMPRESSION_LEVEL))
            .arg("--no-password")
            .arg("--file")
            .arg(artifact.display().to_string())
            .secret_env(PASSWORD_ENV, secret);

        self.logger.info(format!("Running: {}", invocation.display_command()));
        let result = self.runner.run(&invocation);
        drop(invocation);

        result.map(|mut output| {
            if !scrub.is_empty() {
                output.stderr = output.stderr.replace(scrub.as_str(), REDACTED);
            }
            output
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        all_log_text, test_clock, test_logger, test_settings, FakeRunner, StaticCredentials,
        TEST_PASSWORD,
    };
    use tempfile::TempDir;

    const LOGIN: Option<(&str, &str)> = Some(("backup_role", TEST_PASSWORD));

    fn run_engine(
        temp: &TempDir,
        runner: &FakeRunner,
        credentials: &StaticCredentials,
    ) -> VaultResult<BackupOutcome> {
        let settings = test_settings(temp);
        let logger = test_logger(temp);
        let clock = test_clock();
        let dir = settings.tier_dir(BackupTier::Daily);
        std::fs::create_dir_all(&dir).unwrap();

        BackupEngine::new(&settings, credentials, runner, &clock, &logger).run(&dir, BackupTier::Daily)
    }

    #[test]
    fn test_successful_backup() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::new(0, 0);

        let outcome = run_engine(&temp, &runner, &StaticCredentials(LOGIN)).unwrap();
        assert!(outcome.artifact.exists());
        assert!(outcome
            .artifact
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("ledger_2025_01_10_120000_"));

        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert!(!calls[0].is_verify());
        assert!(calls[1].is_verify());
    }

    #[test]
    fn test_dump_arguments() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::new(0, 0);
        run_engine(&temp, &runner, &StaticCredentials(LOGIN)).unwrap();

        let dump = &runner.calls()[0];
        for expected in ["--host", "localhost", "--username", "backup_role", "--dbname", "ledger", "--format=custom", "--compress=9", "--no-password", "--file"] {
            assert!(dump.args.iter().any(|a| a == expected), "missing {}", expected);
        }
        assert!(!dump.args.iter().any(|a| a.contains(TEST_PASSWORD)));
        assert_eq!(
            dump.env,
            vec![(PASSWORD_ENV.to_string(), TEST_PASSWORD.to_string())]
        );
    }

    #[test]
    fn test_absent_credentials_spawn_nothing() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::new(0, 0);

        let err = run_engine(&temp, &runner, &StaticCredentials(None)).unwrap_err();
        assert!(matches!(err, VaultError::NoCredentials(_)));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_dump_failure_skips_verification() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::new(1, 0);

        let err = run_engine(&temp, &runner, &StaticCredentials(LOGIN)).unwrap_err();
        assert!(matches!(err, VaultError::DumpFailed { exit_code: Some(1), .. }));
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_integrity_failure_keeps_artifact() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::new(0, 1);

        let err = run_engine(&temp, &runner, &StaticCredentials(LOGIN)).unwrap_err();
        match err {
            VaultError::IntegrityCheckFailed { artifact } => assert!(artifact.exists()),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_secret_never_logged() {
        let temp = TempDir::new().unwrap();

        // Success path
        let runner = FakeRunner::new(0, 0);
        run_engine(&temp, &runner, &StaticCredentials(LOGIN)).unwrap();

        // Failure path with a tool echoing the password back
        let runner = FakeRunner::new(2, 0)
            .with_dump_stderr(format!("auth failed for password {}", TEST_PASSWORD));
        let err = run_engine(&temp, &runner, &StaticCredentials(LOGIN)).unwrap_err();
        assert!(!err.to_string().contains(TEST_PASSWORD));
        assert!(err.to_string().contains(REDACTED));

        let log = all_log_text(&temp);
        assert!(!log.is_empty());
        assert!(!log.contains(TEST_PASSWORD));
    }

    #[test]
    fn test_spawn_failure_is_tool_error() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::new(0, 0).failing_to_spawn();

        let err = run_engine(&temp, &runner, &StaticCredentials(LOGIN)).unwrap_err();
        assert!(matches!(err, VaultError::Tool(_)));
    }

    #[test]
    fn test_user_mismatch_warns() {
        let temp = TempDir::new().unwrap();
        let runner = FakeRunner::new(0, 0);
        run_engine(&temp, &runner, &StaticCredentials(Some(("someone_else", "pw")))).unwrap();

        assert!(all_log_text(&temp).contains("[WARNING] Credential"));
    }
}
