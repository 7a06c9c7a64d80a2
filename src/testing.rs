//! Test doubles shared by unit tests

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use crate::backup::tools::{ToolInvocation, ToolOutput, ToolRunner};
use crate::clock::FixedClock;
use crate::config::Settings;
use crate::credentials::{Credential, CredentialProvider};
use crate::error::{VaultError, VaultResult};
use crate::logging::Logger;
use crate::notify::Notifier;

pub const TEST_PASSWORD: &str = "Tr0ub4dor&3-secret";

/// One recorded tool invocation
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl RecordedCall {
    pub fn is_verify(&self) -> bool {
        self.args.iter().any(|a| a == "--list")
    }
}

/// Tool runner that pretends to be pg_dump / pg_restore
pub struct FakeRunner {
    dump_exit: i32,
    verify_exit: i32,
    dump_stderr: String,
    spawn_fails: bool,
    calls: RefCell<Vec<RecordedCall>>,
}

impl FakeRunner {
    pub fn new(dump_exit: i32, verify_exit: i32) -> Self {
        Self {
            dump_exit,
            verify_exit,
            dump_stderr: String::new(),
            spawn_fails: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_dump_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.dump_stderr = stderr.into();
        self
    }

    pub fn failing_to_spawn(mut self) -> Self {
        self.spawn_fails = true;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    pub fn dump_calls(&self) -> usize {
        self.calls().iter().filter(|c| !c.is_verify()).count()
    }
}

impl ToolRunner for FakeRunner {
    fn run(&self, invocation: &ToolInvocation) -> VaultResult<ToolOutput> {
        let call = RecordedCall {
            program: invocation.program.clone(),
            args: invocation.args.clone(),
            env: invocation
                .secret_env
                .iter()
                .map(|(k, v)| (k.to_string(), v.as_str().to_string()))
                .collect(),
        };
        let is_verify = call.is_verify();
        self.calls.borrow_mut().push(call);

        if self.spawn_fails {
            return Err(VaultError::Tool("spawn failed".into()));
        }

        if is_verify {
            return Ok(ToolOutput {
                exit_code: Some(self.verify_exit),
                stderr: String::new(),
            });
        }

        if self.dump_exit == 0 {
            let file = invocation
                .args
                .iter()
                .position(|a| a == "--file")
                .and_then(|i| invocation.args.get(i + 1))
                .ok_or_else(|| VaultError::Tool("no --file argument".into()))?;
            std::fs::write(file, b"PGDMP fake archive")?;
        }

        Ok(ToolOutput {
            exit_code: Some(self.dump_exit),
            stderr: self.dump_stderr.clone(),
        })
    }
}

/// Credential provider answering from memory
pub struct StaticCredentials(pub Option<(&'static str, &'static str)>);

impl CredentialProvider for StaticCredentials {
    fn resolve(&self, _target: &str) -> VaultResult<Option<Credential>> {
        Ok(self.0.map(|(user, secret)| Credential::new(user, secret)))
    }
}

/// Notifier remembering every alert
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: RefCell<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn subjects(&self) -> Vec<String> {
        self.sent.borrow().iter().map(|(s, _)| s.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, subject: &str, body: &str) -> VaultResult<()> {
        self.sent
            .borrow_mut()
            .push((subject.to_string(), body.to_string()));
        Ok(())
    }
}

/// Notifier whose relay is always down
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn send(&self, _subject: &str, _body: &str) -> VaultResult<()> {
        Err(VaultError::Notification("relay down".into()))
    }
}

pub fn test_clock() -> FixedClock {
    FixedClock::at(2025, 1, 10, 12, 0, 0).unwrap()
}

pub fn test_logger(temp: &TempDir) -> Logger {
    Logger::new(temp.path().join("logs"), Arc::new(test_clock()))
}

/// Settings rooted in a temp directory with stand-in tool executables
pub fn test_settings(temp: &TempDir) -> Settings {
    let tools = temp.path().join("bin");
    std::fs::create_dir_all(&tools).unwrap();
    std::fs::write(tools.join("pg_dump"), "").unwrap();
    std::fs::write(tools.join("pg_restore"), "").unwrap();

    Settings {
        database: "ledger".into(),
        connect_user: "backup_role".into(),
        artifact_prefix: "ledger".into(),
        base_backup_path: temp.path().join("share"),
        log_dir: temp.path().join("logs"),
        recipient_addresses: vec!["ops@example.com".into()],
        dump_tool_path: Some(tools.join("pg_dump")),
        restore_tool_path: Some(tools.join("pg_restore")),
        ..Settings::default()
    }
}

/// Every line of every log file under the temp directory
pub fn all_log_text(temp: &TempDir) -> String {
    let dir = temp.path().join("logs");
    let mut text = String::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            text.push_str(&std::fs::read_to_string(entry.path()).unwrap_or_default());
        }
    }
    text
}
