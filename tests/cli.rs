use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn pgvault(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pgvault").unwrap();
    cmd.env("PGVAULT_CONFIG_DIR", config_dir)
        .env_remove("PGVAULT_MASTER_KEY")
        .env("RUST_LOG", "info");
    cmd
}

fn write_settings(temp: &TempDir) {
    let config = temp.path().join("config");
    fs::create_dir_all(&config).unwrap();
    let settings = serde_json::json!({
        "database": "ledger",
        "artifact_prefix": "ledger",
        "credential_target": "pgvault/ledger",
        "base_backup_path": temp.path().join("share"),
        "log_dir": temp.path().join("logs"),
        "smtp_server": "127.0.0.1",
        "smtp_port": 1,
        "recipient_addresses": []
    });
    fs::write(config.join("config.json"), settings.to_string()).unwrap();
}

fn log_text(temp: &TempDir) -> String {
    let mut text = String::new();
    for entry in fs::read_dir(temp.path().join("logs")).unwrap() {
        text.push_str(&fs::read_to_string(entry.unwrap().path()).unwrap());
    }
    text
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    pgvault(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("credential"));
}

#[test]
fn test_run_without_settings_fails() {
    let temp = TempDir::new().unwrap();
    pgvault(&temp.path().join("missing"))
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Run aborted (ConfigError)"));
}

#[test]
fn test_run_without_credentials_fails_and_logs() {
    let temp = TempDir::new().unwrap();
    write_settings(&temp);

    pgvault(&temp.path().join("config"))
        .arg("run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("backup failed"));

    let log = log_text(&temp);
    assert!(log.contains("[ERROR]"));
    assert!(log.contains("No credentials found for target 'pgvault/ledger'"));
    assert!(temp.path().join("share").join("Daily").is_dir());
    assert!(temp.path().join("share").join("Monthly").is_dir());
}

#[test]
fn test_default_command_is_run() {
    let temp = TempDir::new().unwrap();
    write_settings(&temp);

    pgvault(&temp.path().join("config")).assert().code(1);
    assert!(log_text(&temp).contains("No credentials"));
}

#[test]
fn test_config_init_then_show() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config");

    pgvault(&config)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default settings"));
    assert!(config.join("config.json").exists());

    pgvault(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("daily 30 days, monthly 365 days"));
}

#[test]
fn test_list_empty_tiers() {
    let temp = TempDir::new().unwrap();
    write_settings(&temp);
    fs::create_dir_all(temp.path().join("share").join("Daily")).unwrap();

    pgvault(&temp.path().join("config"))
        .args(["list", "--tier", "daily"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No backups found"));
}

#[test]
fn test_credential_list_empty() {
    let temp = TempDir::new().unwrap();
    pgvault(&temp.path().join("config"))
        .args(["credential", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No credentials stored"));
}
