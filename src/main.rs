use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pgvault::cli::{
    handle_config_command, handle_credential_command, handle_list_command, handle_verify_command,
    run_scheduled, ConfigCommands, CredentialCommands, TierArg,
};
use pgvault::config::{Settings, VaultPaths};
use pgvault::VaultError;

#[derive(Parser)]
#[command(
    name = "pgvault",
    author = "Kaylee Beyene",
    version,
    about = "Unattended scheduled PostgreSQL backups",
    long_about = "pgvault takes one compressed, verified backup of a PostgreSQL \
                  database per invocation, files it under a daily or monthly tier, \
                  prunes expired backups and emails operators when something fails. \
                  Run it from cron or a systemd timer."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Perform one scheduled backup run (default)
    Run,

    /// Check that an existing backup can be read by pg_restore
    Verify {
        /// Path to the backup artifact
        artifact: PathBuf,
    },

    /// List existing backups with age and size
    List {
        /// Only show one tier
        #[arg(short, long, value_enum)]
        tier: Option<TierArg>,
    },

    /// Credential store commands
    #[command(subcommand)]
    Credential(CredentialCommands),

    /// Configuration commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let paths = VaultPaths::new().map_err(startup_failure)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let settings = Settings::load(&paths).map_err(startup_failure)?;
            let code = run_scheduled(&paths, &settings);
            Ok(exit_code(code))
        }
        Commands::Verify { artifact } => {
            let settings = Settings::load_or_default(&paths)?;
            let code = handle_verify_command(&settings, &artifact)?;
            Ok(exit_code(code))
        }
        Commands::List { tier } => {
            let settings = Settings::load_or_default(&paths)?;
            handle_list_command(&settings, tier)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Credential(cmd) => {
            paths.ensure_directories()?;
            handle_credential_command(&paths, cmd)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config(cmd) => {
            paths.ensure_directories()?;
            handle_config_command(&paths, cmd)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Report a failure that happens before the log file and alerts are usable
fn startup_failure(error: VaultError) -> VaultError {
    tracing::error!("Run aborted ({}): {}", error.failure_class(), error);
    error
}

fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map(ExitCode::from).unwrap_or(ExitCode::FAILURE)
}
