//! Configuration CLI commands

use clap::Subcommand;

use crate::config::{Settings, VaultPaths};
use crate::error::VaultResult;

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Write a settings file with default values
    Init {
        /// Overwrite an existing settings file
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a config command
pub fn handle_config_command(paths: &VaultPaths, cmd: ConfigCommands) -> VaultResult<()> {
    match cmd {
        ConfigCommands::Show => {
            let settings = Settings::load_or_default(paths)?;
            print!("{}", format_settings(paths, &settings));
        }
        ConfigCommands::Init { force } => {
            if paths.is_initialized() && !force {
                println!(
                    "Settings already exist at {} (use --force to overwrite)",
                    paths.settings_file().display()
                );
                return Ok(());
            }
            Settings::default().save(paths)?;
            println!("Wrote default settings to {}", paths.settings_file().display());
        }
    }

    Ok(())
}

/// Render settings for display
pub fn format_settings(paths: &VaultPaths, settings: &Settings) -> String {
    let tool = |path: &Option<std::path::PathBuf>, name: &str| match path {
        Some(path) => path.display().to_string(),
        None => format!("{} (from PATH)", name),
    };

    let mut output = String::new();
    output.push_str("pgvault Configuration\n");
    output.push_str("=====================\n");
    output.push_str(&format!("Config directory: {}\n", paths.base_dir().display()));
    output.push_str(&format!("Settings file:    {}\n", paths.settings_file().display()));
    output.push('\n');
    output.push_str(&format!(
        "Database:         {} on {}:{} as {}\n",
        settings.database, settings.server_host, settings.server_port, settings.connect_user
    ));
    output.push_str(&format!("Credential:       {}\n", settings.credential_target));
    output.push_str(&format!("Backup root:      {}\n", settings.base_backup_path.display()));
    output.push_str(&format!(
        "Retention:        daily {} days, monthly {} days\n",
        settings.retention.daily_days, settings.retention.monthly_days
    ));
    output.push_str(&format!("Log directory:    {}\n", settings.log_dir.display()));
    output.push_str(&format!(
        "Alerts:           {}:{} from {} to {}\n",
        settings.smtp_server,
        settings.smtp_port,
        settings.sender_address,
        if settings.recipient_addresses.is_empty() {
            "(nobody)".to_string()
        } else {
            settings.recipient_addresses.join(", ")
        }
    ));
    output.push_str(&format!("Dump tool:        {}\n", tool(&settings.dump_tool_path, "pg_dump")));
    output.push_str(&format!("Restore tool:     {}\n", tool(&settings.restore_tool_path, "pg_restore")));
    output
}
