//! Failure alerts by email
//!
//! Alerts go to a fixed list of operators. There is no second-order
//! channel: if an alert cannot be sent, the failure is logged and the run
//! carries on with whatever exit status it already had.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{Message, SmtpTransport, Transport};

use crate::backup::BackupTier;
use crate::config::Settings;
use crate::error::{VaultError, VaultResult};
use crate::logging::Logger;

/// Sends an alert to the operator list
pub trait Notifier {
    fn send(&self, subject: &str, body: &str) -> VaultResult<()>;
}

/// Notifier relaying through a plain SMTP server
pub struct SmtpNotifier {
    server: String,
    port: u16,
    sender: String,
    recipients: Vec<String>,
}

impl SmtpNotifier {
    pub fn new(server: impl Into<String>, port: u16, sender: impl Into<String>, recipients: Vec<String>) -> Self {
        Self {
            server: server.into(),
            port,
            sender: sender.into(),
            recipients,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.smtp_server.clone(),
            settings.smtp_port,
            settings.sender_address.clone(),
            settings.recipient_addresses.clone(),
        )
    }

    fn build_message(&self, subject: &str, body: &str) -> VaultResult<Message> {
        if self.recipients.is_empty() {
            return Err(VaultError::Notification("No recipients configured".into()));
        }

        let from: Mailbox = self
            .sender
            .parse()
            .map_err(|e| VaultError::Notification(format!("Invalid sender address: {}", e)))?;

        let mut builder = Message::builder().from(from).subject(subject);
        for recipient in &self.recipients {
            let to: Mailbox = recipient.parse().map_err(|e| {
                VaultError::Notification(format!("Invalid recipient address '{}': {}", recipient, e))
            })?;
            builder = builder.to(to);
        }

        builder
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_owned())
            .map_err(|e| VaultError::Notification(format!("Failed to build email: {}", e)))
    }
}

impl Notifier for SmtpNotifier {
    fn send(&self, subject: &str, body: &str) -> VaultResult<()> {
        let message = self.build_message(subject, body)?;

        let mailer = SmtpTransport::builder_dangerous(&self.server)
            .port(self.port)
            .build();

        mailer
            .send(&message)
            .map_err(|e| VaultError::Notification(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

/// What went wrong, for which tier
#[derive(Debug, Clone)]
pub struct FailureReport {
    pub tier: BackupTier,
    pub class: String,
    pub detail: String,
}

impl FailureReport {
    /// Build a report from an error
    pub fn from_error(tier: BackupTier, error: &VaultError) -> Self {
        Self {
            tier,
            class: error.failure_class().to_string(),
            detail: error.to_string(),
        }
    }

    pub fn subject(&self) -> String {
        format!("Database Backup Failed - {} - {}", self.tier, self.class)
    }

    pub fn body(&self, settings: &Settings, when: chrono::NaiveDateTime) -> String {
        format!(
            "The {tier} backup of database '{db}' on {host}:{port} failed.\n\n\
             Time:    {when}\n\
             Failure: {class}\n\
             Detail:  {detail}\n\n\
             See the log directory {logs} for the full run log.\n",
            tier = self.tier,
            db = settings.database,
            host = settings.server_host,
            port = settings.server_port,
            when = when.format("%Y-%m-%d %H:%M:%S"),
            class = self.class,
            detail = self.detail,
            logs = settings.log_dir.display(),
        )
    }
}

/// Send an alert, logging instead of propagating any send failure
///
/// Returns whether the alert went out.
pub fn dispatch(notifier: &dyn Notifier, logger: &Logger, subject: &str, body: &str) -> bool {
    match notifier.send(subject, body) {
        Ok(()) => {
            logger.info(format!("Failure notification sent: {}", subject));
            true
        }
        Err(e) => {
            logger.error(format!("Could not send failure notification: {}", e));
            false
        }
    }
}
