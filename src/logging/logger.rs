//! Rotating file logger
//!
//! Writes one log file per calendar day and mirrors every entry to the
//! console through `tracing`. Each write opens the file in append mode and
//! flushes immediately, so a crash loses at most the line being written.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDateTime;

use super::entry::{LogEntry, LogLevel};
use crate::clock::Clock;
use crate::error::{VaultError, VaultResult};

/// Size at which the day's log file is rotated (100 MiB)
pub const DEFAULT_MAX_LOG_BYTES: u64 = 100 * 1024 * 1024;

const LOG_PREFIX: &str = "pgvault";

/// Append-only log sink with size-based rotation
pub struct Logger {
    log_dir: PathBuf,
    clock: Arc<dyn Clock + Send + Sync>,
    max_bytes: u64,
}

impl Logger {
    /// Create a logger writing into `log_dir`
    pub fn new(log_dir: impl Into<PathBuf>, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            log_dir: log_dir.into(),
            clock,
            max_bytes: DEFAULT_MAX_LOG_BYTES,
        }
    }

    /// Override the rotation threshold
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Directory holding the log files
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Path of the log file for the current day
    pub fn current_file(&self) -> PathBuf {
        self.file_for(self.clock.now())
    }

    fn file_for(&self, now: NaiveDateTime) -> PathBuf {
        self.log_dir
            .join(format!("{}_{}.log", LOG_PREFIX, now.format("%Y-%m-%d")))
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    /// Record an entry in the file and on the console
    ///
    /// A failing log file never aborts the caller; the failure is reported
    /// on the console instead.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::new(self.clock.now(), level, message);

        match entry.level {
            LogLevel::Info => tracing::info!("{}", entry.message),
            LogLevel::Warning => tracing::warn!("{}", entry.message),
            LogLevel::Error => tracing::error!("{}", entry.message),
        }

        if let Err(e) = self.append(&entry) {
            tracing::error!("Failed to write log file: {}", e);
        }
    }

    /// Append an entry to the day's file, rotating first if it is full
    pub fn append(&self, entry: &LogEntry) -> VaultResult<()> {
        fs::create_dir_all(&self.log_dir)
            .map_err(|e| VaultError::Io(format!("Failed to create log directory: {}", e)))?;

        let path = self.file_for(entry.timestamp);
        self.rotate_if_full(&path, entry.timestamp)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| VaultError::Io(format!("Failed to open log file: {}", e)))?;

        writeln!(file, "{}", entry)
            .map_err(|e| VaultError::Io(format!("Failed to write log entry: {}", e)))?;

        file.flush()
            .map_err(|e| VaultError::Io(format!("Failed to flush log file: {}", e)))?;

        Ok(())
    }

    fn rotate_if_full(&self, path: &Path, now: NaiveDateTime) -> VaultResult<Option<PathBuf>> {
        let size = match fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(_) => return Ok(None),
        };
        if size < self.max_bytes {
            return Ok(None);
        }

        let stem = format!(
            "{}_{}_{}",
            LOG_PREFIX,
            now.format("%Y-%m-%d"),
            now.format("%H%M%S")
        );
        let mut rotated = self.log_dir.join(format!("{}.old.log", stem));
        let mut counter = 1;
        while rotated.exists() {
            rotated = self.log_dir.join(format!("{}-{}.old.log", stem, counter));
            counter += 1;
        }

        fs::rename(path, &rotated)
            .map_err(|e| VaultError::Io(format!("Failed to rotate log file: {}", e)))?;

        Ok(Some(rotated))
    }

    /// Read all entries of the current day's file
    pub fn read_current(&self) -> VaultResult<Vec<LogEntry>> {
        read_entries(&self.current_file())
    }
}

/// Read all parseable entries from a log file
///
/// Returns entries in chronological order (oldest first).
pub fn read_entries(path: &Path) -> VaultResult<Vec<LogEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)
        .map_err(|e| VaultError::Io(format!("Failed to open log file: {}", e)))?;

    let mut entries = Vec::new();
    for (line_num, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| {
            VaultError::Io(format!("Failed to read log line {}: {}", line_num + 1, e))
        })?;
        if let Some(entry) = LogEntry::parse_line(&line) {
            entries.push(entry);
        }
    }

    Ok(entries)
}
