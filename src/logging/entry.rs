//! Log entry data structures
//!
//! Each entry is rendered as a single line:
//! `YYYY-MM-DD HH:MM:SS [LEVEL] message`.

use std::fmt;

use chrono::NaiveDateTime;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl LogLevel {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "INFO" => Some(LogLevel::Info),
            "WARNING" => Some(LogLevel::Warning),
            "ERROR" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// A single log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Local wall-clock time of the entry
    pub timestamp: NaiveDateTime,
    /// Severity
    pub level: LogLevel,
    /// Message text (newlines are flattened when rendered)
    pub message: String,
}

impl LogEntry {
    /// Create a new entry
    pub fn new(timestamp: NaiveDateTime, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp,
            level,
            message: message.into(),
        }
    }

    /// Parse a rendered log line back into an entry
    pub fn parse_line(line: &str) -> Option<Self> {
        // Timestamp is fixed width: "YYYY-MM-DD HH:MM:SS"
        let (stamp, rest) = (line.get(..19)?, line.get(20..)?);
        let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;

        let rest = rest.strip_prefix('[')?;
        let (level, message) = rest.split_once("] ")?;

        Some(Self {
            timestamp,
            level: LogLevel::parse(level)?,
            message: message.to_string(),
        })
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.level,
            self.message.replace(&['\r', '\n'][..], " ")
        )
    }
}
