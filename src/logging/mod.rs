//! Logging for pgvault
//!
//! Every run appends to a per-day log file and mirrors to the console.
//!
//! # Architecture
//!
//! - `LogEntry`: timestamp, level and message, rendered as one text line.
//! - `Logger`: owns the log file lifecycle. Files are named
//!   `pgvault_<YYYY-MM-DD>.log`; once a file reaches the size threshold it
//!   is renamed to `pgvault_<YYYY-MM-DD>_<HHMMSS>.old.log` before the next
//!   line is written.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use pgvault::clock::SystemClock;
//! use pgvault::logging::Logger;
//!
//! let logger = Logger::new(&settings.log_dir, Arc::new(SystemClock));
//! logger.info("Backup started");
//! ```

mod entry;
mod logger;

pub use entry::{LogEntry, LogLevel};
pub use logger::{read_entries, Logger, DEFAULT_MAX_LOG_BYTES};
