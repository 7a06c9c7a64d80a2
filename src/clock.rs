//! Time source for pgvault
//!
//! Tier classification, artifact naming, log file naming and retention ages
//! are all computed from local wall-clock time. Components receive a
//! `Clock` instead of reading the system time themselves.

use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

/// Source of the current local wall-clock time
pub trait Clock {
    /// Current local date and time
    fn now(&self) -> NaiveDateTime;
}

/// Clock backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock that always reports the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Build a fixed clock from calendar fields
    ///
    /// Returns `None` for an invalid date or time.
    pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_opt(hour, minute, second)
            .map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Convert a filesystem timestamp to local wall-clock time
pub fn to_local(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}
