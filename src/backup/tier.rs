//! Backup tier classification

use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Days of the month on which the midnight run is a monthly backup
pub const MONTHLY_DAYS: [u32; 2] = [1, 15];

/// Hour of the day of the monthly slot
pub const MONTHLY_HOUR: u32 = 0;

/// Retention tier of a backup run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupTier {
    Daily,
    Monthly,
}

impl BackupTier {
    /// Both tiers, daily first
    pub const ALL: [BackupTier; 2] = [BackupTier::Daily, BackupTier::Monthly];

    /// Classify a run from its start time
    ///
    /// Monthly iff the day is the 1st or 15th and the hour is 0; any other
    /// time, including other hours of those days, is Daily.
    pub fn classify(now: NaiveDateTime) -> Self {
        if MONTHLY_DAYS.contains(&now.day()) && now.hour() == MONTHLY_HOUR {
            BackupTier::Monthly
        } else {
            BackupTier::Daily
        }
    }
}

impl fmt::Display for BackupTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupTier::Daily => write!(f, "Daily"),
            BackupTier::Monthly => write!(f, "Monthly"),
        }
    }
}
