//! Retention sweep
//!
//! Deletes artifacts older than a tier's retention period. Each deletion
//! stands alone: one file that cannot be removed does not stop the others.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};

use super::artifact::{created_at, parse_filename};
use crate::error::{VaultError, VaultResult};
use crate::logging::Logger;

/// What a sweep did
#[derive(Debug, Default, Clone)]
pub struct SweepReport {
    /// Artifacts deleted
    pub removed: Vec<PathBuf>,
    /// Artifacts that should have been deleted but could not be
    pub failures: Vec<(PathBuf, String)>,
}

impl SweepReport {
    pub fn removed_count(&self) -> usize {
        self.removed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Age of a file in whole days (truncated), for display
pub fn age_days(created: NaiveDateTime, now: NaiveDateTime) -> i64 {
    (now - created).num_days()
}

/// Whether an artifact created at `created` has outlived `retention_days`
///
/// Compares the full elapsed time: an artifact exactly `retention_days`
/// old is kept, one a second older is expired.
pub fn is_expired(created: NaiveDateTime, now: NaiveDateTime, retention_days: u32) -> bool {
    now - created > Duration::days(i64::from(retention_days))
}

/// Remove artifacts in `dir` older than `retention_days`
///
/// Only regular files matching the artifact pattern for `prefix` are
/// considered. An artifact exactly `retention_days` old is kept.
pub fn sweep(
    dir: &Path,
    prefix: &str,
    retention_days: u32,
    now: NaiveDateTime,
    logger: &Logger,
) -> VaultResult<SweepReport> {
    let entries = fs::read_dir(dir)
        .map_err(|e| VaultError::Cleanup(format!("Failed to list {}: {}", dir.display(), e)))?;

    let mut report = SweepReport::default();

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                logger.error(format!("Failed to read entry in {}: {}", dir.display(), e));
                report.failures.push((dir.to_path_buf(), e.to_string()));
                continue;
            }
        };

        let filename = entry.file_name().to_string_lossy().to_string();
        if parse_filename(prefix, &filename).is_none() {
            continue;
        }

        let path = entry.path();
        let metadata = match entry.metadata() {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => continue,
            Err(e) => {
                logger.error(format!("Failed to stat {}: {}", path.display(), e));
                report.failures.push((path, e.to_string()));
                continue;
            }
        };

        let created = match created_at(&metadata) {
            Ok(created) => created,
            Err(e) => {
                logger.error(format!("No creation time for {}: {}", path.display(), e));
                report.failures.push((path, e.to_string()));
                continue;
            }
        };

        if !is_expired(created, now, retention_days) {
            continue;
        }
        let age = age_days(created, now);

        match fs::remove_file(&path) {
            Ok(()) => {
                logger.info(format!("Removed expired backup ({} days old): {}", age, path.display()));
                report.removed.push(path);
            }
            Err(e) => {
                logger.error(format!("Failed to remove {}: {}", path.display(), e));
                report.failures.push((path, e.to_string()));
            }
        }
    }

    logger.info(format!(
        "Retention sweep of {} ({} days): {} removed, {} failed",
        dir.display(),
        retention_days,
        report.removed_count(),
        report.failures.len()
    ));

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{to_local, Clock, SystemClock};
    use crate::testing::test_logger;
    use std::fs::File;
    use std::time::{Duration as StdDuration, SystemTime, UNIX_EPOCH};
    use tempfile::TempDir;

    const DAY: u64 = 24 * 60 * 60;

    fn artifact_name(n: u32) -> String {
        format!("ledger_2024_01_01_000000_{:07}.backup", n)
    }

    /// Create a file whose modification time is `age` in the past
    fn create_aged(dir: &Path, name: &str, age: StdDuration) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
        path
    }

    #[test]
    fn test_age_days_truncates() {
        let now = SystemClock.now();
        assert_eq!(age_days(now - Duration::hours(30 * 24 + 23), now), 30);
        assert_eq!(age_days(now - Duration::days(31), now), 31);
        assert_eq!(age_days(now, now), 0);
    }

    #[test]
    fn test_empty_directory() {
        let temp = TempDir::new().unwrap();
        let logger = test_logger(&temp);
        let dir = temp.path().join("Daily");
        fs::create_dir(&dir).unwrap();

        let report = sweep(&dir, "ledger", 30, SystemClock.now(), &logger).unwrap();
        assert_eq!(report.removed_count(), 0);
        assert!(report.is_clean());
    }

    #[test]
    fn test_removes_only_expired() {
        let temp = TempDir::new().unwrap();
        let logger = test_logger(&temp);
        let dir = temp.path().join("Daily");
        fs::create_dir(&dir).unwrap();

        let fresh = create_aged(&dir, &artifact_name(1), StdDuration::from_secs(2 * DAY));
        let old = create_aged(&dir, &artifact_name(2), StdDuration::from_secs(45 * DAY));

        let report = sweep(&dir, "ledger", 30, SystemClock.now(), &logger).unwrap();
        assert_eq!(report.removed, vec![old.clone()]);
        assert!(fresh.exists());
        assert!(!old.exists());
    }

    #[test]
    fn test_is_expired_compares_full_duration() {
        let now = SystemClock.now();
        let retention = Duration::days(30);
        assert!(!is_expired(now - retention, now, 30));
        assert!(is_expired(now - retention - Duration::seconds(1), now, 30));
        assert!(is_expired(now - retention - Duration::hours(23), now, 30));
        assert!(!is_expired(now, now, 0));
    }

    #[test]
    fn test_boundary_age_is_retained() {
        let temp = TempDir::new().unwrap();
        let logger = test_logger(&temp);
        let dir = temp.path().join("Daily");
        fs::create_dir(&dir).unwrap();

        // Whole-second base so filesystem timestamp precision cannot shift it
        let secs = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        let base = UNIX_EPOCH + StdDuration::from_secs(secs) - StdDuration::from_secs(30 * DAY);

        let exact = dir.join(artifact_name(1));
        File::create(&exact).unwrap().set_modified(base).unwrap();
        let over = dir.join(artifact_name(2));
        File::create(&over)
            .unwrap()
            .set_modified(base - StdDuration::from_secs(1))
            .unwrap();

        let now = to_local(base) + Duration::days(30);

        let report = sweep(&dir, "ledger", 30, now, &logger).unwrap();
        assert_eq!(report.removed, vec![over.clone()]);
        assert!(exact.exists());
        assert!(!over.exists());
    }

    #[test]
    fn test_expired_within_last_day_is_removed() {
        let temp = TempDir::new().unwrap();
        let logger = test_logger(&temp);
        let dir = temp.path().join("Daily");
        fs::create_dir(&dir).unwrap();

        let stale = create_aged(&dir, &artifact_name(1), StdDuration::from_secs(30 * DAY + 23 * 3600));

        let report = sweep(&dir, "ledger", 30, SystemClock.now(), &logger).unwrap();
        assert_eq!(report.removed_count(), 1);
        assert!(!stale.exists());
    }

    #[test]
    fn test_non_matching_files_never_touched() {
        let temp = TempDir::new().unwrap();
        let logger = test_logger(&temp);
        let dir = temp.path().join("Daily");
        fs::create_dir(&dir).unwrap();

        let ancient = StdDuration::from_secs(1000 * DAY);
        let names = [
            "notes.txt",
            "ledger_manual_copy.backup",
            "other_2024_01_01_000000_0000001.backup",
            "ledger_2024_01_01_000000_0000001.backup.partial",
        ];
        for name in names {
            create_aged(&dir, name, ancient);
        }

        let report = sweep(&dir, "ledger", 1, SystemClock.now(), &logger).unwrap();
        assert_eq!(report.removed_count(), 0);
        for name in names {
            assert!(dir.join(name).exists(), "{} was removed", name);
        }
    }

    #[test]
    fn test_directories_named_like_artifacts_are_skipped() {
        let temp = TempDir::new().unwrap();
        let logger = test_logger(&temp);
        let dir = temp.path().join("Daily");
        fs::create_dir_all(dir.join(artifact_name(9))).unwrap();

        let report = sweep(&dir, "ledger", 0, SystemClock.now() + Duration::days(5), &logger).unwrap();
        assert_eq!(report.removed_count(), 0);
        assert!(dir.join(artifact_name(9)).is_dir());
    }

    #[test]
    fn test_missing_directory_is_cleanup_error() {
        let temp = TempDir::new().unwrap();
        let logger = test_logger(&temp);

        let err = sweep(&temp.path().join("gone"), "ledger", 30, SystemClock.now(), &logger).unwrap_err();
        assert!(matches!(err, VaultError::Cleanup(_)));
    }
}
