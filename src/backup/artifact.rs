//! Artifact naming
//!
//! Artifacts are named `<prefix>_<YYYY_MM_DD_HHMMSS>_<7 digits>.backup`.
//! The timestamp plus a random 7-digit suffix keeps names unique for runs
//! that are serialized by the scheduler.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use rand::Rng;

use super::BackupTier;
use crate::clock::to_local;

/// File extension of backup artifacts
pub const ARTIFACT_EXTENSION: &str = "backup";

const TIMESTAMP_FORMAT: &str = "%Y_%m_%d_%H%M%S";
const TIMESTAMP_LEN: usize = 17;
const RANDOM_DIGITS: usize = 7;
const RANDOM_MAX: u32 = 9_999_999;

/// A backup file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArtifact {
    /// Full path of the file
    pub path: PathBuf,
    /// Timestamp encoded in the filename
    pub stamped_at: NaiveDateTime,
    /// Tier, inferred from the containing directory
    pub tier: BackupTier,
}

impl BackupArtifact {
    /// Filename component of the path
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Creation time as reported by the filesystem
    ///
    /// Uses the earlier of birth time and modification time, since not every
    /// filesystem (or network share) reports birth time.
    pub fn created_at(&self) -> std::io::Result<NaiveDateTime> {
        created_at(&fs::metadata(&self.path)?)
    }

    /// Size in bytes
    pub fn size_bytes(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }
}

/// Generate a new artifact filename
pub fn generate_filename(prefix: &str, now: NaiveDateTime) -> String {
    let suffix = rand::thread_rng().gen_range(0..=RANDOM_MAX);
    format_filename(prefix, now, suffix)
}

fn format_filename(prefix: &str, now: NaiveDateTime, suffix: u32) -> String {
    format!(
        "{}_{}_{:0width$}.{}",
        prefix,
        now.format(TIMESTAMP_FORMAT),
        suffix,
        ARTIFACT_EXTENSION,
        width = RANDOM_DIGITS
    )
}

/// Parse the timestamp from a filename if it matches the artifact pattern
///
/// Returns `None` for anything that is not exactly
/// `<prefix>_<YYYY_MM_DD_HHMMSS>_<7 digits>.backup`.
pub fn parse_filename(prefix: &str, filename: &str) -> Option<NaiveDateTime> {
    let rest = filename
        .strip_prefix(prefix)?
        .strip_prefix('_')?
        .strip_suffix(ARTIFACT_EXTENSION)?
        .strip_suffix('.')?;

    let (stamp, digits) = (rest.get(..TIMESTAMP_LEN)?, rest.get(TIMESTAMP_LEN..)?);
    let digits = digits.strip_prefix('_')?;
    if digits.len() != RANDOM_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()
}

/// List the artifacts in a tier directory
///
/// Files not matching the artifact pattern are ignored. Sorted newest first.
pub fn list_artifacts(dir: &Path, prefix: &str, tier: BackupTier) -> std::io::Result<Vec<BackupArtifact>> {
    let mut artifacts = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let filename = entry.file_name().to_string_lossy().to_string();
        if let Some(stamped_at) = parse_filename(prefix, &filename) {
            artifacts.push(BackupArtifact {
                path: entry.path(),
                stamped_at,
                tier,
            });
        }
    }

    artifacts.sort_by(|a, b| b.stamped_at.cmp(&a.stamped_at));
    Ok(artifacts)
}

/// Creation time of a file from its metadata
pub fn created_at(metadata: &fs::Metadata) -> std::io::Result<NaiveDateTime> {
    let modified = metadata.modified()?;
    let earliest = match metadata.created() {
        Ok(created) => created.min(modified),
        Err(_) => modified,
    };
    Ok(to_local(earliest))
}
