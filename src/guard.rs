//! Path guard
//!
//! Makes sure a backup directory exists and accepts writes before anything
//! is dumped into it. Backup roots are often network shares, so a
//! directory that exists can still refuse writes.

use std::fs::{self, OpenOptions};
use std::path::Path;

use crate::error::{VaultError, VaultResult};

const PROBE_FILE: &str = ".pgvault-write-probe";

/// Ensure `path` is an existing, writable directory
///
/// Creates missing directories (including parents). Calling it again on a
/// valid directory changes nothing.
pub fn ensure(path: &Path) -> VaultResult<()> {
    if path.exists() && !path.is_dir() {
        return Err(VaultError::path(path, "exists but is not a directory"));
    }

    fs::create_dir_all(path).map_err(|e| VaultError::path(path, e))?;

    let probe = path.join(PROBE_FILE);
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&probe)
        .map_err(|e| VaultError::path(path, format!("not writable: {}", e)))?;
    fs::remove_file(&probe).map_err(|e| VaultError::path(path, format!("probe cleanup failed: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_missing_directory_with_parents() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("share").join("Daily");

        ensure(&target).unwrap();
        assert!(target.is_dir());
        assert!(!target.join(PROBE_FILE).exists());
    }

    #[test]
    fn test_idempotent() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("Monthly");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.backup"), "data").unwrap();

        ensure(&target).unwrap();
        ensure(&target).unwrap();
        assert!(target.join("keep.backup").exists());
    }

    #[test]
    fn test_file_in_the_way_fails() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("Daily");
        fs::write(&target, "not a directory").unwrap();

        let err = ensure(&target).unwrap_err();
        assert!(matches!(err, VaultError::Path { .. }));
    }

    #[test]
    fn test_uncreatable_parent_fails() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, "file").unwrap();

        let err = ensure(&blocker.join("Daily")).unwrap_err();
        assert!(err.to_string().contains("Daily"));
    }
}
