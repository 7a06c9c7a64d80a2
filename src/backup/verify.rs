//! Integrity verification
//!
//! An artifact counts as intact when the restore tool can list its table of
//! contents. This is a structural check: it proves the archive parses, not
//! that a restore would reproduce the database.

use std::path::Path;

use super::tools::{ToolInvocation, ToolRunner};
use crate::logging::Logger;

/// Name of the restore tool looked up on the search path
pub const RESTORE_TOOL: &str = "pg_restore";

/// Check that `artifact` can be listed by the restore tool
pub fn verify(runner: &dyn ToolRunner, restore_tool: &Path, artifact: &Path, logger: &Logger) -> bool {
    let invocation = ToolInvocation::new(restore_tool)
        .arg("--list")
        .arg(artifact.display().to_string());

    match runner.run(&invocation) {
        Ok(output) if output.success() => {
            logger.info(format!("Integrity check passed: {}", artifact.display()));
            true
        }
        Ok(output) => {
            logger.error(format!(
                "Integrity check failed for {} (exit {:?}): {}",
                artifact.display(),
                output.exit_code,
                output.stderr
            ));
            false
        }
        Err(e) => {
            logger.error(format!("Integrity check could not run: {}", e));
            false
        }
    }
}
