//! Entry-point presence check.

use std::path::{Path, PathBuf};

use weblaunch_core::error::LaunchError;

/// Check that `entry_point` names a regular file. Relative paths are resolved
/// against `working_dir`. Returns the resolved path.
pub fn verify_entry_point(working_dir: &Path, entry_point: &Path) -> Result<PathBuf, LaunchError> {
    let resolved = if entry_point.is_absolute() {
        entry_point.to_path_buf()
    } else {
        working_dir.join(entry_point)
    };

    if resolved.is_file() {
        Ok(resolved)
    } else {
        tracing::debug!(path = %resolved.display(), "entry point missing");
        Err(LaunchError::EntryPointMissing {
            path: entry_point.to_path_buf(),
        })
    }
}
