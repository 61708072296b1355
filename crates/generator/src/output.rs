//! Filesystem helpers for a target's output directory

use sdkpack_common::{GeneratorError, Result};
use sdkpack_config::DeletionScope;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Remove everything the deletion scope allows under its root
///
/// Protected entries and their subtrees are left alone. Returns the number
/// of removed entries (directories count once).
pub fn purge(scope: &DeletionScope) -> Result<usize> {
    let root = scope.root();
    if !root.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    let mut entries = WalkDir::new(root).min_depth(1).into_iter();

    while let Some(entry) = entries.next() {
        let entry = entry.map_err(|e| GeneratorError::path(root, e.to_string()))?;
        let path = entry.path();
        let is_dir = entry.file_type().is_dir();

        if !scope.allows(path) {
            if is_dir && scope.is_protected(path) {
                entries.skip_current_dir();
            }
            continue;
        }

        if is_dir {
            fs::remove_dir_all(path)?;
            entries.skip_current_dir();
        } else {
            fs::remove_file(path)?;
        }
        removed += 1;
    }

    tracing::debug!(root = %root.display(), removed, "Purged output directory");
    Ok(removed)
}

/// Create `dir` and its parents if missing
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .map_err(|e| GeneratorError::path(dir, format!("cannot create directory: {}", e)))
}
