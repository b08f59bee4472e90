//! Directory discovery for recursive runs.

use std::path::{Path, PathBuf};

use anyhow::Result;
use walkdir::WalkDir;

use crate::domain::descriptor::{IGNORE_MARKER, POLICY_FILE};

/// Find every deployment directory under `root`.
///
/// A directory holding a version policy is yielded and not descended
/// further. A directory holding the ignore marker is skipped with its whole
/// subtree. Symlinked directories are not followed; unreadable ones are
/// skipped with a warning. The result is sorted.
///
/// # Errors
///
/// Returns an error if `root` is not a directory.
pub fn discover(root: &Path) -> Result<Vec<PathBuf>> {
    anyhow::ensure!(root.is_dir(), "{} is not a directory", root.display());

    let mut found = Vec::new();
    let mut walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable path");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let dir = entry.path();
        if dir.join(IGNORE_MARKER).exists() {
            tracing::debug!(dir = %dir.display(), "ignore marker found, skipping subtree");
            walker.skip_current_dir();
            continue;
        }
        if dir.join(POLICY_FILE).is_file() {
            tracing::info!(dir = %dir.display(), "found {POLICY_FILE}");
            found.push(dir.to_path_buf());
            walker.skip_current_dir();
        }
    }

    found.sort();
    Ok(found)
}
