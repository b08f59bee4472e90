//! Application service: write a resolved version back to disk.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! Both patches are whole-file read, single-line replace, whole-file write.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::LocalFs;
use crate::domain::Service;
use crate::domain::descriptor::COMPOSE_FILE;
use crate::domain::patch;

/// Whether a patch changed the target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Patched,
    /// No matching line was found, or it already named the version.
    Unchanged,
}

/// Apply `service.next_version()` to the descriptor the service is pinned in:
/// its build descriptor when it has one, otherwise the deployment descriptor
/// of `dir`.
///
/// # Errors
///
/// Returns an error if the target file cannot be read or written.
pub fn apply(fs: &impl LocalFs, dir: &Path, service: &Service) -> Result<PatchOutcome> {
    match &service.build_path {
        Some(build_path) => patch_build_file(fs, build_path, service),
        None => patch_compose_file(fs, &dir.join(COMPOSE_FILE), service),
    }
}

/// Rewrite the image line of `service` in the deployment descriptor at
/// `path`. Other services sharing the same image are left untouched.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written.
pub fn patch_compose_file(
    fs: &impl LocalFs,
    path: &Path,
    service: &Service,
) -> Result<PatchOutcome> {
    let text = fs
        .read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let patched = patch::patch_compose(&text, &service.name, service.next_version());
    write_if_changed(fs, path, &text, patched, service)
}

/// Rewrite the first `FROM` line of the build descriptor at `path` to
/// `service.image:next_version`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or written.
pub fn patch_build_file(fs: &impl LocalFs, path: &Path, service: &Service) -> Result<PatchOutcome> {
    let text = fs
        .read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let patched = patch::patch_build_file(&text, &service.image, service.next_version());
    write_if_changed(fs, path, &text, patched, service)
}

fn write_if_changed(
    fs: &impl LocalFs,
    path: &Path,
    original: &str,
    patched: Option<String>,
    service: &Service,
) -> Result<PatchOutcome> {
    let Some(patched) = patched else {
        tracing::warn!(
            service = %service.name,
            path = %path.display(),
            "no line to patch"
        );
        return Ok(PatchOutcome::Unchanged);
    };
    if patched == original {
        return Ok(PatchOutcome::Unchanged);
    }
    fs.write(path, &patched)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(
        service = %service.name,
        version = %service.next_version(),
        path = %path.display(),
        "patched"
    );
    Ok(PatchOutcome::Patched)
}
