//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`
//! or `crate::cli`. Every port is synchronous: a cycle blocks on each call.

use std::path::Path;
use std::process::Output;

use anyhow::Result;

use crate::domain::{Notice, TagListing};

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Whole-file access to descriptors.
pub trait LocalFs {
    /// Returns `true` if `path` exists.
    fn exists(&self, path: &Path) -> bool;
    /// Read a whole file as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn read_to_string(&self, path: &Path) -> Result<String>;
    /// Replace the contents of `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn write(&self, path: &Path, content: &str) -> Result<()>;
}

// ── Registry Port ─────────────────────────────────────────────────────────────

/// Read access to a registry's paginated tag listing.
pub trait TagRegistry {
    /// Fetch one page of tags for `repository` (already qualified, e.g.
    /// `library/python`). `page` is `None` for the first page and the
    /// previous page's `next` URL afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failures, unexpected statuses, or a
    /// malformed body. A missing repository is not an error.
    fn fetch_tags(&self, repository: &str, page: Option<&str>) -> Result<TagListing>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
pub trait CommandRunner {
    /// Run `program` with `args` in `dir`, wait for it and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned. A non-zero exit is
    /// reported through the returned `Output`, not as an error.
    fn run(&self, dir: &Path, program: &str, args: &[&str]) -> Result<Output>;
}

// ── Notification Port ─────────────────────────────────────────────────────────

/// Fire-and-forget delivery of notices.
///
/// Implementations log their own delivery failures; nothing is returned to
/// the caller.
pub trait Notifier {
    fn deliver(&self, notice: &Notice);
}
