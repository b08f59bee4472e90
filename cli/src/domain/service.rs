//! Managed services, policy groups and the per-directory update cycle.

use std::fmt;
use std::path::PathBuf;

use regex::Regex;

use crate::domain::version::is_newer;

// ── Policy groups ─────────────────────────────────────────────────────────────

/// Lifecycle group a service is declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyGroup {
    /// Changes are patched and deployed immediately.
    AutoUpdate,
    /// Changes are detected and reported, never written.
    ManualUpdate,
}

impl PolicyGroup {
    /// Resolution order: auto-apply first so manual services can inherit.
    pub const ALL: [PolicyGroup; 2] = [PolicyGroup::AutoUpdate, PolicyGroup::ManualUpdate];

    /// Key of this group in the version-policy descriptor.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            PolicyGroup::AutoUpdate => "auto_update",
            PolicyGroup::ManualUpdate => "manual_update",
        }
    }
}

impl fmt::Display for PolicyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ── Service ───────────────────────────────────────────────────────────────────

/// One managed container image within a deployment directory.
#[derive(Debug, Clone)]
pub struct Service {
    pub name: String,
    /// Repository reference without tag, as written in the descriptor.
    pub image: String,
    /// Tags must match this pattern (unanchored) to be eligible.
    pub pattern: Regex,
    pub current_version: String,
    next_version: String,
    /// Build descriptor path for services built from source.
    pub build_path: Option<PathBuf>,
}

impl Service {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        image: impl Into<String>,
        pattern: Regex,
        current_version: impl Into<String>,
        build_path: Option<PathBuf>,
    ) -> Self {
        let current_version = current_version.into();
        Self {
            name: name.into(),
            image: image.into(),
            pattern,
            next_version: current_version.clone(),
            current_version,
            build_path,
        }
    }

    /// Best version found so far.
    #[must_use]
    pub fn next_version(&self) -> &str {
        &self.next_version
    }

    /// Consider `candidate` as the next version.
    ///
    /// Only a strictly newer version replaces the current best, so
    /// `next_version` never decreases and ties keep the first value seen.
    /// Returns `true` if the candidate was taken.
    pub fn offer(&mut self, candidate: &str) -> bool {
        if is_newer(candidate, &self.next_version) {
            self.next_version = candidate.to_string();
            true
        } else {
            false
        }
    }

    /// Restart resolution from `version`, as if it were the pinned one.
    pub fn rebase(&mut self, version: &str) {
        self.current_version = version.to_string();
        self.next_version = version.to_string();
    }

    /// Returns `true` if resolution found a newer version.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.current_version != self.next_version
    }

    /// Returns `true` if patches target the build descriptor.
    #[must_use]
    pub fn is_build_based(&self) -> bool {
        self.build_path.is_some()
    }
}

// ── Update cycle ──────────────────────────────────────────────────────────────

/// Services of one directory, partitioned by policy group.
///
/// Both groups exist from construction on; they are only ever empty, never
/// missing. Services keep their declaration order.
#[derive(Debug, Default)]
pub struct UpdateCycle {
    auto_update: Vec<Service>,
    manual_update: Vec<Service>,
}

impl UpdateCycle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, group: PolicyGroup, service: Service) {
        self.group_mut(group).push(service);
    }

    #[must_use]
    pub fn group(&self, group: PolicyGroup) -> &[Service] {
        match group {
            PolicyGroup::AutoUpdate => &self.auto_update,
            PolicyGroup::ManualUpdate => &self.manual_update,
        }
    }

    pub fn group_mut(&mut self, group: PolicyGroup) -> &mut Vec<Service> {
        match group {
            PolicyGroup::AutoUpdate => &mut self.auto_update,
            PolicyGroup::ManualUpdate => &mut self.manual_update,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.auto_update.is_empty() && self.manual_update.is_empty()
    }

    /// Resolved version of the auto-apply service called `name`.
    #[must_use]
    pub fn auto_version(&self, name: &str) -> Option<&str> {
        self.auto_update
            .iter()
            .find(|s| s.name == name)
            .map(Service::next_version)
    }

    /// Services of `group` whose resolution found a newer version.
    pub fn changed(&self, group: PolicyGroup) -> impl Iterator<Item = &Service> {
        self.group(group).iter().filter(|s| s.is_changed())
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        PolicyGroup::ALL
            .iter()
            .any(|g| self.changed(*g).next().is_some())
    }
}
