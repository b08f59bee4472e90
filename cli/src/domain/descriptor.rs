//! Schemas of the deployment and version-policy descriptors.
//!
//! Pure functions only: parsing takes text in and returns data out.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::domain::service::PolicyGroup;

// ── File names ────────────────────────────────────────────────────────────────

pub const COMPOSE_FILE: &str = "docker-compose.yml";
pub const POLICY_FILE: &str = "docker-compose-versions.yml";
pub const BUILD_FILE: &str = "Dockerfile";
pub const IGNORE_MARKER: &str = ".docker-compose-update-ignore";

// ── Deployment descriptor ─────────────────────────────────────────────────────

/// The parts of `docker-compose.yml` this tool reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposeFile {
    #[serde(default)]
    pub services: BTreeMap<String, Option<ComposeService>>,
}

/// One entry under `services:`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComposeService {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub build: Option<BuildSpec>,
}

/// `build: <path>` or `build: { context: <path>, dockerfile: <file> }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BuildSpec {
    Context(String),
    Detailed {
        #[serde(default)]
        context: Option<String>,
        #[serde(default)]
        dockerfile: Option<String>,
    },
}

impl BuildSpec {
    /// Path of the build descriptor, relative to the deployment directory `dir`.
    #[must_use]
    pub fn build_file(&self, dir: &Path) -> PathBuf {
        let (context, dockerfile) = match self {
            BuildSpec::Context(context) => (Some(context.as_str()), None),
            BuildSpec::Detailed {
                context,
                dockerfile,
            } => (context.as_deref(), dockerfile.as_deref()),
        };
        dir.join(context.unwrap_or("."))
            .join(dockerfile.unwrap_or(BUILD_FILE))
    }
}

// ── Version-policy descriptor ─────────────────────────────────────────────────

/// `docker-compose-versions.yml`: service → tag pattern, per group.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionPolicy {
    #[serde(default)]
    pub auto_update: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub manual_update: Option<BTreeMap<String, String>>,
}

impl VersionPolicy {
    /// Declared `(service, pattern)` pairs of `group`, sorted by service.
    pub fn entries(&self, group: PolicyGroup) -> impl Iterator<Item = (&str, &str)> {
        let map = match group {
            PolicyGroup::AutoUpdate => self.auto_update.as_ref(),
            PolicyGroup::ManualUpdate => self.manual_update.as_ref(),
        };
        map.into_iter()
            .flatten()
            .map(|(name, pattern)| (name.as_str(), pattern.as_str()))
    }
}

/// Parse YAML that may legitimately be empty.
///
/// Returns `Ok(None)` for an empty or null document.
///
/// # Errors
///
/// Returns the YAML error if the text is not a valid `T`.
pub fn parse_optional<T: DeserializeOwned>(text: &str) -> Result<Option<T>, serde_yaml::Error> {
    let blank = text
        .lines()
        .map(str::trim)
        .all(|l| l.is_empty() || l.starts_with('#') || l == "---");
    if blank {
        return Ok(None);
    }
    let value: serde_yaml::Value = serde_yaml::from_str(text)?;
    if value.is_null() {
        return Ok(None);
    }
    serde_yaml::from_value(value).map(Some)
}
