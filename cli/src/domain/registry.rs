//! Tag-listing wire types and platform matching.
//!
//! Mirrors the paginated Docker Hub `v2/repositories/<repo>/tags` response.
//! Unknown fields are ignored.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Platform used when no override is configured.
pub const DEFAULT_PLATFORM: &str = "amd64";

const KNOWN_OS: &[&str] = &["linux", "windows", "darwin", "freebsd"];

/// One page of a tag listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagPage {
    /// Absolute URL of the next page, if any.
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default, rename = "results")]
    pub tags: Vec<RegistryTag>,
}

/// A published tag and its per-platform images.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryTag {
    pub name: String,
    #[serde(default)]
    pub images: Vec<PlatformImage>,
}

/// One per-architecture build of a tag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformImage {
    #[serde(default)]
    pub architecture: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub variant: Option<String>,
}

/// Result of fetching one page.
#[derive(Debug, Clone)]
pub enum TagListing {
    Page(TagPage),
    RepositoryNotFound,
}

impl RegistryTag {
    /// Returns `true` if any image of this tag targets `platform`.
    #[must_use]
    pub fn supports(&self, platform: &Platform) -> bool {
        self.images.iter().any(|image| platform.matches(image))
    }
}

// ── Platform ──────────────────────────────────────────────────────────────────

/// Target platform: `arch`, `arch/variant` or `os/arch[/variant]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: Option<String>,
    pub architecture: String,
    pub variant: Option<String>,
}

impl Platform {
    /// Returns `true` if `image` was built for this platform.
    ///
    /// OS and variant are only compared when this platform names them.
    #[must_use]
    pub fn matches(&self, image: &PlatformImage) -> bool {
        if image.architecture.as_deref() != Some(self.architecture.as_str()) {
            return false;
        }
        if let Some(os) = &self.os
            && image.os.as_deref() != Some(os.as_str())
        {
            return false;
        }
        if let Some(variant) = &self.variant
            && image.variant.as_deref() != Some(variant.as_str())
        {
            return false;
        }
        true
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self {
            os: None,
            architecture: DEFAULT_PLATFORM.to_string(),
            variant: None,
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(format!("invalid platform '{s}'"));
        }
        let (os, rest) = match parts.split_first() {
            Some((first, rest)) if KNOWN_OS.contains(first) && !rest.is_empty() => {
                (Some((*first).to_string()), rest)
            }
            _ => (None, parts.as_slice()),
        };
        match rest {
            [arch] => Ok(Self {
                os,
                architecture: (*arch).to_string(),
                variant: None,
            }),
            [arch, variant] => Ok(Self {
                os,
                architecture: (*arch).to_string(),
                variant: Some((*variant).to_string()),
            }),
            _ => Err(format!("invalid platform '{s}'")),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(os) = &self.os {
            write!(f, "{os}/")?;
        }
        f.write_str(&self.architecture)?;
        if let Some(variant) = &self.variant {
            write!(f, "/{variant}")?;
        }
        Ok(())
    }
}
