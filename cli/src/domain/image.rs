//! Image reference parsing (`repository[:tag][@digest]`).

use crate::domain::version::LATEST_TAG;

/// Namespace Docker Hub uses for official images.
pub const DEFAULT_NAMESPACE: &str = "library";

const DOCKER_HUB_HOSTS: &[&str] = &["docker.io/", "index.docker.io/", "registry-1.docker.io/"];

/// A parsed image reference. The digest, if any, is discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub repository: String,
    pub tag: Option<String>,
}

impl ImageRef {
    /// Split a reference at the last `:` that follows the last `/`.
    ///
    /// `registry:5000/app` therefore has no tag, while `app:1.2` does.
    #[must_use]
    pub fn parse(reference: &str) -> Self {
        let reference = reference.trim();
        let reference = reference.split_once('@').map_or(reference, |(r, _)| r);
        let name_start = reference.rfind('/').map_or(0, |i| i + 1);
        match reference[name_start..].rfind(':') {
            Some(i) => {
                let split = name_start + i;
                Self {
                    repository: reference[..split].to_string(),
                    tag: Some(reference[split + 1..].to_string()).filter(|t| !t.is_empty()),
                }
            }
            None => Self {
                repository: reference.to_string(),
                tag: None,
            },
        }
    }

    /// The pinned tag, or the `latest` sentinel when none is pinned.
    #[must_use]
    pub fn tag_or_latest(&self) -> &str {
        self.tag.as_deref().unwrap_or(LATEST_TAG)
    }

    /// Render `repository:tag`.
    #[must_use]
    pub fn with_tag(&self, tag: &str) -> String {
        format!("{}:{tag}", self.repository)
    }
}

/// Qualify a repository name for the Docker Hub API.
///
/// `python` → `library/python`, `docker.io/grafana/grafana` → `grafana/grafana`.
#[must_use]
pub fn qualified_repository(repository: &str) -> String {
    let mut repo = repository.trim();
    for host in DOCKER_HUB_HOSTS {
        if let Some(rest) = repo.strip_prefix(host) {
            repo = rest;
            break;
        }
    }
    if repo.contains('/') {
        repo.to_string()
    } else {
        format!("{DEFAULT_NAMESPACE}/{repo}")
    }
}
