//! Application service: resolve the newest eligible tag for a service.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use anyhow::{Context, Result};

use crate::application::ports::TagRegistry;
use crate::domain::image::qualified_repository;
use crate::domain::{Platform, RegistryTag, Service, TagListing};

/// Upper bound on followed pages for one repository.
pub const MAX_PAGES: usize = 500;

// ── Public types ──────────────────────────────────────────────────────────────

/// What resolution observed for one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The listing was scanned; `eligible` tags passed pattern and platform.
    Checked { eligible: usize },
    /// The repository does not exist upstream; the service is unchanged.
    RepositoryNotFound,
}

// ── Use-case ──────────────────────────────────────────────────────────────────

/// Offer every eligible tag of `service.image` to the service.
///
/// A tag is eligible when its name matches the service pattern and it has
/// an image variant for `platform`. All pages are pooled before any tag is
/// offered.
///
/// # Errors
///
/// Returns an error if the registry cannot be queried.
pub fn resolve(
    registry: &impl TagRegistry,
    platform: &Platform,
    service: &mut Service,
) -> Result<Resolution> {
    let repository = qualified_repository(&service.image);
    let Some(tags) = fetch_all_tags(registry, &repository)? else {
        return Ok(Resolution::RepositoryNotFound);
    };

    let mut eligible = 0;
    for tag in &tags {
        if !service.pattern.is_match(&tag.name) {
            continue;
        }
        if !tag.supports(platform) {
            tracing::debug!(
                service = %service.name,
                tag = %tag.name,
                platform = %platform,
                "tag has no image for platform"
            );
            continue;
        }
        eligible += 1;
        if service.offer(&tag.name) {
            tracing::debug!(service = %service.name, version = %tag.name, "newer candidate");
        }
    }

    tracing::debug!(
        service = %service.name,
        repository = %repository,
        tags = tags.len(),
        eligible,
        version = %service.next_version(),
        "resolved"
    );
    Ok(Resolution::Checked { eligible })
}

/// Follow the paginated listing of `repository` and pool every tag.
///
/// Returns `None` if the repository does not exist.
///
/// # Errors
///
/// Returns an error if any page cannot be fetched.
pub fn fetch_all_tags(
    registry: &impl TagRegistry,
    repository: &str,
) -> Result<Option<Vec<RegistryTag>>> {
    let mut tags = Vec::new();
    let mut next: Option<String> = None;

    for page_no in 1..=MAX_PAGES {
        let listing = registry
            .fetch_tags(repository, next.as_deref())
            .with_context(|| format!("fetching tags of {repository} (page {page_no})"))?;
        let page = match listing {
            TagListing::Page(page) => page,
            TagListing::RepositoryNotFound => return Ok(None),
        };
        tags.extend(page.tags);
        match page.next {
            Some(url) if !url.is_empty() => next = Some(url),
            _ => return Ok(Some(tags)),
        }
    }

    tracing::warn!(
        repository,
        pages = MAX_PAGES,
        "tag listing truncated after page limit"
    );
    Ok(Some(tags))
}
