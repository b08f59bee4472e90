//! Registry infrastructure: Docker Hub tag listing over blocking HTTP.

use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::TagRegistry;
use crate::domain::{TagListing, TagPage};

/// Tags requested per page.
pub const PAGE_SIZE: u32 = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("compose-update/", env!("CARGO_PKG_VERSION"));

/// Production `TagRegistry` for the Docker Hub v2 API (or a compatible
/// mirror at another base URL).
pub struct DockerHubRegistry {
    base_url: String,
    agent: ureq::Agent,
}

impl DockerHubRegistry {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new()
                .timeout(REQUEST_TIMEOUT)
                .user_agent(USER_AGENT)
                .build(),
        }
    }

    /// URL of the first tag page of `repository`.
    #[must_use]
    pub fn first_page_url(&self, repository: &str) -> String {
        format!(
            "{}/v2/repositories/{repository}/tags?page_size={PAGE_SIZE}",
            self.base_url
        )
    }
}

impl TagRegistry for DockerHubRegistry {
    fn fetch_tags(&self, repository: &str, page: Option<&str>) -> Result<TagListing> {
        let url = page.map_or_else(|| self.first_page_url(repository), str::to_string);
        tracing::debug!(%url, "fetching tag page");

        let resp = match self
            .agent
            .get(&url)
            .set("Accept", "application/json")
            .call()
        {
            Ok(resp) => resp,
            Err(ureq::Error::Status(404, _)) => return Ok(TagListing::RepositoryNotFound),
            Err(ureq::Error::Status(code, _)) => {
                anyhow::bail!("registry returned HTTP {code} for {url}")
            }
            Err(e) => return Err(anyhow::Error::new(e).context(format!("requesting {url}"))),
        };

        let body = resp.into_string().context("reading tag page")?;
        let page: TagPage =
            serde_json::from_str(&body).with_context(|| format!("parsing tag page {url}"))?;
        Ok(TagListing::Page(page))
    }
}
