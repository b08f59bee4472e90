//! Configuration loading from `COMPOSE_UPDATE_*` environment variables.

use anyhow::{Context, Result};

use crate::domain::config::UpdaterConfig;

/// Prefix of every configuration variable.
pub const ENV_PREFIX: &str = "COMPOSE_UPDATE_";

const HOSTNAME_FILE: &str = "/etc/hostname";
const FALLBACK_HOSTNAME: &str = "localhost";

/// Load configuration from the process environment.
///
/// # Errors
///
/// Returns an error if a variable is present but cannot be deserialized.
pub fn load_from_env() -> Result<UpdaterConfig> {
    envy::prefixed(ENV_PREFIX)
        .from_env()
        .context("failed to load config from COMPOSE_UPDATE_* env vars")
}

/// Load configuration from explicit `(name, value)` pairs.
///
/// # Errors
///
/// Returns an error if a variable is present but cannot be deserialized.
pub fn load_from_vars<I>(vars: I) -> Result<UpdaterConfig>
where
    I: IntoIterator<Item = (String, String)>,
{
    envy::prefixed(ENV_PREFIX)
        .from_iter(vars)
        .context("failed to load config from COMPOSE_UPDATE_* vars")
}

/// Host label for notices: configured value, then `$HOSTNAME`, then
/// `/etc/hostname`, then `localhost`.
#[must_use]
pub fn host_label(config: &UpdaterConfig) -> String {
    pick_host_label(
        config.hostname.as_deref(),
        std::env::var("HOSTNAME").ok().as_deref(),
        std::fs::read_to_string(HOSTNAME_FILE).ok().as_deref(),
    )
}

fn pick_host_label(configured: Option<&str>, env: Option<&str>, file: Option<&str>) -> String {
    [configured, env, file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or(FALLBACK_HOSTNAME)
        .to_string()
}
