//! Domain types and validators for compose-update configuration.
//!
//! Pure functions only: no I/O and no environment access. The values are
//! loaded from `COMPOSE_UPDATE_*` variables by `infra::config`.

use anyhow::Result;
use serde::Deserialize;

use crate::domain::error::ConfigError;
use crate::domain::registry::{DEFAULT_PLATFORM, Platform};

// ── Constants ────────────────────────────────────────────────────────────────

pub const DEFAULT_REGISTRY_URL: &str = "https://hub.docker.com";
pub const DEFAULT_COMPOSE_COMMAND: &str = "docker compose";

// ── Config schema ────────────────────────────────────────────────────────────

/// Runtime settings, one field per `COMPOSE_UPDATE_<FIELD>` variable.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdaterConfig {
    /// Target platform for tag eligibility: `amd64`, `arm64/v8`, `linux/arm/v7`.
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Base URL of the registry tag API.
    #[serde(default = "default_registry_url")]
    pub registry_url: String,

    /// Compose invocation, split on whitespace (`docker compose`, `docker-compose`).
    #[serde(default = "default_compose_command")]
    pub compose_command: String,

    /// Deliver notices by HTTP POST to this URL; log them when unset.
    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Host label used in notices.
    #[serde(default)]
    pub hostname: Option<String>,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            platform: default_platform(),
            registry_url: default_registry_url(),
            compose_command: default_compose_command(),
            webhook_url: None,
            hostname: None,
        }
    }
}

fn default_platform() -> String {
    DEFAULT_PLATFORM.to_string()
}

fn default_registry_url() -> String {
    DEFAULT_REGISTRY_URL.to_string()
}

fn default_compose_command() -> String {
    DEFAULT_COMPOSE_COMMAND.to_string()
}

// ── Validators ───────────────────────────────────────────────────────────────

impl UpdaterConfig {
    /// Parsed target platform.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform identifier is malformed.
    pub fn target_platform(&self) -> Result<Platform> {
        self.platform.parse().map_err(|_| {
            ConfigError::InvalidValue {
                key: "platform".to_string(),
                value: self.platform.clone(),
                valid: "arch, arch/variant or os/arch[/variant]".to_string(),
            }
            .into()
        })
    }

    /// Compose program and its leading arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the command is blank.
    pub fn compose_argv(&self) -> Result<Vec<String>> {
        let argv: Vec<String> = self
            .compose_command
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if argv.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "compose_command".to_string(),
                value: self.compose_command.clone(),
                valid: "a program name, e.g. 'docker compose'".to_string(),
            }
            .into());
        }
        Ok(argv)
    }

    /// Registry base URL without a trailing slash.
    #[must_use]
    pub fn registry_base(&self) -> &str {
        self.registry_url.trim_end_matches('/')
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
