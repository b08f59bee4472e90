//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::application`,
//! `std::fs`, `std::process`, or `std::net`. `DescriptorError` is the only
//! fatal condition of a cycle; `SkipReason` covers everything the reader
//! reports and steps over.

use std::path::PathBuf;

use thiserror::Error;

// ── Fatal errors ──────────────────────────────────────────────────────────────

/// A descriptor the cycle cannot run without is absent.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("deployment descriptor not found: {}", .0.display())]
    MissingCompose(PathBuf),

    #[error("version policy not found: {}", .0.display())]
    MissingPolicy(PathBuf),
}

// ── Recoverable conditions ────────────────────────────────────────────────────

/// Why a directory or a single policy entry was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("Empty docker-compose.yml at {}", .0.display())]
    EmptyCompose(PathBuf),

    #[error("Cannot parse {}: {message}", .path.display())]
    MalformedCompose { path: PathBuf, message: String },

    #[error("Cannot parse {}: {message}", .path.display())]
    MalformedPolicy { path: PathBuf, message: String },

    #[error(
        "The service {service} given in {} could not be found in {}",
        .policy.display(),
        .compose.display()
    )]
    UnknownService {
        service: String,
        policy: PathBuf,
        compose: PathBuf,
    },

    #[error("Service {service} has neither an image nor a build section")]
    NoImageOrBuild { service: String },

    #[error("Dockerfile for service {service} not found at {}", .path.display())]
    MissingBuildFile { service: String, path: PathBuf },

    #[error("Dockerfile at {} seems to be missing a FROM statement", .0.display())]
    MissingFromLine(PathBuf),

    #[error("Invalid version pattern '{pattern}' for service {service}: {message}")]
    InvalidPattern {
        service: String,
        pattern: String,
        message: String,
    },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}
