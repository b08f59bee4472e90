//! Application service: read one deployment directory into an update cycle.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

use crate::application::ports::LocalFs;
use crate::domain::descriptor::{
    COMPOSE_FILE, ComposeFile, ComposeService, POLICY_FILE, VersionPolicy, parse_optional,
};
use crate::domain::image::ImageRef;
use crate::domain::patch::base_image;
use crate::domain::{DescriptorError, PolicyGroup, Service, SkipReason, UpdateCycle};

// ── Public types ──────────────────────────────────────────────────────────────

/// Result of reading a directory's descriptors.
#[derive(Debug)]
pub enum ReadOutcome {
    /// Services were derived. `skipped` lists policy entries stepped over.
    Ready {
        cycle: UpdateCycle,
        skipped: Vec<SkipReason>,
    },
    /// The whole directory is skipped and the reason must be reported.
    Skip(SkipReason),
    /// The version policy is empty; skip with a warning only.
    EmptyPolicy,
    /// A required descriptor is missing.
    Fatal(DescriptorError),
}

// ── Use-case ──────────────────────────────────────────────────────────────────

/// Read `docker-compose.yml` and `docker-compose-versions.yml` in `dir` and
/// derive one [`Service`] per policy entry that exists in the deployment
/// descriptor.
///
/// # Errors
///
/// Returns an error only if a file that exists cannot be read. Every
/// condition of the descriptors themselves is expressed in [`ReadOutcome`].
pub fn read_directory(fs: &impl LocalFs, dir: &Path) -> Result<ReadOutcome> {
    let compose_path = dir.join(COMPOSE_FILE);
    let policy_path = dir.join(POLICY_FILE);

    if !fs.exists(&compose_path) {
        return Ok(ReadOutcome::Fatal(DescriptorError::MissingCompose(
            compose_path,
        )));
    }
    if !fs.exists(&policy_path) {
        return Ok(ReadOutcome::Fatal(DescriptorError::MissingPolicy(
            policy_path,
        )));
    }

    let compose_text = fs
        .read_to_string(&compose_path)
        .with_context(|| format!("reading {}", compose_path.display()))?;
    let policy_text = fs
        .read_to_string(&policy_path)
        .with_context(|| format!("reading {}", policy_path.display()))?;

    let compose = match parse_optional::<ComposeFile>(&compose_text) {
        Ok(Some(compose)) => compose,
        Ok(None) => return Ok(ReadOutcome::Skip(SkipReason::EmptyCompose(compose_path))),
        Err(e) => {
            return Ok(ReadOutcome::Skip(SkipReason::MalformedCompose {
                path: compose_path,
                message: e.to_string(),
            }));
        }
    };
    let policy = match parse_optional::<VersionPolicy>(&policy_text) {
        Ok(Some(policy)) => policy,
        Ok(None) => return Ok(ReadOutcome::EmptyPolicy),
        Err(e) => {
            return Ok(ReadOutcome::Skip(SkipReason::MalformedPolicy {
                path: policy_path,
                message: e.to_string(),
            }));
        }
    };

    let mut cycle = UpdateCycle::new();
    let mut skipped = Vec::new();

    for group in PolicyGroup::ALL {
        for (name, pattern) in policy.entries(group) {
            let Some(entry) = compose.services.get(name) else {
                skipped.push(SkipReason::UnknownService {
                    service: name.to_string(),
                    policy: policy_path.clone(),
                    compose: compose_path.clone(),
                });
                continue;
            };
            let default_entry = ComposeService::default();
            let entry = entry.as_ref().unwrap_or(&default_entry);
            match derive_service(fs, dir, name, pattern, entry)? {
                Ok(service) => {
                    tracing::debug!(
                        service = %service.name,
                        image = %service.image,
                        version = %service.current_version,
                        group = %group,
                        "managed service"
                    );
                    cycle.insert(group, service);
                }
                Err(reason) => skipped.push(reason),
            }
        }
    }

    Ok(ReadOutcome::Ready { cycle, skipped })
}

/// Build the [`Service`] for one policy entry.
///
/// The outer `Result` carries I/O failures; the inner one a per-entry skip.
fn derive_service(
    fs: &impl LocalFs,
    dir: &Path,
    name: &str,
    pattern: &str,
    entry: &ComposeService,
) -> Result<Result<Service, SkipReason>> {
    let pattern = match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => {
            return Ok(Err(SkipReason::InvalidPattern {
                service: name.to_string(),
                pattern: pattern.to_string(),
                message: e.to_string(),
            }));
        }
    };

    if let Some(image) = &entry.image {
        let reference = ImageRef::parse(image);
        let version = reference.tag_or_latest().to_string();
        return Ok(Ok(Service::new(
            name,
            reference.repository,
            pattern,
            version,
            None,
        )));
    }

    let Some(build) = &entry.build else {
        return Ok(Err(SkipReason::NoImageOrBuild {
            service: name.to_string(),
        }));
    };

    let build_path = build.build_file(dir);
    tracing::debug!(service = name, path = %build_path.display(), "build-based service");
    if !fs.exists(&build_path) {
        return Ok(Err(SkipReason::MissingBuildFile {
            service: name.to_string(),
            path: build_path,
        }));
    }
    let text = fs
        .read_to_string(&build_path)
        .with_context(|| format!("reading {}", build_path.display()))?;
    let Some(reference) = base_image(&text) else {
        return Ok(Err(SkipReason::MissingFromLine(build_path)));
    };
    let version = reference.tag_or_latest().to_string();
    Ok(Ok(Service::new(
        name,
        reference.repository,
        pattern,
        version,
        Some(build_path),
    )))
}
