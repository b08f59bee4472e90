//! Version ordering for image tags.
//!
//! Tags are compared as semantic versions after a lenient normalisation:
//! a leading `v` is dropped and a one- or two-component numeric core is
//! padded with zeros (`9.2` → `9.2.0`, `3.8-buster` → `3.8.0-buster`).
//! Leading zeros in a component are dropped (`20.04` → `20.4.0`).
//! Anything that still fails to parse (`latest`, `buster`, `1.2.3.4`) is
//! unparsable and never wins a comparison.

use semver::Version;

/// Tag used when an image reference carries no explicit tag.
pub const LATEST_TAG: &str = "latest";

/// Parse a tag into a semantic version, or `None` if it is not one.
#[must_use]
pub fn parse_version(tag: &str) -> Option<Version> {
    let tag = tag.strip_prefix('v').unwrap_or(tag);
    let core_end = tag.find(['-', '+']).unwrap_or(tag.len());
    let (core, suffix) = tag.split_at(core_end);

    let parts = core
        .split('.')
        .map(|p| {
            if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            p.parse::<u64>().ok()
        })
        .collect::<Option<Vec<u64>>>()?;
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    // Rebuilt from the numbers so zero-padded parts (`20.04`) parse.
    let mut normalized = parts
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".");
    for _ in parts.len()..3 {
        normalized.push_str(".0");
    }
    normalized.push_str(suffix);
    Version::parse(&normalized).ok()
}

/// Returns `true` if `candidate` is strictly newer than `baseline`.
///
/// An unparsable candidate is never newer. An unparsable baseline (the
/// `latest` sentinel, for example) is older than any parsable candidate.
#[must_use]
pub fn is_newer(candidate: &str, baseline: &str) -> bool {
    let Some(candidate) = parse_version(candidate) else {
        return false;
    };
    match parse_version(baseline) {
        Some(baseline) => candidate > baseline,
        None => true,
    }
}
