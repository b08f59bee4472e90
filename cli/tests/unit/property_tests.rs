//! Property-based tests for version ordering, resolution and patching.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use proptest::prelude::*;
use regex::Regex;

use compose_update_cli::application::services::tag_resolver::resolve;
use compose_update_cli::domain::patch::patch_compose;
use compose_update_cli::domain::version::{is_newer, parse_version};
use compose_update_cli::domain::{Platform, Service};

use crate::helpers::{FakeRegistry, amd64, tag};

/// A numeric component, sometimes zero-padded (`4`, `04`, `004`).
fn component() -> impl Strategy<Value = (u64, String)> {
    (0u64..50, 0usize..3).prop_map(|(n, pad)| (n, format!("{}{n}", "0".repeat(pad))))
}

fn version_string() -> impl Strategy<Value = String> {
    (component(), component(), component())
        .prop_map(|((_, a), (_, b), (_, c))| format!("{a}.{b}.{c}"))
}

/// One to three components, with the numeric value they stand for
/// (missing components count as zero).
fn short_version() -> impl Strategy<Value = ([u64; 3], String)> {
    prop::collection::vec(component(), 1..=3).prop_map(|parts| {
        let mut value = [0; 3];
        for (slot, (n, _)) in value.iter_mut().zip(&parts) {
            *slot = *n;
        }
        let text = parts
            .iter()
            .map(|(_, s)| s.as_str())
            .collect::<Vec<_>>()
            .join(".");
        (value, text)
    })
}

// ============================================================================
// Version ordering
// ============================================================================

proptest! {
    /// Ordering is strict: a version is never newer than itself, and of two
    /// distinct versions exactly one is newer.
    #[test]
    fn prop_is_newer_is_strict(a in version_string(), b in version_string()) {
        prop_assert!(!is_newer(&a, &a));
        if parse_version(&a) != parse_version(&b) {
            prop_assert!(is_newer(&a, &b) ^ is_newer(&b, &a));
        }
    }

    /// Short forms are padded with zeros.
    #[test]
    fn prop_short_versions_pad(major in 0u64..1000, minor in 0u64..1000) {
        let short = parse_version(&format!("{major}.{minor}")).expect("parsable");
        prop_assert_eq!(short, semver::Version::new(major, minor, 0));
    }

    /// Ordering follows the numbers, whatever the zero padding or the
    /// number of components: a numerically lower candidate is never newer.
    #[test]
    fn prop_is_newer_follows_numeric_value(
        (a_value, a) in short_version(),
        (b_value, b) in short_version(),
    ) {
        prop_assert!(parse_version(&a).is_some());
        prop_assert_eq!(is_newer(&a, &b), a_value > b_value);
    }

    /// Words that are not versions never parse.
    #[test]
    fn prop_alphabetic_tags_do_not_parse(word in "[a-z]{1,12}") {
        prop_assert!(parse_version(&word).is_none());
    }
}

// ============================================================================
// Resolution
// ============================================================================

proptest! {
    /// The resolved version is the maximum eligible tag, never lower than the
    /// starting point, and never a tag without an image for the platform.
    #[test]
    fn prop_resolution_selects_max_eligible(
        current in version_string(),
        eligible in prop::collection::vec(version_string(), 0..20),
        foreign in prop::collection::vec(version_string(), 0..5),
    ) {
        let mut tags: Vec<_> = eligible.iter().map(|v| amd64(v)).collect();
        tags.extend(foreign.iter().map(|v| tag(&format!("{v}-rc"), &["s390x"])));
        let registry = FakeRegistry::new().with_tags("library/app", tags);
        let mut service = Service::new(
            "app",
            "app",
            Regex::new(r"^\d+\.\d+\.\d+").expect("pattern"),
            current.clone(),
            None,
        );

        resolve(&registry, &Platform::default(), &mut service).expect("resolve");

        let expected = eligible
            .iter()
            .filter_map(|v| parse_version(v))
            .chain(parse_version(&current))
            .max()
            .expect("current parses");
        prop_assert_eq!(parse_version(service.next_version()), Some(expected));
        prop_assert!(!service.next_version().ends_with("-rc"));
        prop_assert_eq!(service.is_changed(), service.next_version() != current);
    }
}

// ============================================================================
// Compose patching
// ============================================================================

proptest! {
    /// Patching one service changes exactly one line and leaves a sibling
    /// service with the same image untouched.
    #[test]
    fn prop_compose_patch_changes_one_line(
        old in version_string(),
        new in version_string(),
        comment in "[a-z ]{0,20}",
    ) {
        let text = format!(
            "# {comment}\nservices:\n  web:\n    image: python:{old}\n  worker:\n    image: python:{old}\n"
        );
        let patched = patch_compose(&text, "web", &new).expect("patched");

        let before: Vec<&str> = text.lines().collect();
        let after: Vec<&str> = patched.lines().collect();
        prop_assert_eq!(before.len(), after.len());
        let changed: Vec<usize> = (0..before.len()).filter(|&i| before[i] != after[i]).collect();
        if old == new {
            prop_assert!(changed.is_empty());
        } else {
            prop_assert_eq!(changed, vec![3]);
        }
        let expected_worker = format!("    image: python:{old}");
        prop_assert_eq!(after[5], expected_worker.as_str());
    }
}
