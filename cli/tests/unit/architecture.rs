//! Structural tests for architectural boundary enforcement.
//!
//! These tests scan source files to verify that the layer boundaries
//! (domain → application → infra → cli) are maintained. Unit-test modules
//! sit at the end of each file and are not scanned.

use std::path::Path;

use walkdir::WalkDir;

const LAYERS: [&str; 3] = ["domain", "application", "infra"];

/// Every non-comment line of production code under `src/<layer>` that
/// contains one of `patterns`, as `path:line: text`.
fn matches_in(layer: &str, patterns: &[&str]) -> Vec<String> {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut violations = Vec::new();

    for entry in WalkDir::new(root.join("src").join(layer))
        .sort_by_file_name()
        .into_iter()
        .flatten()
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
    {
        let Ok(content) = std::fs::read_to_string(entry.path()) else {
            continue;
        };
        let rel = entry.path().strip_prefix(root).unwrap_or(entry.path()).display().to_string();

        for (i, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with("#[cfg(test)]") {
                break;
            }
            if trimmed.starts_with("//") {
                continue;
            }
            if patterns.iter().any(|p| line.contains(p)) {
                violations.push(format!("{rel}:{}: {trimmed}", i + 1));
            }
        }
    }
    violations
}

fn assert_clean(violations: &[String], rule: &str) {
    assert!(violations.is_empty(), "{rule}:\n{}", violations.join("\n"));
}

// ── Domain purity ─────────────────────────────────────────────────────────────

#[test]
fn domain_has_no_io_or_outer_layer_imports() {
    let violations = matches_in(
        "domain",
        &[
            "crate::infra",
            "crate::application",
            "crate::cli",
            "std::fs",
            "std::process",
            "std::net",
            "ureq::",
        ],
    );
    assert_clean(&violations, "domain/ must stay free of I/O and outer layers");
}

// ── Application boundaries ────────────────────────────────────────────────────

#[test]
fn application_has_no_infra_or_cli_imports() {
    let violations = matches_in("application", &["crate::infra::", "crate::cli::"]);
    assert_clean(&violations, "application/ must not import from infra/ or cli");
}

#[test]
fn application_performs_io_only_through_ports() {
    let violations = matches_in(
        "application",
        &[
            "std::fs::",
            "std::process::Command",
            "std::net::",
            "ureq::",
            "walkdir::",
            "tempfile::",
        ],
    );
    assert_clean(
        &violations,
        "application/ must reach the outside world through crate::application::ports",
    );
}

#[test]
fn no_concrete_adapter_types_in_services() {
    let violations = matches_in(
        "application",
        &[
            "DockerHubRegistry",
            "StdCommandRunner",
            "WebhookNotifier",
            "LogNotifier",
            "infra::fs::LocalFs",
        ],
    );
    assert_clean(&violations, "application/ takes trait bounds, not adapter types");
}

// ── Hygiene ───────────────────────────────────────────────────────────────────

#[test]
fn infra_has_no_cli_imports() {
    assert_clean(&matches_in("infra", &["crate::cli"]), "infra/ must not import from cli");
}

#[test]
fn layers_log_through_tracing() {
    let violations: Vec<String> = LAYERS
        .iter()
        .flat_map(|layer| matches_in(layer, &["println!", "eprintln!"]))
        .collect();
    assert_clean(&violations, "use tracing instead of print macros");
}

#[test]
fn no_module_level_dead_code_allows_in_layers() {
    let violations: Vec<String> = LAYERS
        .iter()
        .flat_map(|layer| matches_in(layer, &["#![allow(dead_code)]"]))
        .collect();
    assert_clean(&violations, "suppress dead code per item, not per module");
}

#[test]
fn production_code_does_not_unwrap() {
    let violations: Vec<String> = LAYERS
        .iter()
        .flat_map(|layer| matches_in(layer, &[".unwrap()"]))
        .collect();
    assert_clean(&violations, "propagate errors with `?` instead of unwrapping");
}
