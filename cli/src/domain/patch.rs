//! Line-local rewrites of the deployment and build descriptors.
//!
//! Scanning and rewriting are separate steps: the `find_*` functions return
//! the index of the line to change, the `rewrite_*` functions produce its
//! replacement. `patch_*` composes both over a whole document and returns
//! `None` when nothing matched, so callers can skip the write.
//!
//! Line terminators are kept as they were (`\n`, `\r\n`, or none on the last
//! line), and every line but the rewritten one is copied byte for byte.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::image::ImageRef;

static SERVICES_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Compile-time constant pattern.
    #[allow(clippy::expect_used)]
    Regex::new(r#"^(?:services|"services"|'services')\s*:\s*(?:#.*)?$"#).expect("valid regex")
});

static IMAGE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r#"^(?P<lead>\s*image\s*:\s*)(?P<quote>["']?)(?P<reference>[^\s"'#]+)(?P<rest>.*)$"#)
        .expect("valid regex")
});

static FROM_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?i)^(?P<lead>\s*FROM\s+(?:--\S+\s+)*)(?P<reference>[^\s-]\S*)(?P<rest>.*)$")
        .expect("valid regex")
});

// ── Line helpers ──────────────────────────────────────────────────────────────

/// Split text into lines that keep their terminators.
fn split_lines(text: &str) -> Vec<&str> {
    text.split_inclusive('\n').collect()
}

/// Split a line into its content and its terminator.
fn split_terminator(line: &str) -> (&str, &str) {
    let content = line.trim_end_matches(['\n', '\r']);
    (content, &line[content.len()..])
}

fn indentation(content: &str) -> usize {
    content.len() - content.trim_start().len()
}

/// Blank and comment-only lines never open or close a block.
fn is_structural(content: &str) -> bool {
    let trimmed = content.trim_start();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

fn replace_line(lines: &[&str], index: usize, content: &str) -> String {
    let mut out = String::with_capacity(lines.iter().map(|l| l.len()).sum::<usize>() + 16);
    for (i, line) in lines.iter().enumerate() {
        if i == index {
            let (_, terminator) = split_terminator(line);
            out.push_str(content);
            out.push_str(terminator);
        } else {
            out.push_str(line);
        }
    }
    out
}

// ── Deployment descriptor ─────────────────────────────────────────────────────

/// Find the header line of service `name` inside the top-level `services:`
/// block. Returns the line index and the header's indentation.
#[must_use]
pub fn find_service_header(lines: &[&str], name: &str) -> Option<(usize, usize)> {
    let services = lines
        .iter()
        .position(|l| SERVICES_KEY_RE.is_match(split_terminator(l).0))?;

    let header = Regex::new(&format!(
        r#"^\s*(?:{name}|"{name}"|'{name}')\s*:\s*(?:#.*)?$"#,
        name = regex::escape(name)
    ))
    .ok()?;

    let mut child_indent = None;
    for (i, line) in lines.iter().enumerate().skip(services + 1) {
        let (content, _) = split_terminator(line);
        if !is_structural(content) {
            continue;
        }
        let indent = indentation(content);
        if indent == 0 {
            // Next top-level key: the services block is over.
            return None;
        }
        let level = *child_indent.get_or_insert(indent);
        if indent == level && header.is_match(content) {
            return Some((i, indent));
        }
    }
    None
}

/// Find the first `image:` line inside the block opened at `header`.
///
/// The block ends at the next structural line indented at or above the
/// header, so a later service using the same image is never reached.
#[must_use]
pub fn find_image_line(lines: &[&str], header: usize, header_indent: usize) -> Option<usize> {
    for (i, line) in lines.iter().enumerate().skip(header + 1) {
        let (content, _) = split_terminator(line);
        if !is_structural(content) {
            continue;
        }
        if indentation(content) <= header_indent {
            return None;
        }
        if IMAGE_LINE_RE.is_match(content) {
            return Some(i);
        }
    }
    None
}

/// Rewrite an `image:` line to reference `version`.
///
/// The tag is replaced, or appended when the reference has none; quoting and
/// anything after the reference (a comment, say) are preserved.
#[must_use]
pub fn rewrite_image_line(content: &str, version: &str) -> Option<String> {
    let caps = IMAGE_LINE_RE.captures(content)?;
    let image = ImageRef::parse(&caps["reference"]);
    Some(format!(
        "{}{}{}{}",
        &caps["lead"],
        &caps["quote"],
        image.with_tag(version),
        &caps["rest"]
    ))
}

/// Point service `name` at `version` in a deployment descriptor.
///
/// Returns `None` when the service header or its image line is missing.
#[must_use]
pub fn patch_compose(text: &str, name: &str, version: &str) -> Option<String> {
    let lines = split_lines(text);
    let (header, indent) = find_service_header(&lines, name)?;
    let index = find_image_line(&lines, header, indent)?;
    let (content, _) = split_terminator(lines[index]);
    let replacement = rewrite_image_line(content, version)?;
    Some(replace_line(&lines, index, &replacement))
}

// ── Build descriptor ──────────────────────────────────────────────────────────

/// Index of the first `FROM` line.
#[must_use]
pub fn find_from_line(lines: &[&str]) -> Option<usize> {
    lines
        .iter()
        .position(|l| FROM_LINE_RE.is_match(split_terminator(l).0))
}

/// Image reference named by a `FROM` line.
#[must_use]
pub fn from_reference(content: &str) -> Option<ImageRef> {
    let caps = FROM_LINE_RE.captures(content)?;
    Some(ImageRef::parse(&caps["reference"]))
}

/// Base image of a build descriptor, taken from its first `FROM` line.
#[must_use]
pub fn base_image(text: &str) -> Option<ImageRef> {
    let lines = split_lines(text);
    let index = find_from_line(&lines)?;
    from_reference(split_terminator(lines[index]).0)
}

/// Replace the reference of a `FROM` line with `reference`, keeping option
/// flags before it and a stage name after it.
#[must_use]
pub fn rewrite_from_line(content: &str, reference: &str) -> Option<String> {
    let caps = FROM_LINE_RE.captures(content)?;
    Some(format!("{}{reference}{}", &caps["lead"], &caps["rest"]))
}

/// Point the first `FROM` line of a build descriptor at `image:version`.
#[must_use]
pub fn patch_build_file(text: &str, image: &str, version: &str) -> Option<String> {
    let lines = split_lines(text);
    let index = find_from_line(&lines)?;
    let (content, _) = split_terminator(lines[index]);
    let replacement = rewrite_from_line(content, &format!("{image}:{version}"))?;
    Some(replace_line(&lines, index, &replacement))
}
