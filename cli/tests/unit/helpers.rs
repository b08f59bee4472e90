//! Shared test helpers: in-memory port implementations and output constructors.

#![allow(dead_code, clippy::expect_used)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::Mutex;

use anyhow::Result;
use compose_update_cli::application::ports::{CommandRunner, LocalFs, Notifier, TagRegistry};
use compose_update_cli::application::services::update_cycle::CycleSettings;
use compose_update_cli::domain::registry::PlatformImage;
use compose_update_cli::domain::{Notice, Platform, RegistryTag, TagListing, TagPage};

/// Deployment directory used by in-memory fixtures.
pub const DIR: &str = "/srv/app";

pub fn in_dir(name: &str) -> PathBuf {
    Path::new(DIR).join(name)
}

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
///
/// On Unix the raw wait-status encodes the exit code in bits 8–15, so we shift.
/// On Windows `ExitStatusExt::from_raw` takes the exit code directly.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output() -> Output {
    Output {
        status: exit_status(0),
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── Settings ─────────────────────────────────────────────────────────────────

pub fn settings(dry_run: bool) -> CycleSettings {
    CycleSettings {
        host: "testhost".to_string(),
        platform: Platform::default(),
        compose_command: vec!["docker".to_string(), "compose".to_string()],
        dry_run,
    }
}

// ── In-memory filesystem ─────────────────────────────────────────────────────

/// `LocalFs` over a map of path → content, recording every write.
#[derive(Default)]
pub struct MemoryFs {
    files: Mutex<BTreeMap<PathBuf, String>>,
    writes: Mutex<Vec<PathBuf>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.files
            .lock()
            .expect("lock")
            .insert(path.into(), content.to_string());
        self
    }

    pub fn content(&self, path: &Path) -> Option<String> {
        self.files.lock().expect("lock").get(path).cloned()
    }

    pub fn writes(&self) -> Vec<PathBuf> {
        self.writes.lock().expect("lock").clone()
    }
}

impl LocalFs for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.files.lock().expect("lock").contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.content(path)
            .ok_or_else(|| anyhow::anyhow!("no such file: {}", path.display()))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        self.files
            .lock()
            .expect("lock")
            .insert(path.to_path_buf(), content.to_string());
        self.writes.lock().expect("lock").push(path.to_path_buf());
        Ok(())
    }
}

// ── Registry doubles ─────────────────────────────────────────────────────────

pub fn tag(name: &str, architectures: &[&str]) -> RegistryTag {
    RegistryTag {
        name: name.to_string(),
        images: architectures
            .iter()
            .map(|arch| PlatformImage {
                architecture: Some((*arch).to_string()),
                os: Some("linux".to_string()),
                variant: None,
            })
            .collect(),
    }
}

pub fn amd64(name: &str) -> RegistryTag {
    tag(name, &["amd64"])
}

/// Serves canned pages per repository; unknown repositories are not found.
#[derive(Default)]
pub struct FakeRegistry {
    pages: BTreeMap<String, Vec<Vec<RegistryTag>>>,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `tags` as a single page.
    pub fn with_tags(self, repository: &str, tags: Vec<RegistryTag>) -> Self {
        self.with_pages(repository, vec![tags])
    }

    pub fn with_pages(mut self, repository: &str, pages: Vec<Vec<RegistryTag>>) -> Self {
        self.pages.insert(repository.to_string(), pages);
        self
    }

    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().expect("lock").clone()
    }

    fn page_url(repository: &str, number: usize) -> String {
        format!("https://registry.test/v2/repositories/{repository}/tags?page={number}")
    }
}

impl TagRegistry for FakeRegistry {
    fn fetch_tags(&self, repository: &str, page: Option<&str>) -> Result<TagListing> {
        self.calls
            .lock()
            .expect("lock")
            .push((repository.to_string(), page.map(str::to_string)));

        let Some(pages) = self.pages.get(repository) else {
            return Ok(TagListing::RepositoryNotFound);
        };
        let number = match page {
            None => 1,
            Some(url) => url
                .rsplit("page=")
                .next()
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| anyhow::anyhow!("bad page url {url}"))?,
        };
        let tags = pages
            .get(number - 1)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no page {number} for {repository}"))?;
        let next = (number < pages.len()).then(|| Self::page_url(repository, number + 1));
        Ok(TagListing::Page(TagPage { next, tags }))
    }
}

/// Every request fails as if the network were down.
pub struct UnreachableRegistry;

impl TagRegistry for UnreachableRegistry {
    fn fetch_tags(&self, repository: &str, _: Option<&str>) -> Result<TagListing> {
        anyhow::bail!("connection refused while fetching {repository}")
    }
}

// ── Command runner double ────────────────────────────────────────────────────

/// Records every command; fails those whose first argument after the compose
/// prefix equals `fail_on`.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<(PathBuf, String)>>,
    fail_on: Option<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(subcommand: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: Some(subcommand.to_string()),
        }
    }

    /// Commands run so far, as `program arg arg`.
    pub fn commands(&self) -> Vec<String> {
        self.calls
            .lock()
            .expect("lock")
            .iter()
            .map(|(_, cmd)| cmd.clone())
            .collect()
    }

    pub fn dirs(&self) -> Vec<PathBuf> {
        self.calls
            .lock()
            .expect("lock")
            .iter()
            .map(|(dir, _)| dir.clone())
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, dir: &Path, program: &str, args: &[&str]) -> Result<Output> {
        let mut cmd = program.to_string();
        for arg in args {
            cmd.push(' ');
            cmd.push_str(arg);
        }
        self.calls
            .lock()
            .expect("lock")
            .push((dir.to_path_buf(), cmd));

        if let (Some(fail_on), Some(sub)) = (&self.fail_on, args.get(1))
            && fail_on == sub
        {
            return Ok(err_output(1, b"pulling layers\nerror: manifest unknown\n"));
        }
        Ok(ok_output())
    }
}

// ── Notifier double ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("lock").clone()
    }

    pub fn subjects(&self) -> Vec<String> {
        self.notices().into_iter().map(|n| n.subject).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn deliver(&self, notice: &Notice) {
        self.notices.lock().expect("lock").push(notice.clone());
    }
}
