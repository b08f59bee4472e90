//! Application service: one update cycle for one deployment directory.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.
//!
//! A cycle moves through read → resolve → decide → apply → report. Every
//! resolution finishes before the first patch is written, and every patch
//! is written before the single restart.

use std::path::Path;
use std::process::Output;

use anyhow::Result;

use crate::application::ports::{CommandRunner, LocalFs, Notifier, TagRegistry};
use crate::application::services::config_reader::{ReadOutcome, read_directory};
use crate::application::services::patcher;
use crate::application::services::tag_resolver::{Resolution, resolve};
use crate::domain::notice::{error_notice, update_summary};
use crate::domain::{DescriptorError, Notice, Platform, PolicyGroup, Service, UpdateCycle};

/// Lines of captured stderr kept when a command fails.
const STDERR_TAIL_LINES: usize = 20;

// ── Public types ──────────────────────────────────────────────────────────────

/// Invocation-wide settings shared by every cycle.
#[derive(Debug, Clone)]
pub struct CycleSettings {
    /// Host label used in notices.
    pub host: String,
    pub platform: Platform,
    /// Compose program followed by its leading arguments.
    pub compose_command: Vec<String>,
    /// Resolve and log only: no writes, commands or notices.
    pub dry_run: bool,
}

/// How a cycle ended.
#[derive(Debug)]
pub enum CycleOutcome {
    /// A required descriptor is missing.
    Fatal(DescriptorError),
    /// The directory was skipped before resolution.
    Skipped,
    /// No service has a newer version.
    NoChanges,
    /// At least one service changed.
    Updated {
        /// Auto-update services that were (or in a dry run would be) applied.
        applied: Vec<String>,
        /// Manual-update services that were only reported.
        detected: Vec<String>,
        /// Build or restart commands that failed.
        failures: usize,
    },
}

/// Drives update cycles against injected collaborators.
pub struct Updater<'a, F, R, C, N: ?Sized> {
    fs: &'a F,
    registry: &'a R,
    runner: &'a C,
    notifier: &'a N,
    settings: &'a CycleSettings,
}

impl<'a, F, R, C, N> Updater<'a, F, R, C, N>
where
    F: LocalFs,
    R: TagRegistry,
    C: CommandRunner,
    N: Notifier + ?Sized,
{
    #[must_use]
    pub fn new(
        fs: &'a F,
        registry: &'a R,
        runner: &'a C,
        notifier: &'a N,
        settings: &'a CycleSettings,
    ) -> Self {
        Self {
            fs,
            registry,
            runner,
            notifier,
            settings,
        }
    }

    /// Run one full cycle for `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error on unanticipated failures: unreadable or unwritable
    /// descriptors and registry errors other than a missing repository.
    /// Descriptor problems and failing commands are reported, not returned.
    pub fn run(&self, dir: &Path) -> Result<CycleOutcome> {
        let span = tracing::info_span!("cycle", dir = %dir.display());
        let _enter = span.enter();

        // 1. Read
        let mut cycle = match read_directory(self.fs, dir)? {
            ReadOutcome::Ready { cycle, skipped } => {
                for reason in &skipped {
                    tracing::warn!(%reason, "skipping service");
                    self.report_error(&reason.to_string());
                }
                cycle
            }
            ReadOutcome::Skip(reason) => {
                tracing::error!(%reason, "skipping directory");
                self.report_error(&reason.to_string());
                return Ok(CycleOutcome::Skipped);
            }
            ReadOutcome::EmptyPolicy => {
                tracing::warn!("empty version policy, skipping directory");
                return Ok(CycleOutcome::Skipped);
            }
            ReadOutcome::Fatal(err) => {
                tracing::error!(error = %err, "cannot run update cycle");
                self.report_error(&err.to_string());
                return Ok(CycleOutcome::Fatal(err));
            }
        };

        // 2. Resolve: auto first, so manual twins start from its result
        self.resolve_group(&mut cycle, PolicyGroup::AutoUpdate)?;
        inherit_auto_versions(&mut cycle);
        self.resolve_group(&mut cycle, PolicyGroup::ManualUpdate)?;

        // 3. Decide
        if !cycle.has_changes() {
            tracing::info!("no changes found");
            return Ok(CycleOutcome::NoChanges);
        }

        // 4. Apply
        let failures = self.apply(dir, &cycle)?;

        // 5. Report
        let notice = update_summary(
            dir,
            &self.settings.host,
            cycle.changed(PolicyGroup::AutoUpdate),
            cycle.changed(PolicyGroup::ManualUpdate),
        );
        self.deliver(&notice);

        Ok(CycleOutcome::Updated {
            applied: names(cycle.changed(PolicyGroup::AutoUpdate)),
            detected: names(cycle.changed(PolicyGroup::ManualUpdate)),
            failures,
        })
    }

    fn resolve_group(&self, cycle: &mut UpdateCycle, group: PolicyGroup) -> Result<()> {
        for service in cycle.group_mut(group) {
            let resolution = resolve(self.registry, &self.settings.platform, service)?;
            if resolution == Resolution::RepositoryNotFound {
                tracing::error!(service = %service.name, image = %service.image, "repository not found");
                self.report_error(&format!(
                    "The repository {} of service {} could not be found in the registry",
                    service.image, service.name
                ));
                continue;
            }
            if service.is_changed() {
                tracing::info!(
                    service = %service.name,
                    group = %group,
                    from = %service.current_version,
                    to = %service.next_version(),
                    "new version found"
                );
            } else {
                tracing::debug!(service = %service.name, group = %group, "no new version");
            }
        }
        Ok(())
    }

    /// Patch every changed auto-update service, build the build-based ones,
    /// then restart once. Returns the number of failed commands.
    fn apply(&self, dir: &Path, cycle: &UpdateCycle) -> Result<usize> {
        let mut failures = 0;
        let mut any = false;

        for service in cycle.changed(PolicyGroup::AutoUpdate) {
            any = true;
            if self.settings.dry_run {
                tracing::info!(
                    service = %service.name,
                    version = %service.next_version(),
                    build = service.is_build_based(),
                    "dry run, not patching"
                );
                continue;
            }
            patcher::apply(self.fs, dir, service)?;
            if service.is_build_based() && !self.compose(dir, &["build", service.name.as_str()]) {
                failures += 1;
            }
        }

        if any {
            if self.settings.dry_run {
                tracing::info!("dry run, not restarting services");
            } else if !self.compose(dir, &["up", "-d"]) {
                failures += 1;
            }
        }
        Ok(failures)
    }

    /// Run a compose subcommand in `dir`; failures are logged and reported.
    fn compose(&self, dir: &Path, args: &[&str]) -> bool {
        let Some((program, leading)) = self.settings.compose_command.split_first() else {
            self.report_error("No compose command configured");
            return false;
        };
        let argv: Vec<&str> = leading
            .iter()
            .map(String::as_str)
            .chain(args.iter().copied())
            .collect();
        let command_line = format!("{program} {}", argv.join(" "));
        tracing::info!(command = %command_line, "running");

        match self.runner.run(dir, program, &argv) {
            Ok(output) if output.status.success() => true,
            Ok(output) => {
                let stderr = stderr_tail(&output);
                tracing::error!(command = %command_line, status = %output.status, %stderr, "command failed");
                self.report_error(&format!(
                    "Could not run {command_line} in {} ({}):\n{stderr}",
                    dir.display(),
                    output.status
                ));
                false
            }
            Err(e) => {
                tracing::error!(command = %command_line, error = %e, "command failed to start");
                self.report_error(&format!(
                    "Could not run {command_line} in {}: {e:#}",
                    dir.display()
                ));
                false
            }
        }
    }

    fn report_error(&self, message: &str) {
        self.deliver(&error_notice(&self.settings.host, message));
    }

    fn deliver(&self, notice: &Notice) {
        if self.settings.dry_run {
            tracing::info!(subject = %notice.subject, body = %notice.body, "dry run, not sending notice");
            return;
        }
        self.notifier.deliver(notice);
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Start every manual-update service from the version its auto-update twin
/// resolved to.
fn inherit_auto_versions(cycle: &mut UpdateCycle) {
    let inherited: Vec<Option<String>> = cycle
        .group(PolicyGroup::ManualUpdate)
        .iter()
        .map(|s| cycle.auto_version(&s.name).map(str::to_string))
        .collect();
    for (service, version) in cycle
        .group_mut(PolicyGroup::ManualUpdate)
        .iter_mut()
        .zip(inherited)
    {
        if let Some(version) = version {
            tracing::debug!(service = %service.name, %version, "inheriting auto-update version");
            service.rebase(&version);
        }
    }
}

fn names<'s>(services: impl Iterator<Item = &'s Service>) -> Vec<String> {
    services.map(|s| s.name.clone()).collect()
}

fn stderr_tail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines: Vec<&str> = stderr.lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
