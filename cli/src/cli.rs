//! CLI argument parsing with clap derive

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::application::ports::Notifier;
use crate::application::services::update_cycle::{CycleOutcome, CycleSettings, Updater};
use crate::domain::notice::error_notice;
use crate::infra::command_runner::StdCommandRunner;
use crate::infra::config::{host_label, load_from_env};
use crate::infra::discovery::discover;
use crate::infra::fs::LocalFs;
use crate::infra::notifier::{LogNotifier, WebhookNotifier};
use crate::infra::registry::DockerHubRegistry;

/// Keep docker-compose image tags in sync with their registry
#[derive(Parser, Debug)]
#[command(name = "compose-update", version)]
pub struct Cli {
    /// Deployment directory, or the root to search with --recursive
    pub path: PathBuf,

    /// Find every directory with a docker-compose-versions.yml below PATH
    /// and update each
    #[arg(short, long)]
    pub recursive: bool,

    /// Only show what would happen
    #[arg(short, long = "dry-run", alias = "dryrun")]
    pub dry_run: bool,

    /// Append log output to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub logfile: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short, long, alias = "verbosity", conflicts_with = "quiet")]
    pub verbose: bool,

    /// No output except errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Target platform for tags (overrides COMPOSE_UPDATE_PLATFORM)
    #[arg(long, value_name = "ID")]
    pub platform: Option<String>,
}

impl Cli {
    /// Default log level for the chosen verbosity.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }

    /// Install the global tracing subscriber. `RUST_LOG` takes precedence
    /// over the verbosity flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file cannot be opened.
    pub fn init_logging(&self) -> Result<()> {
        let level = self.log_level();
        let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        match &self.logfile {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("cannot open log file {}", path.display()))?;
                tracing_subscriber::fmt()
                    .with_env_filter(filter())
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .init();
            }
            None => {
                tracing_subscriber::fmt()
                    .with_env_filter(filter())
                    .with_writer(std::io::stderr)
                    .init();
            }
        }
        Ok(())
    }

    /// Execute the update run.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or an unanticipated
    /// failure ends the run. The error has already been reported through
    /// the notifier when one was set up.
    pub fn run(self) -> Result<ExitCode> {
        let mut config = load_from_env()?;
        if let Some(platform) = &self.platform {
            config.platform.clone_from(platform);
        }
        let settings = CycleSettings {
            host: host_label(&config),
            platform: config.target_platform()?,
            compose_command: config.compose_argv()?,
            dry_run: self.dry_run,
        };
        let path = std::path::absolute(&self.path)
            .with_context(|| format!("cannot resolve {}", self.path.display()))?;

        let registry = DockerHubRegistry::new(config.registry_base());
        let notifier: Box<dyn Notifier> = match &config.webhook_url {
            Some(url) => Box::new(WebhookNotifier::new(url.as_str())),
            None => Box::new(LogNotifier),
        };
        let updater = Updater::new(
            &LocalFs,
            &registry,
            &StdCommandRunner,
            notifier.as_ref(),
            &settings,
        );

        tracing::debug!(
            platform = %settings.platform,
            registry = %config.registry_base(),
            dry_run = settings.dry_run,
            "configuration loaded"
        );

        let result = if self.recursive {
            run_recursive(&updater, &path)
        } else {
            run_single(&updater, &path)
        };

        result.inspect_err(|e| {
            tracing::error!(error = %format!("{e:#}"), "unhandled error");
            if settings.dry_run {
                return;
            }
            notifier.deliver(&error_notice(&settings.host, &format!("{e:#}")));
        })
    }
}

fn run_single<F, R, C, N>(updater: &Updater<'_, F, R, C, N>, dir: &Path) -> Result<ExitCode>
where
    F: crate::application::ports::LocalFs,
    R: crate::application::ports::TagRegistry,
    C: crate::application::ports::CommandRunner,
    N: Notifier + ?Sized,
{
    match updater.run(dir)? {
        CycleOutcome::Fatal(_) => Ok(ExitCode::FAILURE),
        _ => Ok(ExitCode::SUCCESS),
    }
}

fn run_recursive<F, R, C, N>(updater: &Updater<'_, F, R, C, N>, root: &Path) -> Result<ExitCode>
where
    F: crate::application::ports::LocalFs,
    R: crate::application::ports::TagRegistry,
    C: crate::application::ports::CommandRunner,
    N: Notifier + ?Sized,
{
    let dirs = discover(root)?;
    if dirs.is_empty() {
        tracing::info!(root = %root.display(), "no deployment directories found");
    }

    let mut fatal = 0;
    for dir in &dirs {
        tracing::info!(dir = %dir.display(), "starting updater");
        if let CycleOutcome::Fatal(_) = updater.run(dir)? {
            fatal += 1;
        }
    }

    if fatal > 0 {
        tracing::error!(directories = fatal, "some directories could not be processed");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
