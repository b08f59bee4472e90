//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `StdCommandRunner` blocks until the child exits. There is no timeout; a
//! hanging compose command blocks the cycle.

use std::path::Path;
use std::process::{Command, Output, Stdio};

use anyhow::{Context, Result};

use crate::application::ports::CommandRunner;

/// Production `CommandRunner` backed by `std::process`.
pub struct StdCommandRunner;

impl CommandRunner for StdCommandRunner {
    fn run(&self, dir: &Path, program: &str, args: &[&str]) -> Result<Output> {
        Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("failed to spawn {program}"))
    }
}
