//! compose-update - keep docker-compose image tags in sync with their registry

#![cfg_attr(test, allow(clippy::expect_used))]

use std::process::ExitCode;

use clap::Parser;

use compose_update_cli::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = cli.init_logging() {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }
    match cli.run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
