//! Notices handed to the notification channel.

use std::fmt::Write as _;
use std::path::Path;

use crate::domain::service::Service;

const APP_TAG: &str = "compose-update";

/// A message for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub subject: String,
    pub body: String,
}

/// Summary of one cycle: what was applied and what was only detected.
#[must_use]
pub fn update_summary<'a>(
    dir: &Path,
    host: &str,
    applied: impl IntoIterator<Item = &'a Service>,
    detected: impl IntoIterator<Item = &'a Service>,
) -> Notice {
    let mut body = format!("Updates in directory {} on {host}\n", dir.display());

    let mut applied = applied.into_iter().peekable();
    if applied.peek().is_some() {
        body.push_str("\nThe following updates were found and automatically applied:\n\n");
        for service in applied {
            push_change(&mut body, service);
        }
    }

    let mut detected = detected.into_iter().peekable();
    if detected.peek().is_some() {
        body.push_str(
            "\nThe following updates were found but not applied, as they are \
             configured for manual updates only:\n\n",
        );
        for service in detected {
            push_change(&mut body, service);
        }
    }

    Notice {
        subject: format!("[{APP_TAG}][{host}] Service update for {}", dir.display()),
        body,
    }
}

/// Error report for anything the operator has to look at.
#[must_use]
pub fn error_notice(host: &str, message: &str) -> Notice {
    Notice {
        subject: format!("[{APP_TAG}][{host}] Error in {APP_TAG}"),
        body: format!("The following error occurred:\n{message}"),
    }
}

fn push_change(body: &mut String, service: &Service) {
    let _ = writeln!(
        body,
        "{}:\n  Old: {}\n  New: {}",
        service.name,
        service.current_version,
        service.next_version()
    );
}
