//! Notification infrastructure: implementations of the `Notifier` port.
//!
//! Delivery failures are logged here and never returned to the caller.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::application::ports::Notifier;
use crate::domain::Notice;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// JSON body posted to the webhook.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    subject: &'a str,
    body: &'a str,
}

/// Posts each notice as `{"subject": .., "body": ..}` to a fixed URL.
pub struct WebhookNotifier {
    url: String,
    agent: ureq::Agent,
}

impl WebhookNotifier {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
        }
    }

    fn post(&self, notice: &Notice) -> Result<()> {
        let payload = serde_json::to_string(&WebhookPayload {
            subject: &notice.subject,
            body: &notice.body,
        })
        .context("serializing notice")?;
        match self
            .agent
            .post(&self.url)
            .set("Content-Type", "application/json")
            .send_string(&payload)
        {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(code, _)) => {
                anyhow::bail!("webhook returned HTTP {code}")
            }
            Err(e) => Err(anyhow::Error::new(e).context("posting to webhook")),
        }
    }
}

impl Notifier for WebhookNotifier {
    fn deliver(&self, notice: &Notice) {
        match self.post(notice) {
            Ok(()) => tracing::debug!(subject = %notice.subject, "notice delivered"),
            Err(e) => tracing::error!(
                subject = %notice.subject,
                url = %self.url,
                error = %format!("{e:#}"),
                "could not deliver notice"
            ),
        }
    }
}

/// Writes notices to the log; used when no webhook is configured.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn deliver(&self, notice: &Notice) {
        tracing::info!(subject = %notice.subject, "{}", notice.body);
    }
}
