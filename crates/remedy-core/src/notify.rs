//! Outbound notification channel used by the `notify_slack` effect.

use std::time::Duration;

use serde_json::json;

use crate::config::{NotifyConfig, MAX_NOTIFY_TIMEOUT_SECS};
use crate::error::{EffectError, RemedyError, Result};

/// Delivers a message to a named channel. A failed delivery is an effect fault.
pub trait Notifier: Send + Sync {
    fn send(&self, channel: &str, message: &str) -> std::result::Result<(), EffectError>;
}

/// Posts to a Slack incoming webhook.
///
/// Every request is bounded by a timeout of at most five seconds. Must be
/// constructed and dropped outside an async runtime (it owns a blocking
/// client).
pub struct SlackNotifier {
    webhook_url: String,
    timeout: Duration,
    client: reqwest::blocking::Client,
}

impl SlackNotifier {
    pub fn new(webhook_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let timeout = timeout.min(Duration::from_secs(MAX_NOTIFY_TIMEOUT_SECS));
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemedyError::NotifierSetup(e.to_string()))?;
        Ok(Self {
            webhook_url: webhook_url.into(),
            timeout,
            client,
        })
    }

    /// Build a notifier from config. `None` when no webhook is configured.
    pub fn from_config(cfg: &NotifyConfig) -> Result<Option<Self>> {
        match cfg.slack_webhook_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(Some(Self::new(
                url,
                Duration::from_secs(cfg.timeout_seconds.max(1)),
            )?)),
            _ => Ok(None),
        }
    }
}

impl Notifier for SlackNotifier {
    fn send(&self, channel: &str, message: &str) -> std::result::Result<(), EffectError> {
        let body = json!({ "channel": channel, "text": message });
        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    EffectError::Timeout(self.timeout.as_secs())
                } else {
                    EffectError::Notify(e.to_string())
                }
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(EffectError::Notify(format!("webhook returned {status}")));
        }
        Ok(())
    }
}
