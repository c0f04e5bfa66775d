use std::time::Duration;

use reqwest::{Client, StatusCode};

use super::{NotificationSink, RainMessage};
use crate::error::{AlertError, Result};

pub const DEFAULT_NTFY_URL: &str = "https://ntfy.sh";

/// Push sink for an ntfy-style topic: `POST {base}/{topic}` with a plain-text body.
/// Single attempt; retries are left to the next scheduled run.
#[derive(Clone)]
pub struct NtfyNotifier {
    base_url: String,
    topic: String,
    client: Client,
    timeout: Duration,
}

impl NtfyNotifier {
    pub fn new(base_url: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            topic: topic.into(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn topic_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.topic)
    }
}

/// Only 200 and 202 count as delivered.
pub fn is_delivered(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::ACCEPTED
}

#[async_trait::async_trait]
impl NotificationSink for NtfyNotifier {
    async fn deliver(&self, msg: &RainMessage) -> Result<()> {
        let rsp = self
            .client
            .post(self.topic_url())
            .timeout(self.timeout)
            .header("Title", msg.title.as_str())
            .header("Tags", msg.tags.as_str())
            .body(msg.body.clone())
            .send()
            .await
            .map_err(|e| AlertError::upstream("sending notification", e))?;

        let status = rsp.status();
        if !is_delivered(status) {
            return Err(AlertError::Upstream(format!("notification failed: {status}")));
        }

        tracing::info!(topic = %self.topic, %status, "notification sent");
        tracing::debug!(body = %msg.body, "notification body");
        Ok(())
    }
}
