pub mod message;
pub mod ntfy;

use crate::error::Result;

pub use message::render_rain_message;

pub const RAIN_ALERT_TITLE: &str = "Rain Alert";
pub const RAIN_ALERT_TAGS: &str = "umbrella,robot";

/// A rendered push message. Plain-text body plus channel metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RainMessage {
    pub title: String,
    pub tags: String,
    pub body: String,
}

impl RainMessage {
    pub fn rain_alert(body: impl Into<String>) -> Self {
        Self {
            title: RAIN_ALERT_TITLE.to_string(),
            tags: RAIN_ALERT_TAGS.to_string(),
            body: body.into(),
        }
    }
}

#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver `msg`. `Ok` only once the channel accepted it.
    async fn deliver(&self, msg: &RainMessage) -> Result<()>;
}
