//! The last alert sent, as consulted by the debounce window.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::error::{AlertError, Result};

/// Record of one delivered alert. Append-only; never updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationEvent {
    /// Chance of rain (%) that triggered the alert.
    pub chance_of_rain: u8,
    /// Seconds resolution.
    pub created_at: DateTime<Utc>,
}

impl NotificationEvent {
    pub fn new(chance_of_rain: u8, created_at: DateTime<Utc>) -> Self {
        Self {
            chance_of_rain,
            created_at,
        }
    }

    /// Rebuild from a stored `(state, created_at_epoch_secs)` row.
    pub fn from_row(state: i64, created_at: i64) -> Result<Self> {
        let chance_of_rain = u8::try_from(state)
            .ok()
            .filter(|c| *c <= 100)
            .ok_or_else(|| AlertError::Store(format!("history state {state} outside 0..=100")))?;
        let created_at = Utc
            .timestamp_opt(created_at, 0)
            .single()
            .ok_or_else(|| AlertError::Store(format!("history created_at {created_at} out of range")))?;
        Ok(Self {
            chance_of_rain,
            created_at,
        })
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.created_at)
    }
}

#[async_trait::async_trait]
pub trait NotificationHistory: Send + Sync {
    /// Most recently created event, `None` when nothing was ever recorded.
    async fn last_event(&self) -> Result<Option<NotificationEvent>>;

    /// Append a new event stamped `at` (seconds resolution). Callers pass the
    /// same clock reading they judge the debounce window with.
    async fn record(&self, chance_of_rain: u8, at: DateTime<Utc>) -> Result<()>;
}
