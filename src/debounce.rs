use chrono::{DateTime, Duration, Utc};

use crate::history::NotificationEvent;

/// Length of the window in which a severe recent alert suppresses new ones.
pub const DEBOUNCE_WINDOW_SECS: i64 = 3_600;

/// Debounce gate over the most recent alert.
/// - No prior alert: notify.
/// - Prior alert older than the window: notify, whatever its value.
/// - Inside the window: suppress only if the *stored* chance exceeds the rain-before threshold.
#[derive(Debug, Clone, Copy)]
pub struct Debounce {
    window: Duration,
}

impl Default for Debounce {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW_SECS)
    }
}

impl Debounce {
    /// `window_secs` < 0 is treated as 0 (no window).
    pub fn new(window_secs: i64) -> Self {
        Self {
            window: Duration::seconds(window_secs.max(0)),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// True when `last` is stale at `now` and must be ignored.
    pub fn is_stale(&self, last: &NotificationEvent, now: DateTime<Utc>) -> bool {
        last.age(now) > self.window
    }

    /// Check whether we may alert at `now`. Does NOT mutate anything.
    pub fn should_notify(
        &self,
        last: Option<&NotificationEvent>,
        rain_before: u8,
        now: DateTime<Utc>,
    ) -> bool {
        match last {
            None => true,
            Some(ev) if self.is_stale(ev, now) => true,
            Some(ev) => ev.chance_of_rain <= rain_before,
        }
    }
}
