//! # Decision
//! Pure, testable logic that maps `(forecast hour, thresholds, last alert, now)` → `Outcome`.
//! No I/O; the engine drives the two steps separately so that history is only
//! read once the magnitude gate has passed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::debounce::Debounce;
use crate::forecast::ForecastHour;
use crate::history::NotificationEvent;
use crate::thresholds::ThresholdSet;

/// Result of one run's evaluation. Ephemeral, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    SkipLowChance,
    SkipDebounced,
    Notify,
}

impl Outcome {
    pub fn should_notify(self) -> bool {
        matches!(self, Outcome::Notify)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::SkipLowChance => "skip-low-chance",
            Outcome::SkipDebounced => "skip-debounced",
            Outcome::Notify => "notify",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step 1. `Some(SkipLowChance)` terminates the run; `None` means "go on to the debounce step".
pub fn gate_on_magnitude(hour: &ForecastHour, thresholds: &ThresholdSet) -> Option<Outcome> {
    let drizzle = thresholds.effective_drizzle();
    if hour.chance_of_rain < drizzle {
        Some(Outcome::SkipLowChance)
    } else {
        None
    }
}

/// Step 2, evaluated only after step 1 passed.
pub fn debounce_against(
    thresholds: &ThresholdSet,
    last: Option<&NotificationEvent>,
    debounce: &Debounce,
    now: DateTime<Utc>,
) -> Outcome {
    // Resolve (and warn about) an undefined ceiling only when there is something to compare.
    let Some(ev) = last else {
        return Outcome::Notify;
    };
    if debounce.is_stale(ev, now) {
        tracing::info!(
            last_chance = ev.chance_of_rain,
            last_at = %ev.created_at,
            "last notification is older than the debounce window, ignoring it"
        );
        return Outcome::Notify;
    }
    let rain_before = thresholds.effective_rain_before();
    if debounce.should_notify(Some(ev), rain_before, now) {
        Outcome::Notify
    } else {
        Outcome::SkipDebounced
    }
}
