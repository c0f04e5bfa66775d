//! # Forecast
//! The single hour-of-interest evaluated by each run, plus the source seam.

pub mod weatherapi;

use chrono::{NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::{AlertError, Result};

/// How far ahead of "now" the evaluated slot lies.
pub const CHECK_AHEAD_HOURS: u32 = 1;

/// Layout of the hourly `time` field, e.g. "2025-07-10 14:00".
pub const HOUR_TIME_LAYOUT: &str = "%Y-%m-%d %H:%M";

/// One hourly forecast entry. Immutable once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastHour {
    /// Local wall-clock label as delivered by the provider.
    pub time: String,
    pub precipitation_mm: f64,
    pub chance_of_rain: u8,
    pub will_it_rain: bool,
}

impl ForecastHour {
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.time, HOUR_TIME_LAYOUT).ok()
    }
}

/// The next-hour slot together with the resolved location name used in messages.
#[derive(Debug, Clone, PartialEq)]
pub struct NextHour {
    pub location_name: String,
    pub hour: ForecastHour,
}

#[async_trait::async_trait]
pub trait ForecastSource: Send + Sync {
    /// `tz` is the zone whose wall clock picks the slot.
    async fn fetch_next_hour(&self, location: &str, tz: Tz) -> Result<NextHour>;
}

/// Index into a 24-entry day for the slot `CHECK_AHEAD_HOURS` after `current_hour`.
/// Wraps so that 23:00 looks at slot 0.
pub fn next_hour_index(current_hour: u32) -> usize {
    ((current_hour + CHECK_AHEAD_HOURS) % 24) as usize
}

pub fn resolve_timezone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|e| AlertError::Config(format!("invalid timezone `{name}`: {e}")))
}

/// Current hour of day (0-23) on the wall clock of `tz`.
pub fn local_hour_now(tz: Tz) -> u32 {
    Utc::now().with_timezone(&tz).hour()
}
