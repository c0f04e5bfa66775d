//! # Alert engine
//! Drives one run: forecast → thresholds → magnitude gate → history → debounce
//! → deliver → record. Every step after the fetch short-circuits on a "no",
//! and nothing is written unless a notification was actually delivered.
//!
//! A single deadline covers everything up to and including delivery. The
//! history append after a successful delivery runs outside it under its own
//! shorter bound, so a slow delivery never eats the time left for recording.
//! The append is stamped with the same clock reading the debounce used.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info};

use crate::debounce::Debounce;
use crate::decision::{debounce_against, gate_on_magnitude, Outcome};
use crate::error::{AlertError, Result};
use crate::forecast::{ForecastSource, NextHour};
use crate::history::NotificationHistory;
use crate::notify::{render_rain_message, NotificationSink, RainMessage};
use crate::thresholds::ThresholdStore;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub outcome: Outcome,
    pub forecast: NextHour,
    /// Set only when a notification was delivered (and recorded).
    pub message: Option<RainMessage>,
}

/// Result of the deadline-bound part of the run.
struct Delivered {
    outcome: Outcome,
    forecast: NextHour,
    message: Option<RainMessage>,
}

pub struct Alerter {
    forecast: Arc<dyn ForecastSource>,
    thresholds: Arc<dyn ThresholdStore>,
    history: Arc<dyn NotificationHistory>,
    sink: Arc<dyn NotificationSink>,
    debounce: Debounce,
    clock: Arc<dyn Clock>,
    run_timeout: Option<Duration>,
    record_timeout: Option<Duration>,
    message_seed: Option<u64>,
}

impl Alerter {
    pub fn new(
        forecast: Arc<dyn ForecastSource>,
        thresholds: Arc<dyn ThresholdStore>,
        history: Arc<dyn NotificationHistory>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            forecast,
            thresholds,
            history,
            sink,
            debounce: Debounce::default(),
            clock: Arc::new(SystemClock),
            run_timeout: None,
            record_timeout: None,
            message_seed: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.run_timeout = Some(limit);
        self
    }

    /// Bound on the history append that follows a delivery.
    pub fn with_record_timeout(mut self, limit: Duration) -> Self {
        self.record_timeout = Some(limit);
        self
    }

    /// Fix the message template choice (tests, previews).
    pub fn with_message_seed(mut self, seed: u64) -> Self {
        self.message_seed = Some(seed);
        self
    }

    pub async fn check_and_alert(&self, location: &str, tz: Tz) -> Result<RunReport> {
        let now = self.clock.now();
        let bounded = self.decide_and_deliver(location, tz, now);
        let done = match self.run_timeout {
            Some(limit) => tokio::time::timeout(limit, bounded)
                .await
                .map_err(|_| AlertError::Timeout(limit))??,
            None => bounded.await?,
        };

        if done.message.is_some() {
            let chance = done.forecast.hour.chance_of_rain;
            let write = self.history.record(chance, now);
            let recorded = match self.record_timeout {
                Some(limit) => tokio::time::timeout(limit, write)
                    .await
                    .map_err(|_| AlertError::Timeout(limit))
                    .and_then(|r| r),
                None => write.await,
            };
            if let Err(e) = recorded {
                // Delivery is not transactional with persistence; nothing to undo.
                error!(chance, error = %e, "notification delivered but not recorded");
                return Err(e);
            }
            info!(chance, "notification recorded");
        }

        Ok(RunReport {
            outcome: done.outcome,
            forecast: done.forecast,
            message: done.message,
        })
    }

    async fn decide_and_deliver(
        &self,
        location: &str,
        tz: Tz,
        now: DateTime<Utc>,
    ) -> Result<Delivered> {
        let forecast = self.forecast.fetch_next_hour(location, tz).await?;
        let hour = &forecast.hour;
        info!(
            location = %forecast.location_name,
            time = %hour.time,
            chance = hour.chance_of_rain,
            precip_mm = hour.precipitation_mm,
            "next-hour forecast"
        );
        if let Some(at) = hour.starts_at() {
            debug!(forecast_for = %at.format("%d %b %y %H:%M"), "forecast slot");
        }

        let thresholds = self.thresholds.thresholds().await?;
        debug!(
            drizzle = thresholds.drizzle(),
            rain_before = thresholds.rain_before(),
            "thresholds loaded"
        );

        if let Some(outcome) = gate_on_magnitude(hour, &thresholds) {
            info!(chance = hour.chance_of_rain, %outcome, "chance of rain too low, not notifying");
            return Ok(Delivered {
                outcome,
                forecast,
                message: None,
            });
        }

        let last = self.history.last_event().await?;
        let outcome = debounce_against(&thresholds, last.as_ref(), &self.debounce, now);
        if !outcome.should_notify() {
            info!(
                last_chance = last.map(|ev| ev.chance_of_rain),
                %outcome,
                "recent rain alert already sent, skipping notification"
            );
            return Ok(Delivered {
                outcome,
                forecast,
                message: None,
            });
        }

        let message = self.render(&forecast);
        self.sink.deliver(&message).await?;

        Ok(Delivered {
            outcome,
            forecast,
            message: Some(message),
        })
    }

    fn render(&self, forecast: &NextHour) -> RainMessage {
        let body = match self.message_seed {
            Some(seed) => render_rain_message(
                &mut StdRng::seed_from_u64(seed),
                &forecast.location_name,
                &forecast.hour,
            ),
            None => render_rain_message(&mut rand::rng(), &forecast.location_name, &forecast.hour),
        };
        RainMessage::rain_alert(body)
    }
}
