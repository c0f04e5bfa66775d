// tests/common/mod.rs
// In-memory collaborators for driving the engine without network or database.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;

use rain_alert::engine::Clock;
use rain_alert::error::{AlertError, Result};
use rain_alert::forecast::{ForecastHour, ForecastSource, NextHour};
use rain_alert::history::{NotificationEvent, NotificationHistory};
use rain_alert::notify::{NotificationSink, RainMessage};
use rain_alert::thresholds::{ThresholdSet, ThresholdStore};

pub fn t_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 10, 9, 30, 0).unwrap()
}

pub fn next_hour(chance: u8) -> NextHour {
    NextHour {
        location_name: "Zaragoza".into(),
        hour: ForecastHour {
            time: "2025-07-10 10:00".into(),
            precipitation_mm: 2.5,
            chance_of_rain: chance,
            will_it_rain: chance >= 50,
        },
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

// --- forecast ---

pub struct FakeForecast {
    pub result: Result<NextHour>,
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
}

impl FakeForecast {
    pub fn ok(chance: u8) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(next_hour(chance)),
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(err: AlertError) -> Arc<Self> {
        Arc::new(Self {
            result: Err(err),
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn slow(chance: u8, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(next_hour(chance)),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ForecastSource for FakeForecast {
    async fn fetch_next_hour(&self, _location: &str, _tz: Tz) -> Result<NextHour> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        match &self.result {
            Ok(h) => Ok(h.clone()),
            Err(e) => Err(clone_err(e)),
        }
    }
}

// --- thresholds ---

pub struct FakeThresholds {
    pub set: Option<ThresholdSet>,
    pub calls: AtomicUsize,
}

impl FakeThresholds {
    pub fn with(set: ThresholdSet) -> Arc<Self> {
        Arc::new(Self {
            set: Some(set),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            set: None,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ThresholdStore for FakeThresholds {
    async fn thresholds(&self) -> Result<ThresholdSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.set
            .clone()
            .ok_or_else(|| AlertError::Store("conversion error: invalid digit".into()))
    }
}

// --- history ---

pub struct FakeHistory {
    pub events: Mutex<Vec<NotificationEvent>>,
    pub fail_read: bool,
    pub fail_record: bool,
    pub record_delay: Option<Duration>,
    pub reads: AtomicUsize,
}

impl FakeHistory {
    pub fn empty() -> Arc<Self> {
        Self::build(Vec::new(), false, false)
    }

    pub fn with_event(ev: NotificationEvent) -> Arc<Self> {
        Self::build(vec![ev], false, false)
    }

    pub fn failing_record() -> Arc<Self> {
        Self::build(Vec::new(), false, true)
    }

    pub fn failing_read() -> Arc<Self> {
        Self::build(Vec::new(), true, false)
    }

    pub fn slow_record(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
            fail_read: false,
            fail_record: false,
            record_delay: Some(delay),
            reads: AtomicUsize::new(0),
        })
    }

    fn build(events: Vec<NotificationEvent>, fail_read: bool, fail_record: bool) -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(events),
            fail_read,
            fail_record,
            record_delay: None,
            reads: AtomicUsize::new(0),
        })
    }

    pub fn recorded(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationHistory for FakeHistory {
    async fn last_event(&self) -> Result<Option<NotificationEvent>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_read {
            return Err(AlertError::Store("querying last notification: locked".into()));
        }
        Ok(self.events.lock().unwrap().last().copied())
    }

    async fn record(&self, chance_of_rain: u8, at: DateTime<Utc>) -> Result<()> {
        if let Some(d) = self.record_delay {
            tokio::time::sleep(d).await;
        }
        if self.fail_record {
            return Err(AlertError::Store("inserting notification: disk full".into()));
        }
        self.events
            .lock()
            .unwrap()
            .push(NotificationEvent::new(chance_of_rain, at));
        Ok(())
    }
}

// --- sink ---

pub struct FakeSink {
    pub sent: Mutex<Vec<RainMessage>>,
    pub fail: bool,
    pub delay: Option<Duration>,
}

impl FakeSink {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail: false,
            delay: None,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
            delay: None,
        })
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail: false,
            delay: Some(delay),
        })
    }

    pub fn sent(&self) -> Vec<RainMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for FakeSink {
    async fn deliver(&self, msg: &RainMessage) -> Result<()> {
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        if self.fail {
            return Err(AlertError::Upstream("notification failed: 500 Internal Server Error".into()));
        }
        self.sent.lock().unwrap().push(msg.clone());
        Ok(())
    }
}

fn clone_err(e: &AlertError) -> AlertError {
    match e {
        AlertError::Config(s) => AlertError::Config(s.clone()),
        AlertError::Upstream(s) => AlertError::Upstream(s.clone()),
        AlertError::MalformedData(s) => AlertError::MalformedData(s.clone()),
        AlertError::Store(s) => AlertError::Store(s.clone()),
        other => AlertError::Upstream(other.to_string()),
    }
}
