//! Named alerting thresholds, loaded fresh every run.
//!
//! Only two keys matter: [`DRIZZLE_THRESHOLD`] gates whether a forecast is
//! worth mentioning at all, [`RAIN_BEFORE_THRESHOLD`] decides whether a recent
//! alert was already severe enough to suppress another one. A key without a
//! row is *undefined*; callers resolve it through the `effective_*` accessors,
//! which apply the policy constants below and say so in the log.

use std::collections::BTreeMap;

use crate::error::{AlertError, Result};

pub const DRIZZLE_THRESHOLD: &str = "drizzleThreshold";
pub const RAIN_BEFORE_THRESHOLD: &str = "rainBeforeThreshold";

/// Undefined drizzle threshold: every forecast passes the magnitude gate.
pub const UNDEFINED_DRIZZLE_POLICY: u8 = 0;

/// Undefined rain-before threshold: any recent alert with a chance above 0%
/// suppresses a new one inside the debounce window.
pub const UNDEFINED_RAIN_BEFORE_POLICY: u8 = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThresholdSet {
    // Recognized keys always hold 0..=100; unknown keys keep their stored value.
    values: BTreeMap<String, i64>,
}

impl ThresholdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw `(name, value)` rows as stored. Any unparsable value
    /// fails the whole set; recognized keys must also lie in 0..=100.
    pub fn from_rows<I, K, V>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut set = Self::new();
        for (name, raw) in rows {
            let name = name.into();
            let raw = raw.as_ref();
            let parsed: i64 = raw.trim().parse().map_err(|e| {
                AlertError::Store(format!("threshold `{name}` has non-numeric value `{raw}`: {e}"))
            })?;
            if is_recognized(&name) && !(0..=100).contains(&parsed) {
                return Err(AlertError::Store(format!(
                    "threshold `{name}` = {parsed} outside 0..=100"
                )));
            }
            set.values.insert(name, parsed);
        }
        Ok(set)
    }

    /// Builder used by tests and seeding code.
    pub fn with(mut self, name: &str, value: u8) -> Self {
        self.values.insert(name.to_string(), i64::from(value.min(100)));
        self
    }

    /// Raw stored value, unknown keys included.
    pub fn get(&self, name: &str) -> Option<i64> {
        self.values.get(name).copied()
    }

    fn percent(&self, name: &str) -> Option<u8> {
        self.get(name).and_then(|v| u8::try_from(v).ok())
    }

    pub fn drizzle(&self) -> Option<u8> {
        self.percent(DRIZZLE_THRESHOLD)
    }

    pub fn rain_before(&self) -> Option<u8> {
        self.percent(RAIN_BEFORE_THRESHOLD)
    }

    pub fn effective_drizzle(&self) -> u8 {
        self.drizzle().unwrap_or_else(|| {
            tracing::warn!(
                key = DRIZZLE_THRESHOLD,
                policy_default = UNDEFINED_DRIZZLE_POLICY,
                "threshold undefined, applying policy default"
            );
            UNDEFINED_DRIZZLE_POLICY
        })
    }

    pub fn effective_rain_before(&self) -> u8 {
        self.rain_before().unwrap_or_else(|| {
            tracing::warn!(
                key = RAIN_BEFORE_THRESHOLD,
                policy_default = UNDEFINED_RAIN_BEFORE_POLICY,
                "threshold undefined, applying policy default"
            );
            UNDEFINED_RAIN_BEFORE_POLICY
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

fn is_recognized(name: &str) -> bool {
    name == DRIZZLE_THRESHOLD || name == RAIN_BEFORE_THRESHOLD
}

#[async_trait::async_trait]
pub trait ThresholdStore: Send + Sync {
    /// Every stored threshold. Empty when nothing is stored; no defaults are invented here.
    async fn thresholds(&self) -> Result<ThresholdSet>;
}
