//! Run configuration from the process environment (a local `.env` is loaded
//! by the binary first). Validation is eager: nothing else runs until every
//! required key is present and the timezone resolves.

use std::fmt;
use std::time::Duration;

use chrono_tz::Tz;

use crate::error::{AlertError, Result};
use crate::forecast::resolve_timezone;
use crate::forecast::weatherapi::DEFAULT_FORECAST_URL;
use crate::notify::ntfy::DEFAULT_NTFY_URL;

pub const ENV_WEATHER_API_KEY: &str = "WEATHER_API_KEY";
pub const ENV_PUSH_TOPIC: &str = "PUSH_NOTIFICATION_TOPIC";
pub const ENV_DB_URL: &str = "DB_URL";
pub const ENV_LOCATION: &str = "LOCATION";
pub const ENV_TIMEZONE: &str = "TIMEZONE";
pub const ENV_WEATHER_API_URL: &str = "WEATHER_API_URL";
pub const ENV_NTFY_URL: &str = "NTFY_URL";
pub const ENV_RUN_TIMEOUT_SECS: &str = "RUN_TIMEOUT_SECS";
pub const ENV_LEASE_TTL_SECS: &str = "LEASE_TTL_SECS";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

const REQUIRED: [&str; 5] = [
    ENV_WEATHER_API_KEY,
    ENV_PUSH_TOPIC,
    ENV_DB_URL,
    ENV_LOCATION,
    ENV_TIMEZONE,
];

fn default_run_timeout_secs() -> u64 {
    30
}
fn default_lease_ttl_secs() -> u64 {
    300
}
const MAX_LEASE_TTL_SECS: u64 = 86_400;

/// Bound on the history append after delivery. The lease must outlive the run
/// deadline plus this.
pub const RECORD_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(AlertError::Config(format!(
                "{ENV_LOG_FORMAT} must be `pretty` or `json`, got `{other}`"
            ))),
        }
    }
}

#[derive(Clone)]
pub struct RunConfig {
    pub weather_api_key: String,
    pub push_topic: String,
    pub db_url: String,
    pub location: String,
    pub tz: Tz,
    pub weather_api_url: String,
    pub ntfy_url: String,
    pub run_timeout: Duration,
    pub lease_ttl_secs: u64,
    pub log_format: LogFormat,
}

// Keep the API key out of logs; only its length is useful for diagnostics.
impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("weather_api_key_len", &self.weather_api_key.len())
            .field("push_topic", &self.push_topic)
            .field("db_url", &self.db_url)
            .field("location", &self.location)
            .field("tz", &self.tz)
            .field("weather_api_url", &self.weather_api_url)
            .field("ntfy_url", &self.ntfy_url)
            .field("run_timeout", &self.run_timeout)
            .field("lease_ttl_secs", &self.lease_ttl_secs)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl RunConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. All missing required keys are reported together.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let missing: Vec<&str> = REQUIRED.iter().copied().filter(|&k| get(k).is_none()).collect();
        if !missing.is_empty() {
            return Err(AlertError::Config(format!(
                "missing required env vars: {}",
                missing.join(", ")
            )));
        }
        let required = |key: &str| get(key).unwrap_or_default();

        let tz = resolve_timezone(&required(ENV_TIMEZONE))?;

        let run_timeout_secs = positive_u64(ENV_RUN_TIMEOUT_SECS, get(ENV_RUN_TIMEOUT_SECS))?
            .unwrap_or_else(default_run_timeout_secs);
        let lease_ttl_secs = positive_u64(ENV_LEASE_TTL_SECS, get(ENV_LEASE_TTL_SECS))?
            .unwrap_or_else(default_lease_ttl_secs);
        if lease_ttl_secs > MAX_LEASE_TTL_SECS {
            return Err(AlertError::Config(format!(
                "{ENV_LEASE_TTL_SECS} must not exceed {MAX_LEASE_TTL_SECS}, got {lease_ttl_secs}"
            )));
        }
        // A run that outlives its lease lets an overlapping run in.
        let longest_run_secs = run_timeout_secs.saturating_add(RECORD_TIMEOUT_SECS);
        if lease_ttl_secs <= longest_run_secs {
            return Err(AlertError::Config(format!(
                "{ENV_LEASE_TTL_SECS} ({lease_ttl_secs}) must exceed {ENV_RUN_TIMEOUT_SECS} \
                 plus {RECORD_TIMEOUT_SECS}s for recording ({longest_run_secs})"
            )));
        }
        let log_format = match get(ENV_LOG_FORMAT) {
            Some(raw) => LogFormat::parse(&raw)?,
            None => LogFormat::default(),
        };

        Ok(Self {
            weather_api_key: required(ENV_WEATHER_API_KEY),
            push_topic: required(ENV_PUSH_TOPIC),
            db_url: required(ENV_DB_URL),
            location: required(ENV_LOCATION),
            tz,
            weather_api_url: get(ENV_WEATHER_API_URL)
                .unwrap_or_else(|| DEFAULT_FORECAST_URL.to_string()),
            ntfy_url: get(ENV_NTFY_URL).unwrap_or_else(|| DEFAULT_NTFY_URL.to_string()),
            run_timeout: Duration::from_secs(run_timeout_secs),
            lease_ttl_secs,
            log_format,
        })
    }
}

fn positive_u64(key: &str, raw: Option<String>) -> Result<Option<u64>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.parse::<u64>() {
        Ok(v) if v > 0 => Ok(Some(v)),
        _ => Err(AlertError::Config(format!(
            "{key} must be a positive integer, got `{raw}`"
        ))),
    }
}
