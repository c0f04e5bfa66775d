//! Error taxonomy for a single alert run.
//!
//! Every variant is fatal for the run. Only a `Store` error raised by the
//! history append can occur after a notification has already been delivered.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlertError {
    /// Bad or missing input (unknown timezone, missing env var, ...).
    #[error("config error: {0}")]
    Config(String),
    /// Forecast fetch or notification delivery failed at the transport/HTTP level.
    #[error("upstream error: {0}")]
    Upstream(String),
    /// Forecast payload is missing the structure we rely on.
    #[error("malformed forecast data: {0}")]
    MalformedData(String),
    /// Threshold or history read/write failure.
    #[error("store error: {0}")]
    Store(String),
    #[error("run lease `{name}` is held by {holder} until {expires_at}")]
    LeaseHeld {
        name: String,
        holder: String,
        expires_at: i64,
    },
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl AlertError {
    pub fn store(context: &str, err: impl std::fmt::Display) -> Self {
        AlertError::Store(format!("{context}: {err}"))
    }

    pub fn upstream(context: &str, err: impl std::fmt::Display) -> Self {
        AlertError::Upstream(format!("{context}: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, AlertError>;
