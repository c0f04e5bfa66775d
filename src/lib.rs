// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod debounce;
pub mod decision;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod history;
pub mod notify;
pub mod store;
pub mod thresholds;

// ---- Re-exports for stable public API ----
pub use crate::config::RunConfig;
pub use crate::decision::Outcome;
pub use crate::engine::{Alerter, RunReport};
pub use crate::error::{AlertError, Result};

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::RECORD_TIMEOUT_SECS;
use crate::forecast::weatherapi::WeatherApiClient;
use crate::notify::ntfy::NtfyNotifier;
use crate::store::lease::{default_holder, RUN_LEASE_NAME};
use crate::store::Store;

/// One complete run against the real collaborators described by `cfg`.
///
/// Takes the run lease before any forecast/threshold/history I/O and releases
/// it afterwards whatever the outcome. Overlapping runs fail with `LeaseHeld`.
pub async fn run(cfg: &RunConfig) -> Result<RunReport> {
    let store = Store::connect(&cfg.db_url).await?;
    store.ensure_schema().await?;

    let holder = default_holder();
    let ttl = chrono::Duration::seconds(cfg.lease_ttl_secs as i64);
    let lease = store
        .acquire_lease(RUN_LEASE_NAME, &holder, ttl, chrono::Utc::now())
        .await?;

    let alerter = Alerter::new(
        Arc::new(WeatherApiClient::new(&cfg.weather_api_url, &cfg.weather_api_key)),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(NtfyNotifier::new(&cfg.ntfy_url, &cfg.push_topic)),
    )
    .with_timeout(cfg.run_timeout)
    .with_record_timeout(Duration::from_secs(RECORD_TIMEOUT_SECS));

    let result = alerter.check_and_alert(&cfg.location, cfg.tz).await;

    match store.release_lease(&lease).await {
        Ok(true) => {}
        Ok(false) => warn!(holder = %lease.holder, "run lease was taken over before release"),
        Err(e) => warn!(error = %e, "failed to release run lease"),
    }
    store.close().await;

    if let Ok(report) = &result {
        info!(outcome = %report.outcome, "run finished");
    }
    result
}
