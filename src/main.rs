//! Rain alert binary entrypoint.
//! Performs exactly one run (fetch, decide, maybe notify) and exits.
//! Scheduling is external (cron, systemd timer, CI schedule, ...).

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rain_alert::config::LogFormat;
use rain_alert::{AlertError, RunConfig};

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rain_alert=info,warn"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer().compact()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();

    let cfg = RunConfig::from_env().context("loading configuration")?;
    init_tracing(cfg.log_format);
    tracing::debug!(config = ?cfg, "configuration loaded");

    if let Err(e) = rain_alert::run(&cfg).await {
        log_run_failure(&e);
        return Err(anyhow::Error::new(e).context("rain alert run"));
    }
    Ok(())
}

// Goes through the subscriber so JSON mode carries the failure too.
fn log_run_failure(err: &AlertError) {
    tracing::error!(error = %err, "rain alert run failed");
}
