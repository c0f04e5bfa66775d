//! Run-level lease. The debounce check is only race-free when at most one run
//! is active, so a run takes this lease before touching any collaborator and
//! drops it when done. A crashed run's lease simply expires.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use super::Store;
use crate::error::{AlertError, Result};

pub const RUN_LEASE_NAME: &str = "rain-alert";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLease {
    pub name: String,
    pub holder: String,
    pub expires_at: DateTime<Utc>,
}

/// Holder id for this process.
pub fn default_holder() -> String {
    let host = std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
    format!("{host}:{}", std::process::id())
}

impl Store {
    /// Take `name` for `ttl` starting at `now`. Succeeds when the lease is free,
    /// expired, or already ours; otherwise `LeaseHeld`.
    pub async fn acquire_lease(
        &self,
        name: &str,
        holder: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<RunLease> {
        let expires_at = now + ttl;
        let res = sqlx::query(
            "INSERT INTO run_lease(name, holder, expires_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE
                SET holder = excluded.holder, expires_at = excluded.expires_at
                WHERE run_lease.expires_at <= ?4 OR run_lease.holder = excluded.holder",
        )
        .bind(name)
        .bind(holder)
        .bind(expires_at.timestamp())
        .bind(now.timestamp())
        .execute(self.pool())
        .await
        .map_err(|e| AlertError::store("acquiring run lease", e))?;

        if res.rows_affected() == 1 {
            debug!(name, holder, until = %expires_at, "run lease acquired");
            return Ok(RunLease {
                name: name.to_string(),
                holder: holder.to_string(),
                expires_at,
            });
        }

        let (current, until): (String, i64) =
            sqlx::query_as("SELECT holder, expires_at FROM run_lease WHERE name = ?")
                .bind(name)
                .fetch_one(self.pool())
                .await
                .map_err(|e| AlertError::store("reading run lease", e))?;
        warn!(name, holder = %current, until, "run lease busy");
        Err(AlertError::LeaseHeld {
            name: name.to_string(),
            holder: current,
            expires_at: until,
        })
    }

    /// Drop the lease if we still hold it. Returns whether a row was removed.
    pub async fn release_lease(&self, lease: &RunLease) -> Result<bool> {
        let res = sqlx::query("DELETE FROM run_lease WHERE name = ? AND holder = ?")
            .bind(&lease.name)
            .bind(&lease.holder)
            .execute(self.pool())
            .await
            .map_err(|e| AlertError::store("releasing run lease", e))?;
        Ok(res.rows_affected() == 1)
    }
}
