//! SQLite persistence: thresholds, append-only notification history and the run lease.
//!
//! The store owns its rows exclusively; nothing else writes these tables.

pub mod lease;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{AlertError, Result};
use crate::history::{NotificationEvent, NotificationHistory};
use crate::thresholds::{ThresholdSet, ThresholdStore};

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS weather_config (
        config TEXT PRIMARY KEY,
        value  TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS weather_notifications (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        state      INTEGER NOT NULL,
        created_at INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS run_lease (
        name       TEXT PRIMARY KEY,
        holder     TEXT NOT NULL,
        expires_at INTEGER NOT NULL
    )",
];

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open the database at `url` (e.g. `sqlite://rain_alert.db`), creating the file if needed.
    pub async fn connect(url: &str) -> Result<Self> {
        let opts = SqliteConnectOptions::from_str(url)
            .map_err(|e| AlertError::Config(format!("invalid DB_URL `{url}`: {e}")))?
            .create_if_missing(true);
        // One connection: a run is strictly sequential, and `sqlite::memory:` needs a single handle.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .map_err(|e| AlertError::store("opening database", e))?;
        info!(url, "database opened");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the tables if missing. Idempotent.
    pub async fn ensure_schema(&self) -> Result<()> {
        for stmt in SCHEMA {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| AlertError::store("creating schema", e))?;
        }
        Ok(())
    }

    /// Upsert raw threshold rows. Values are stored as text, like every other row.
    pub async fn seed_thresholds(&self, rows: &[(&str, &str)]) -> Result<()> {
        for (name, value) in rows {
            sqlx::query(
                "INSERT INTO weather_config(config, value) VALUES (?, ?)
                 ON CONFLICT(config) DO UPDATE SET value = excluded.value",
            )
            .bind(*name)
            .bind(*value)
            .execute(&self.pool)
            .await
            .map_err(|e| AlertError::store("seeding thresholds", e))?;
        }
        Ok(())
    }

    pub async fn notification_count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM weather_notifications")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AlertError::store("counting notifications", e))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait::async_trait]
impl ThresholdStore for Store {
    async fn thresholds(&self) -> Result<ThresholdSet> {
        let rows: Vec<(String, String)> = sqlx::query_as("SELECT config, value FROM weather_config")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AlertError::store("querying config", e))?;
        ThresholdSet::from_rows(rows)
    }
}

#[async_trait::async_trait]
impl NotificationHistory for Store {
    async fn last_event(&self) -> Result<Option<NotificationEvent>> {
        let row: Option<(i64, i64)> = sqlx::query_as(
            "SELECT state, created_at FROM weather_notifications ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AlertError::store("querying last notification", e))?;

        row.map(|(state, created_at)| NotificationEvent::from_row(state, created_at))
            .transpose()
    }

    async fn record(&self, chance_of_rain: u8, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("INSERT INTO weather_notifications(state, created_at) VALUES (?, ?)")
            .bind(i64::from(chance_of_rain))
            .bind(at.timestamp())
            .execute(&self.pool)
            .await
            .map_err(|e| AlertError::store("inserting notification", e))?;
        debug!(chance_of_rain, created_at = at.timestamp(), "notification recorded");
        Ok(())
    }
}
