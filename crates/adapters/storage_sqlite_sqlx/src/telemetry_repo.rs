//! `SQLite` implementation of [`TelemetryCache`].
//!
//! One row per sensor; writes overwrite the previous reading.

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use sensorhub_app::ports::TelemetryCache;
use sensorhub_domain::error::{StoreError, StoreKind};
use sensorhub_domain::id::SensorId;
use sensorhub_domain::telemetry::TelemetryReading;
use sensorhub_domain::value::ValueMap;

use crate::error::to_store;

const STORE: StoreKind = StoreKind::Telemetry;

struct Wrapper(TelemetryReading);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let sensor_id: i64 = row.try_get("sensor_id")?;
        let payload_json: String = row.try_get("payload")?;
        let recorded_at_str: String = row.try_get("recorded_at")?;

        let payload: ValueMap = serde_json::from_str(&payload_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let recorded_at = chrono::DateTime::parse_from_rfc3339(&recorded_at_str)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?
            .to_utc();

        Ok(Self(TelemetryReading::new(
            SensorId::new(sensor_id),
            payload,
            recorded_at,
        )))
    }
}

const UPSERT: &str = r"
    INSERT INTO telemetry (sensor_id, payload, recorded_at)
    VALUES (?, ?, ?)
    ON CONFLICT(sensor_id) DO UPDATE SET
        payload = excluded.payload,
        recorded_at = excluded.recorded_at
";

const SELECT_BY_ID: &str = "SELECT * FROM telemetry WHERE sensor_id = ?";
const SELECT_IDS: &str = "SELECT sensor_id FROM telemetry ORDER BY sensor_id";
const DELETE_BY_ID: &str = "DELETE FROM telemetry WHERE sensor_id = ?";

/// `SQLite`-backed latest-reading cache.
pub struct SqliteTelemetryCache {
    pool: SqlitePool,
}

impl SqliteTelemetryCache {
    /// Create a new cache using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl TelemetryCache for SqliteTelemetryCache {
    fn set(
        &self,
        reading: TelemetryReading,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        let pool = self.pool.clone();
        async move {
            let payload = serde_json::to_string(&reading.payload).map_err(to_store(STORE))?;

            sqlx::query(UPSERT)
                .bind(reading.sensor_id.get())
                .bind(payload)
                .bind(reading.recorded_at.to_rfc3339())
                .execute(&pool)
                .await
                .map_err(to_store(STORE))?;

            Ok(())
        }
    }

    fn get(
        &self,
        id: SensorId,
    ) -> impl Future<Output = Result<Option<TelemetryReading>, StoreError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.get())
                .fetch_optional(&pool)
                .await
                .map_err(to_store(STORE))?;

            Ok(row.map(|w| w.0))
        }
    }

    fn delete(&self, id: SensorId) -> impl Future<Output = Result<(), StoreError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE_BY_ID)
                .bind(id.get())
                .execute(&pool)
                .await
                .map_err(to_store(STORE))?;

            Ok(())
        }
    }

    fn ids(&self) -> impl Future<Output = Result<Vec<SensorId>, StoreError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<(i64,)> = sqlx::query_as(SELECT_IDS)
                .fetch_all(&pool)
                .await
                .map_err(to_store(STORE))?;

            Ok(rows.into_iter().map(|(id,)| SensorId::new(id)).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::pool::Config;

    async fn setup() -> SqliteTelemetryCache {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteTelemetryCache::new(db.pool().clone())
    }

    fn reading(id: i64, temperature: i64, second: u32) -> TelemetryReading {
        let mut payload = ValueMap::new();
        payload.insert("temperature".to_string(), temperature.into());
        let recorded_at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, second).unwrap();
        TelemetryReading::new(SensorId::new(id), payload, recorded_at)
    }

    #[tokio::test]
    async fn should_store_and_retrieve_latest_reading() {
        let cache = setup().await;
        cache.set(reading(1, 22, 0)).await.unwrap();

        let fetched = cache.get(SensorId::new(1)).await.unwrap().unwrap();

        assert_eq!(fetched, reading(1, 22, 0));
    }

    #[tokio::test]
    async fn should_overwrite_previous_reading() {
        let cache = setup().await;
        cache.set(reading(1, 22, 0)).await.unwrap();
        cache.set(reading(1, 23, 5)).await.unwrap();

        let fetched = cache.get(SensorId::new(1)).await.unwrap().unwrap();

        assert_eq!(fetched, reading(1, 23, 5));
        assert_eq!(cache.ids().await.unwrap(), vec![SensorId::new(1)]);
    }

    #[tokio::test]
    async fn should_return_none_when_nothing_recorded() {
        let cache = setup().await;
        assert!(cache.get(SensorId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_list_ids_and_forget_deleted_ones() {
        let cache = setup().await;
        cache.set(reading(1, 22, 0)).await.unwrap();
        cache.set(reading(2, 19, 0)).await.unwrap();

        cache.delete(SensorId::new(1)).await.unwrap();
        cache.delete(SensorId::new(1)).await.unwrap();

        assert_eq!(cache.ids().await.unwrap(), vec![SensorId::new(2)]);
    }
}
