//! `SQLite` implementation of [`AttributeStore`].
//!
//! Location lives in its own columns, every other field is kept as a JSON
//! object in `extra`.

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use sensorhub_app::ports::AttributeStore;
use sensorhub_domain::attributes::{SensorAttributes, StoredAttributes};
use sensorhub_domain::error::{StoreError, StoreKind};
use sensorhub_domain::id::SensorId;
use sensorhub_domain::value::ValueMap;

use crate::error::to_store;

const STORE: StoreKind = StoreKind::Attributes;

struct Wrapper(StoredAttributes);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let sensor_id: i64 = row.try_get("sensor_id")?;
        let sensor_name: String = row.try_get("sensor_name")?;
        let latitude: f64 = row.try_get("latitude")?;
        let longitude: f64 = row.try_get("longitude")?;
        let extra_json: String = row.try_get("extra")?;

        let extra: ValueMap =
            serde_json::from_str(&extra_json).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(StoredAttributes {
            sensor_id: SensorId::new(sensor_id),
            sensor_name,
            attributes: SensorAttributes {
                latitude,
                longitude,
                extra,
            },
        }))
    }
}

const UPSERT: &str = r"
    INSERT INTO sensor_attributes (sensor_id, sensor_name, latitude, longitude, extra)
    VALUES (?, ?, ?, ?, ?)
    ON CONFLICT(sensor_id) DO UPDATE SET
        sensor_name = excluded.sensor_name,
        latitude = excluded.latitude,
        longitude = excluded.longitude,
        extra = excluded.extra
";

const SELECT_BY_ID: &str = "SELECT * FROM sensor_attributes WHERE sensor_id = ?";
const SELECT_ALL: &str = "SELECT * FROM sensor_attributes ORDER BY sensor_id";
const DELETE_BY_ID: &str = "DELETE FROM sensor_attributes WHERE sensor_id = ?";

/// `SQLite`-backed attribute document store.
pub struct SqliteAttributeStore {
    pool: SqlitePool,
}

impl SqliteAttributeStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AttributeStore for SqliteAttributeStore {
    fn upsert(
        &self,
        document: StoredAttributes,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        let pool = self.pool.clone();
        async move {
            let extra = serde_json::to_string(&document.attributes.extra).map_err(to_store(STORE))?;

            sqlx::query(UPSERT)
                .bind(document.sensor_id.get())
                .bind(&document.sensor_name)
                .bind(document.attributes.latitude)
                .bind(document.attributes.longitude)
                .bind(extra)
                .execute(&pool)
                .await
                .map_err(to_store(STORE))?;

            Ok(())
        }
    }

    fn find(
        &self,
        id: SensorId,
    ) -> impl Future<Output = Result<Option<SensorAttributes>, StoreError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.get())
                .fetch_optional(&pool)
                .await
                .map_err(to_store(STORE))?;

            Ok(row.map(|w| w.0.attributes))
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

    fn list_all(&self) -> impl Future<Output = Result<Vec<StoredAttributes>, StoreError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(to_store(STORE))?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;

    async fn setup() -> SqliteAttributeStore {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteAttributeStore::new(db.pool().clone())
    }

    fn document(id: i64, name: &str, latitude: f64) -> StoredAttributes {
        StoredAttributes {
            sensor_id: SensorId::new(id),
            sensor_name: name.to_string(),
            attributes: SensorAttributes::builder()
                .location(latitude, 20.0)
                .field("model", "TH-1")
                .field("calibrated", true)
                .build()
                .unwrap(),
        }
    }

    #[tokio::test]
    async fn should_store_and_retrieve_extra_fields() {
        let store = setup().await;
        store.upsert(document(1, "s1", 10.0)).await.unwrap();

        let fetched = store.find(SensorId::new(1)).await.unwrap().unwrap();

        assert_eq!(fetched, document(1, "s1", 10.0).attributes);
    }

    #[tokio::test]
    async fn should_replace_document_on_second_upsert() {
        let store = setup().await;
        store.upsert(document(1, "s1", 10.0)).await.unwrap();

        let replacement = StoredAttributes {
            attributes: SensorAttributes::builder()
                .location(-5.0, 7.5)
                .build()
                .unwrap(),
            ..document(1, "s1", 0.0)
        };
        store.upsert(replacement).await.unwrap();

        let fetched = store.find(SensorId::new(1)).await.unwrap().unwrap();
        assert_eq!(fetched.latitude, -5.0);
        assert!(fetched.extra.is_empty());
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_return_none_when_document_missing() {
        let store = setup().await;
        assert!(store.find(SensorId::new(9)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_list_every_document_with_its_name() {
        let store = setup().await;
        store.upsert(document(2, "s2", 1.0)).await.unwrap();
        store.upsert(document(1, "s1", 2.0)).await.unwrap();

        let all = store.list_all().await.unwrap();

        let names: Vec<&str> = all.iter().map(|d| d.sensor_name.as_str()).collect();
        assert_eq!(names, vec!["s1", "s2"]);
    }

    #[tokio::test]
    async fn should_delete_idempotently() {
        let store = setup().await;
        store.upsert(document(1, "s1", 10.0)).await.unwrap();

        store.delete(SensorId::new(1)).await.unwrap();
        store.delete(SensorId::new(1)).await.unwrap();

        assert!(store.find(SensorId::new(1)).await.unwrap().is_none());
    }
}
