//! `SQLite` implementation of [`IdentityStore`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use sensorhub_app::ports::IdentityStore;
use sensorhub_domain::error::{StoreError, StoreKind};
use sensorhub_domain::id::SensorId;
use sensorhub_domain::sensor::Sensor;

use crate::error::to_store;

const STORE: StoreKind = StoreKind::Identity;

/// Wrapper for converting database rows into domain [`Sensor`].
struct Wrapper(Sensor);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Sensor> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let name: String = row.try_get("name")?;

        Ok(Self(Sensor::new(SensorId::new(id), name)))
    }
}

const INSERT: &str = "INSERT INTO sensors (name) VALUES (?) RETURNING id, name";
const SELECT_BY_ID: &str = "SELECT id, name FROM sensors WHERE id = ?";
const SELECT_BY_NAME: &str = "SELECT id, name FROM sensors WHERE name = ?";
const SELECT_PAGE: &str = "SELECT id, name FROM sensors ORDER BY id LIMIT ? OFFSET ?";
const DELETE_BY_ID: &str = "DELETE FROM sensors WHERE id = ?";

/// `SQLite`-backed identity store.
pub struct SqliteIdentityStore {
    pool: SqlitePool,
}

impl SqliteIdentityStore {
    /// Create a new store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl IdentityStore for SqliteIdentityStore {
    fn insert(&self, name: String) -> impl Future<Output = Result<Sensor, StoreError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Wrapper = sqlx::query_as(INSERT)
                .bind(name)
                .fetch_one(&pool)
                .await
                .map_err(to_store(STORE))?;

            Ok(row.0)
        }
    }

    fn find_by_id(
        &self,
        id: SensorId,
    ) -> impl Future<Output = Result<Option<Sensor>, StoreError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.get())
                .fetch_optional(&pool)
                .await
                .map_err(to_store(STORE))?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn find_by_name(
        &self,
        name: String,
    ) -> impl Future<Output = Result<Option<Sensor>, StoreError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_NAME)
                .bind(name)
                .fetch_optional(&pool)
                .await
                .map_err(to_store(STORE))?;

            Ok(Wrapper::maybe(row))
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

    fn list(
        &self,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Sensor>, StoreError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_PAGE)
                .bind(to_i64(limit))
                .bind(to_i64(offset))
                .fetch_all(&pool)
                .await
                .map_err(to_store(STORE))?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }
}
