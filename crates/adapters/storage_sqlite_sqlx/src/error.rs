//! Storage-specific error type wrapping sqlx errors.

use sensorhub_domain::error::{StoreError, StoreKind};

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to serialize or deserialize a stored JSON value.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StorageError {
    /// Convert into the port-level error of `store`.
    ///
    /// Unique-constraint violations become [`StoreError::Conflict`], anything
    /// else [`StoreError::Unavailable`].
    pub(crate) fn into_store_error(self, store: StoreKind) -> StoreError {
        match self {
            Self::Database(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                StoreError::Conflict { store }
            }
            other => StoreError::unavailable(store, other),
        }
    }
}

/// Shorthand for `map_err` on sqlx and serde results.
pub(crate) fn to_store<E: Into<StorageError>>(store: StoreKind) -> impl Fn(E) -> StoreError {
    move |err| err.into().into_store_error(store)
}
