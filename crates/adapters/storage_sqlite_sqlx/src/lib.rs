//! # sensorhub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the storage port traits defined in `sensorhub-app::ports::storage`:
//!   - `sensors` table → `IdentityStore`
//!   - `sensor_attributes` table (location columns + JSON document) → `AttributeStore`
//!   - `telemetry` table (one row per sensor, upserted) → `TelemetryCache`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `sensorhub-app` (for port traits) and `sensorhub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod attribute_repo;
mod error;
mod identity_repo;
mod pool;
mod telemetry_repo;

pub use attribute_repo::SqliteAttributeStore;
pub use error::StorageError;
pub use identity_repo::SqliteIdentityStore;
pub use pool::{Config, Database};
pub use telemetry_repo::SqliteTelemetryCache;
