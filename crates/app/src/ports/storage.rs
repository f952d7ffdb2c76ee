//! Storage ports — one trait per backing store.
//!
//! Every method is an IO boundary. Implementations report failures as
//! [`StoreError`]; mapping those onto user-facing errors is the job of the
//! coordinator and the facade.
//!
//! Deletes are idempotent: removing a record that does not exist succeeds.

use std::future::Future;

use sensorhub_domain::attributes::{SensorAttributes, StoredAttributes};
use sensorhub_domain::error::StoreError;
use sensorhub_domain::id::SensorId;
use sensorhub_domain::sensor::Sensor;
use sensorhub_domain::telemetry::TelemetryReading;

/// Relational store owning sensor identity.
pub trait IdentityStore {
    /// Insert a new identity row and return it with its assigned id.
    ///
    /// Must fail with [`StoreError::Conflict`] when `name` is already taken.
    fn insert(&self, name: String) -> impl Future<Output = Result<Sensor, StoreError>> + Send;

    fn find_by_id(
        &self,
        id: SensorId,
    ) -> impl Future<Output = Result<Option<Sensor>, StoreError>> + Send;

    fn find_by_name(
        &self,
        name: String,
    ) -> impl Future<Output = Result<Option<Sensor>, StoreError>> + Send;

    fn delete(&self, id: SensorId) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Page through identities ordered by id.
    fn list(
        &self,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Sensor>, StoreError>> + Send;
}

/// Document store owning static per-sensor attributes, keyed by sensor id.
pub trait AttributeStore {
    /// Insert or fully replace the document of `document.sensor_id`.
    fn upsert(
        &self,
        document: StoredAttributes,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn find(
        &self,
        id: SensorId,
    ) -> impl Future<Output = Result<Option<SensorAttributes>, StoreError>> + Send;

    fn delete(&self, id: SensorId) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Every stored document, used to bulk-load the spatial index.
    fn list_all(&self) -> impl Future<Output = Result<Vec<StoredAttributes>, StoreError>> + Send;
}

/// Key-value cache holding only the latest reading of each sensor.
pub trait TelemetryCache {
    /// Store `reading`, overwriting whatever was cached for its sensor.
    fn set(
        &self,
        reading: TelemetryReading,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn get(
        &self,
        id: SensorId,
    ) -> impl Future<Output = Result<Option<TelemetryReading>, StoreError>> + Send;

    fn delete(&self, id: SensorId) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Ids that currently have a cached reading.
    fn ids(&self) -> impl Future<Output = Result<Vec<SensorId>, StoreError>> + Send;
}
