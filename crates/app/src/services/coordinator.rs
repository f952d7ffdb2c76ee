//! Sensor coordinator — ordered writes across the three stores.
//!
//! The identity store is the source of truth for existence. Every write
//! sequence touches it first and its dependents (attributes, telemetry,
//! spatial index) afterwards, so a partial failure leaves either nothing
//! behind (creation is rolled back) or only orphans that
//! [`SensorCoordinator::repair_orphans`] can find and remove.
//!
//! Multi-step sequences run on their own tokio task: if the caller's future
//! is dropped mid-sequence the task still drives the stores to the defined
//! end state. There is no retry; compensation runs exactly once.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;

use sensorhub_domain::attributes::{SensorAttributes, StoredAttributes};
use sensorhub_domain::consistency::{
    CleanupIncomplete, CleanupStep, Deletion, OrphanReport, Registration,
};
use sensorhub_domain::error::{SensorHubError, StoreError};
use sensorhub_domain::id::{SensorId, SensorKey};
use sensorhub_domain::sensor::{Sensor, validate_name};
use sensorhub_domain::telemetry::{TelemetryReading, validate_payload};
use sensorhub_domain::time::now;
use sensorhub_domain::value::ValueMap;

use crate::ports::{AttributeStore, IdentityStore, TelemetryCache};
use crate::spatial_index::SpatialIndex;

/// Application service owning every multi-store write.
pub struct SensorCoordinator<I, A, T> {
    identity: Arc<I>,
    attributes: Arc<A>,
    telemetry: Arc<T>,
    index: Arc<SpatialIndex>,
}

impl<I, A, T> Clone for SensorCoordinator<I, A, T> {
    fn clone(&self) -> Self {
        Self {
            identity: Arc::clone(&self.identity),
            attributes: Arc::clone(&self.attributes),
            telemetry: Arc::clone(&self.telemetry),
            index: Arc::clone(&self.index),
        }
    }
}

/// Run `sequence` on a detached task so that dropping the caller does not
/// abandon it halfway.
async fn run_to_completion<F, R>(sequence: F) -> Result<R, SensorHubError>
where
    F: Future<Output = Result<R, SensorHubError>> + Send + 'static,
    R: Send + 'static,
{
    match tokio::spawn(sequence).await {
        Ok(result) => result,
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(err) => {
            tracing::error!(error = %err, "write sequence task cancelled");
            Err(SensorHubError::Interrupted)
        }
    }
}

impl<I, A, T> SensorCoordinator<I, A, T>
where
    I: IdentityStore + Send + Sync + 'static,
    A: AttributeStore + Send + Sync + 'static,
    T: TelemetryCache + Send + Sync + 'static,
{
    /// Create a coordinator over the given stores and shared index.
    pub fn new(
        identity: Arc<I>,
        attributes: Arc<A>,
        telemetry: Arc<T>,
        index: Arc<SpatialIndex>,
    ) -> Self {
        Self {
            identity,
            attributes,
            telemetry,
            index,
        }
    }

    /// Register a sensor: identity row, then attributes document, then index.
    ///
    /// # Errors
    ///
    /// - [`SensorHubError::Validation`] for a bad name or attributes;
    /// - [`SensorHubError::DuplicateSensor`] if the name is taken, in which
    ///   case no store was written;
    /// - [`SensorHubError::AttributesWriteFailed`] if the document could not
    ///   be stored; the identity row has been rolled back;
    /// - [`SensorHubError::StoreUnavailable`] if the identity store failed.
    #[tracing::instrument(skip(self, attributes))]
    pub async fn create_sensor(
        &self,
        name: String,
        attributes: SensorAttributes,
    ) -> Result<Registration, SensorHubError> {
        validate_name(&name)?;
        attributes.validate()?;

        let this = self.clone();
        run_to_completion(async move { this.create_sequence(name, attributes).await }).await
    }

    async fn create_sequence(
        &self,
        name: String,
        attributes: SensorAttributes,
    ) -> Result<Registration, SensorHubError> {
        if self.identity.find_by_name(name.clone()).await?.is_some() {
            return Err(SensorHubError::DuplicateSensor { name });
        }

        let sensor = match self.identity.insert(name.clone()).await {
            Ok(sensor) => sensor,
            Err(StoreError::Conflict { .. }) => {
                return Err(SensorHubError::DuplicateSensor { name });
            }
            Err(err) => return Err(err.into()),
        };

        let document = StoredAttributes {
            sensor_id: sensor.id,
            sensor_name: sensor.name.clone(),
            attributes: attributes.clone(),
        };
        if let Err(source) = self.attributes.upsert(document).await {
            let rolled_back = self.roll_back_identity(&sensor).await;
            tracing::warn!(
                sensor_id = %sensor.id,
                error = %source,
                rolled_back,
                "attributes write failed during creation"
            );
            return Err(SensorHubError::AttributesWriteFailed {
                name,
                rolled_back,
                source,
            });
        }

        self.index
            .insert(sensor.id, sensor.name.clone(), attributes.location());
        tracing::info!(sensor_id = %sensor.id, sensor_name = %sensor.name, "sensor created");

        Ok(Registration { sensor, attributes })
    }

    async fn roll_back_identity(&self, sensor: &Sensor) -> bool {
        match self.identity.delete(sensor.id).await {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(
                    sensor_id = %sensor.id,
                    error = ?err,
                    "failed to roll back identity row; sensor left without attributes"
                );
                false
            }
        }
    }

    /// Delete a sensor. The identity row goes first and decides success;
    /// attributes, telemetry and index entry are then removed best-effort.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::SensorNotFound`] if no such sensor exists, or
    /// [`SensorHubError::StoreUnavailable`] if the identity store failed.
    /// Cleanup failures are not errors: they are reported in
    /// [`Deletion::cleanup_incomplete`].
    #[tracing::instrument(skip(self))]
    pub async fn delete_sensor(&self, id: SensorId) -> Result<Deletion, SensorHubError> {
        let this = self.clone();
        run_to_completion(async move { this.delete_sequence(id).await }).await
    }

    async fn delete_sequence(&self, id: SensorId) -> Result<Deletion, SensorHubError> {
        let sensor = self
            .identity
            .find_by_id(id)
            .await?
            .ok_or(SensorHubError::SensorNotFound(SensorKey::Id(id)))?;

        self.identity.delete(id).await?;

        let (attributes, telemetry) =
            tokio::join!(self.attributes.delete(id), self.telemetry.delete(id));
        self.index.remove(id);

        let mut cleanup = CleanupIncomplete::default();
        if let Err(err) = attributes {
            tracing::warn!(sensor_id = %id, error = ?err, "attributes left behind after delete");
            cleanup.push(CleanupStep::Attributes, &err);
        }
        if let Err(err) = telemetry {
            tracing::warn!(sensor_id = %id, error = ?err, "telemetry left behind after delete");
            cleanup.push(CleanupStep::Telemetry, &err);
        }
        tracing::info!(sensor_id = %id, complete = cleanup.is_empty(), "sensor deleted");

        Ok(Deletion {
            sensor,
            cleanup_incomplete: cleanup.into_warning(),
        })
    }

    /// Replace the latest reading of a sensor.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::Validation`] for an empty payload or reserved
    /// keys, [`SensorHubError::SensorNotFound`] for an unknown sensor, or
    /// [`SensorHubError::StoreUnavailable`].
    #[tracing::instrument(skip(self, payload))]
    pub async fn record_telemetry(
        &self,
        id: SensorId,
        payload: ValueMap,
    ) -> Result<TelemetryReading, SensorHubError> {
        validate_payload(&payload)?;
        self.ensure_exists(id).await?;

        let reading = TelemetryReading::new(id, payload, now());
        self.telemetry.set(reading.clone()).await?;
        tracing::debug!(sensor_id = %id, "telemetry recorded");
        Ok(reading)
    }

    /// Replace the attributes document of an existing sensor and move its
    /// index entry.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::Validation`], [`SensorHubError::SensorNotFound`]
    /// or [`SensorHubError::StoreUnavailable`].
    #[tracing::instrument(skip(self, attributes))]
    pub async fn update_attributes(
        &self,
        id: SensorId,
        attributes: SensorAttributes,
    ) -> Result<Registration, SensorHubError> {
        attributes.validate()?;
        let this = self.clone();
        run_to_completion(async move { this.update_sequence(id, attributes).await }).await
    }

    async fn update_sequence(
        &self,
        id: SensorId,
        attributes: SensorAttributes,
    ) -> Result<Registration, SensorHubError> {
        let sensor = self.ensure_exists(id).await?;

        let document = StoredAttributes {
            sensor_id: sensor.id,
            sensor_name: sensor.name.clone(),
            attributes: attributes.clone(),
        };
        self.attributes.upsert(document).await?;
        self.index
            .insert(sensor.id, sensor.name.clone(), attributes.location());
        tracing::info!(sensor_id = %id, "attributes updated");

        Ok(Registration { sensor, attributes })
    }

    /// Reload the spatial index from every stored attributes document.
    ///
    /// Returns the number of indexed sensors.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::StoreUnavailable`] if the listing failed; the
    /// index is left untouched in that case.
    pub async fn rebuild_spatial_index(&self) -> Result<usize, SensorHubError> {
        let documents = self.attributes.list_all().await?;
        self.index.rebuild(documents);
        let count = self.index.len();
        tracing::info!(count, "spatial index rebuilt");
        Ok(count)
    }

    /// List attribute documents and cached readings that have no identity row.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::StoreUnavailable`] if any store failed.
    pub async fn find_orphans(&self) -> Result<OrphanReport, SensorHubError> {
        let (documents, cached) = tokio::join!(self.attributes.list_all(), self.telemetry.ids());
        let attribute_ids: BTreeSet<SensorId> =
            documents?.into_iter().map(|doc| doc.sensor_id).collect();
        let telemetry_ids: BTreeSet<SensorId> = cached?.into_iter().collect();

        let mut known: HashMap<SensorId, bool> = HashMap::new();
        for id in attribute_ids.union(&telemetry_ids) {
            let exists = self.identity.find_by_id(*id).await?.is_some();
            known.insert(*id, exists);
        }
        let orphaned = |id: &SensorId| !known.get(id).copied().unwrap_or(true);

        Ok(OrphanReport {
            attributes: attribute_ids.iter().copied().filter(orphaned).collect(),
            telemetry: telemetry_ids.iter().copied().filter(orphaned).collect(),
        })
    }

    /// Delete every orphan found by [`Self::find_orphans`] and drop its index
    /// entry. Returns what was removed.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::StoreUnavailable`] on the first store failure;
    /// orphans removed before it stay removed.
    pub async fn repair_orphans(&self) -> Result<OrphanReport, SensorHubError> {
        let report = self.find_orphans().await?;
        for id in &report.attributes {
            self.attributes.delete(*id).await?;
            self.index.remove(*id);
        }
        for id in &report.telemetry {
            self.telemetry.delete(*id).await?;
        }
        if !report.is_empty() {
            tracing::info!(
                attributes = report.attributes.len(),
                telemetry = report.telemetry.len(),
                "orphans removed"
            );
        }
        Ok(report)
    }

    async fn ensure_exists(&self, id: SensorId) -> Result<Sensor, SensorHubError> {
        self.identity
            .find_by_id(id)
            .await?
            .ok_or(SensorHubError::SensorNotFound(SensorKey::Id(id)))
    }
}
