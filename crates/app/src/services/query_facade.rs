//! Query facade: merged read access to sensors.
//!
//! Single-sensor lookups are strict: a sensor that has not reported any
//! telemetry yet is "not ready" and yields [`SensorHubError::TelemetryNotFound`].
//!
//! Area queries are lenient on purpose. A candidate from the spatial index
//! that has no telemetry, or whose identity vanished since it was indexed, is
//! skipped and the remaining sensors are still returned, so one stale sensor
//! cannot fail a whole area query. Store outages still fail the query.

use std::sync::Arc;

use sensorhub_domain::error::SensorHubError;
use sensorhub_domain::geo::{BoundingBox, GeoPoint};
use sensorhub_domain::id::{SensorId, SensorKey};
use sensorhub_domain::sensor::Sensor;
use sensorhub_domain::telemetry::TelemetryReading;
use sensorhub_domain::view::SensorView;

use crate::ports::{AttributeStore, IdentityStore, TelemetryCache};
use crate::spatial_index::SpatialIndex;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Application service for every read that spans more than one store.
pub struct QueryFacade<I, A, T> {
    identity: Arc<I>,
    attributes: Arc<A>,
    telemetry: Arc<T>,
    index: Arc<SpatialIndex>,
}

impl<I, A, T> QueryFacade<I, A, T>
where
    I: IdentityStore + Send + Sync,
    A: AttributeStore + Send + Sync,
    T: TelemetryCache + Send + Sync,
{
    /// Create a facade over the given stores and shared index.
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

    /// Look up a sensor's identity.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::SensorNotFound`] when it does not exist, or
    /// [`SensorHubError::StoreUnavailable`].
    pub async fn get_sensor(&self, key: SensorKey) -> Result<Sensor, SensorHubError> {
        let found = match &key {
            SensorKey::Id(id) => self.identity.find_by_id(*id).await?,
            SensorKey::Name(name) => self.identity.find_by_name(name.clone()).await?,
        };
        found.ok_or(SensorHubError::SensorNotFound(key))
    }

    /// Page through registered sensors ordered by id.
    ///
    /// `limit` defaults to [`DEFAULT_PAGE_SIZE`] and is capped at [`MAX_PAGE_SIZE`].
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::StoreUnavailable`].
    pub async fn list_sensors(
        &self,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Sensor>, SensorHubError> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
        Ok(self.identity.list(offset, limit).await?)
    }

    /// Latest reading of a sensor.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::SensorNotFound`],
    /// [`SensorHubError::TelemetryNotFound`] or
    /// [`SensorHubError::StoreUnavailable`].
    pub async fn get_telemetry(&self, id: SensorId) -> Result<TelemetryReading, SensorHubError> {
        let sensor = self.get_sensor(SensorKey::Id(id)).await?;
        self.telemetry
            .get(sensor.id)
            .await?
            .ok_or(SensorHubError::TelemetryNotFound(sensor.id))
    }

    /// Merge identity, attributes and latest telemetry of one sensor.
    ///
    /// Attributes are fetched concurrently with telemetry and omitted from
    /// the view when absent.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::SensorNotFound`],
    /// [`SensorHubError::TelemetryNotFound`] or
    /// [`SensorHubError::StoreUnavailable`].
    pub async fn get_sensor_view(&self, key: SensorKey) -> Result<SensorView, SensorHubError> {
        let sensor = self.get_sensor(key).await?;
        let (attributes, reading) = tokio::join!(
            self.attributes.find(sensor.id),
            self.telemetry.get(sensor.id)
        );
        let reading = reading?.ok_or(SensorHubError::TelemetryNotFound(sensor.id))?;
        let attributes = attributes?;
        Ok(SensorView::merge(sensor, attributes, reading))
    }

    /// Views of every sensor inside the box `[lat ± r] × [lon ± r]`, ordered
    /// by name. Candidates without telemetry are skipped.
    ///
    /// Index hits are resolved by id. A hit whose stored location no longer
    /// lies in the box (the index lagging behind the attribute store) is
    /// skipped as well.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::Validation`] for a negative or non-finite
    /// radius, or [`SensorHubError::StoreUnavailable`].
    #[tracing::instrument(skip(self))]
    pub async fn list_near(
        &self,
        latitude: f64,
        longitude: f64,
        radius: f64,
    ) -> Result<Vec<SensorView>, SensorHubError> {
        let bbox = BoundingBox::around(GeoPoint::new(latitude, longitude), radius)?;
        let candidates = self.index.hits_within(&bbox);
        let mut views = Vec::with_capacity(candidates.len());
        for hit in candidates {
            match self.get_sensor_view(SensorKey::Id(hit.id)).await {
                Ok(view) => {
                    let moved = view
                        .attributes
                        .as_ref()
                        .is_some_and(|attrs| !bbox.contains(attrs.location()));
                    if moved {
                        tracing::debug!(sensor_id = %hit.id, "skipping sensor stored outside the box");
                    } else {
                        views.push(view);
                    }
                }
                Err(SensorHubError::TelemetryNotFound(id)) => {
                    tracing::debug!(sensor_id = %id, "skipping sensor without telemetry");
                }
                Err(SensorHubError::SensorNotFound(key)) => {
                    tracing::debug!(sensor = %key, indexed_as = %hit.name, "skipping indexed sensor without identity");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(views)
    }
}
