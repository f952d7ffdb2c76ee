//! In-memory [`TelemetryCache`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::RwLock;

use sensorhub_app::ports::TelemetryCache;
use sensorhub_domain::error::StoreError;
use sensorhub_domain::id::SensorId;
use sensorhub_domain::telemetry::TelemetryReading;

use crate::{read, write};

/// Latest reading per sensor; a write replaces the previous value outright.
#[derive(Debug, Default)]
pub struct MemoryTelemetryCache {
    readings: RwLock<HashMap<SensorId, TelemetryReading>>,
}

impl MemoryTelemetryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TelemetryCache for MemoryTelemetryCache {
    fn set(
        &self,
        reading: TelemetryReading,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        write(&self.readings).insert(reading.sensor_id, reading);
        async { Ok(()) }
    }

    fn get(
        &self,
        id: SensorId,
    ) -> impl Future<Output = Result<Option<TelemetryReading>, StoreError>> + Send {
        let found = read(&self.readings).get(&id).cloned();
        async { Ok(found) }
    }

    fn delete(&self, id: SensorId) -> impl Future<Output = Result<(), StoreError>> + Send {
        write(&self.readings).remove(&id);
        async { Ok(()) }
    }

    fn ids(&self) -> impl Future<Output = Result<Vec<SensorId>, StoreError>> + Send {
        let mut ids: Vec<SensorId> = read(&self.readings).keys().copied().collect();
        ids.sort_unstable();
        async { Ok(ids) }
    }
}
