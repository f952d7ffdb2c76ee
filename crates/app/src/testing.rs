//! In-memory store fakes with failure injection, shared by the service tests.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use sensorhub_domain::attributes::{SensorAttributes, StoredAttributes};
use sensorhub_domain::error::{StoreError, StoreKind};
use sensorhub_domain::id::SensorId;
use sensorhub_domain::sensor::Sensor;
use sensorhub_domain::telemetry::TelemetryReading;
use sensorhub_domain::value::ValueMap;

use crate::ports::{AttributeStore, IdentityStore, TelemetryCache};
use crate::services::coordinator::SensorCoordinator;
use crate::services::query_facade::QueryFacade;
use crate::spatial_index::SpatialIndex;

fn injected(store: StoreKind) -> StoreError {
    StoreError::unavailable(store, "injected failure")
}

/// Per-operation failure switches.
#[derive(Default)]
pub struct Faults {
    pub insert: AtomicBool,
    pub read: AtomicBool,
    pub write: AtomicBool,
    pub delete: AtomicBool,
}

impl Faults {
    pub fn set(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }

    fn on(flag: &AtomicBool) -> bool {
        flag.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct IdentityRows {
    next_id: i64,
    rows: BTreeMap<SensorId, Sensor>,
}

#[derive(Default)]
pub struct FakeIdentityStore {
    state: Mutex<IdentityRows>,
    pub faults: Faults,
    pub writes: AtomicUsize,
}

impl FakeIdentityStore {
    pub fn rows(&self) -> Vec<Sensor> {
        self.state.lock().unwrap().rows.values().cloned().collect()
    }

    /// Insert an identity row directly, bypassing fault injection.
    pub fn seed(&self, name: &str) -> Sensor {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let sensor = Sensor::new(SensorId::new(state.next_id), name);
        state.rows.insert(sensor.id, sensor.clone());
        sensor
    }
}

impl IdentityStore for FakeIdentityStore {
    fn insert(&self, name: String) -> impl Future<Output = Result<Sensor, StoreError>> + Send {
        let result = if Faults::on(&self.faults.insert) {
            Err(injected(StoreKind::Identity))
        } else {
            let mut state = self.state.lock().unwrap();
            if state.rows.values().any(|s| s.name == name) {
                Err(StoreError::Conflict {
                    store: StoreKind::Identity,
                })
            } else {
                self.writes.fetch_add(1, Ordering::SeqCst);
                state.next_id += 1;
                let sensor = Sensor::new(SensorId::new(state.next_id), name);
                state.rows.insert(sensor.id, sensor.clone());
                Ok(sensor)
            }
        };
        async { result }
    }

    fn find_by_id(
        &self,
        id: SensorId,
    ) -> impl Future<Output = Result<Option<Sensor>, StoreError>> + Send {
        let result = if Faults::on(&self.faults.read) {
            Err(injected(StoreKind::Identity))
        } else {
            Ok(self.state.lock().unwrap().rows.get(&id).cloned())
        };
        async { result }
    }

    fn find_by_name(
        &self,
        name: String,
    ) -> impl Future<Output = Result<Option<Sensor>, StoreError>> + Send {
        let result = if Faults::on(&self.faults.read) {
            Err(injected(StoreKind::Identity))
        } else {
            let state = self.state.lock().unwrap();
            Ok(state.rows.values().find(|s| s.name == name).cloned())
        };
        async { result }
    }

    fn delete(&self, id: SensorId) -> impl Future<Output = Result<(), StoreError>> + Send {
        let result = if Faults::on(&self.faults.delete) {
            Err(injected(StoreKind::Identity))
        } else {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.state.lock().unwrap().rows.remove(&id);
            Ok(())
        };
        async { result }
    }

    fn list(
        &self,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Sensor>, StoreError>> + Send {
        let state = self.state.lock().unwrap();
        let page: Vec<Sensor> = state
            .rows
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        async { Ok(page) }
    }
}

#[derive(Default)]
pub struct FakeAttributeStore {
    docs: Arc<Mutex<HashMap<SensorId, StoredAttributes>>>,
    gate: Mutex<Option<Arc<Notify>>>,
    pub faults: Faults,
    pub writes: Arc<AtomicUsize>,
}

impl FakeAttributeStore {
    pub fn docs(&self) -> HashMap<SensorId, StoredAttributes> {
        self.docs.lock().unwrap().clone()
    }

    /// Insert a document directly, bypassing fault injection.
    pub fn seed(&self, document: StoredAttributes) {
        self.docs
            .lock()
            .unwrap()
            .insert(document.sensor_id, document);
    }

    /// Make every later upsert store its document, then wait until the
    /// returned handle is notified before reporting success.
    pub fn hold_upserts(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }
}

impl AttributeStore for FakeAttributeStore {
    fn upsert(
        &self,
        document: StoredAttributes,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        let docs = Arc::clone(&self.docs);
        let writes = Arc::clone(&self.writes);
        let fail = Faults::on(&self.faults.write);
        let gate = self.gate.lock().unwrap().clone();
        async move {
            if fail {
                return Err(injected(StoreKind::Attributes));
            }
            writes.fetch_add(1, Ordering::SeqCst);
            docs.lock().unwrap().insert(document.sensor_id, document);
            if let Some(gate) = gate {
                gate.notified().await;
            }
            Ok(())
        }
    }

    fn find(
        &self,
        id: SensorId,
    ) -> impl Future<Output = Result<Option<SensorAttributes>, StoreError>> + Send {
        let result = if Faults::on(&self.faults.read) {
            Err(injected(StoreKind::Attributes))
        } else {
            Ok(self
                .docs
                .lock()
                .unwrap()
                .get(&id)
                .map(|doc| doc.attributes.clone()))
        };
        async { result }
    }

    fn delete(&self, id: SensorId) -> impl Future<Output = Result<(), StoreError>> + Send {
        let result = if Faults::on(&self.faults.delete) {
            Err(injected(StoreKind::Attributes))
        } else {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.docs.lock().unwrap().remove(&id);
            Ok(())
        };
        async { result }
    }

    fn list_all(&self) -> impl Future<Output = Result<Vec<StoredAttributes>, StoreError>> + Send {
        let result = if Faults::on(&self.faults.read) {
            Err(injected(StoreKind::Attributes))
        } else {
            Ok(self.docs.lock().unwrap().values().cloned().collect())
        };
        async { result }
    }
}

#[derive(Default)]
pub struct FakeTelemetryCache {
    readings: Mutex<HashMap<SensorId, TelemetryReading>>,
    pub faults: Faults,
    pub writes: AtomicUsize,
}

impl FakeTelemetryCache {
    pub fn readings(&self) -> HashMap<SensorId, TelemetryReading> {
        self.readings.lock().unwrap().clone()
    }

    /// Cache a reading directly, bypassing fault injection.
    pub fn seed(&self, reading: TelemetryReading) {
        self.readings
            .lock()
            .unwrap()
            .insert(reading.sensor_id, reading);
    }
}

impl TelemetryCache for FakeTelemetryCache {
    fn set(
        &self,
        reading: TelemetryReading,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        let result = if Faults::on(&self.faults.write) {
            Err(injected(StoreKind::Telemetry))
        } else {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.readings
                .lock()
                .unwrap()
                .insert(reading.sensor_id, reading);
            Ok(())
        };
        async { result }
    }

    fn get(
        &self,
        id: SensorId,
    ) -> impl Future<Output = Result<Option<TelemetryReading>, StoreError>> + Send {
        let result = if Faults::on(&self.faults.read) {
            Err(injected(StoreKind::Telemetry))
        } else {
            Ok(self.readings.lock().unwrap().get(&id).cloned())
        };
        async { result }
    }

    fn delete(&self, id: SensorId) -> impl Future<Output = Result<(), StoreError>> + Send {
        let result = if Faults::on(&self.faults.delete) {
            Err(injected(StoreKind::Telemetry))
        } else {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.readings.lock().unwrap().remove(&id);
            Ok(())
        };
        async { result }
    }

    fn ids(&self) -> impl Future<Output = Result<Vec<SensorId>, StoreError>> + Send {
        let ids: Vec<SensorId> = self.readings.lock().unwrap().keys().copied().collect();
        async { Ok(ids) }
    }
}

pub type TestCoordinator =
    SensorCoordinator<FakeIdentityStore, FakeAttributeStore, FakeTelemetryCache>;
pub type TestFacade = QueryFacade<FakeIdentityStore, FakeAttributeStore, FakeTelemetryCache>;

/// Three fake stores plus the shared index they feed.
#[derive(Default)]
pub struct Harness {
    pub identity: Arc<FakeIdentityStore>,
    pub attributes: Arc<FakeAttributeStore>,
    pub telemetry: Arc<FakeTelemetryCache>,
    pub index: Arc<SpatialIndex>,
}

impl Harness {
    pub fn coordinator(&self) -> TestCoordinator {
        SensorCoordinator::new(
            Arc::clone(&self.identity),
            Arc::clone(&self.attributes),
            Arc::clone(&self.telemetry),
            Arc::clone(&self.index),
        )
    }

    pub fn facade(&self) -> TestFacade {
        QueryFacade::new(
            Arc::clone(&self.identity),
            Arc::clone(&self.attributes),
            Arc::clone(&self.telemetry),
            Arc::clone(&self.index),
        )
    }

    pub fn total_writes(&self) -> usize {
        self.identity.writes.load(Ordering::SeqCst)
            + self.attributes.writes.load(Ordering::SeqCst)
            + self.telemetry.writes.load(Ordering::SeqCst)
    }
}

pub fn located(latitude: f64, longitude: f64) -> SensorAttributes {
    SensorAttributes::builder()
        .location(latitude, longitude)
        .build()
        .unwrap()
}

pub fn payload(entries: &[(&str, i64)]) -> ValueMap {
    entries
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).into()))
        .collect()
}
