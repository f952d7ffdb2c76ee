//! In-memory [`IdentityStore`].

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::RwLock;

use sensorhub_app::ports::IdentityStore;
use sensorhub_domain::error::{StoreError, StoreKind};
use sensorhub_domain::id::SensorId;
use sensorhub_domain::sensor::Sensor;

use crate::{read, write};

#[derive(Debug, Default)]
struct Rows {
    last_id: i64,
    by_id: BTreeMap<SensorId, Sensor>,
    by_name: BTreeMap<String, SensorId>,
}

/// Identity rows held in memory; ids are never reused.
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    rows: RwLock<Rows>,
}

impl MemoryIdentityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStore for MemoryIdentityStore {
    fn insert(&self, name: String) -> impl Future<Output = Result<Sensor, StoreError>> + Send {
        let mut rows = write(&self.rows);
        let result = if rows.by_name.contains_key(&name) {
            Err(StoreError::Conflict {
                store: StoreKind::Identity,
            })
        } else {
            rows.last_id += 1;
            let sensor = Sensor::new(SensorId::new(rows.last_id), name);
            rows.by_name.insert(sensor.name.clone(), sensor.id);
            rows.by_id.insert(sensor.id, sensor.clone());
            Ok(sensor)
        };
        async { result }
    }

    fn find_by_id(
        &self,
        id: SensorId,
    ) -> impl Future<Output = Result<Option<Sensor>, StoreError>> + Send {
        let found = read(&self.rows).by_id.get(&id).cloned();
        async { Ok(found) }
    }

    fn find_by_name(
        &self,
        name: String,
    ) -> impl Future<Output = Result<Option<Sensor>, StoreError>> + Send {
        let rows = read(&self.rows);
        let found = rows
            .by_name
            .get(&name)
            .and_then(|id| rows.by_id.get(id))
            .cloned();
        async { Ok(found) }
    }

    fn delete(&self, id: SensorId) -> impl Future<Output = Result<(), StoreError>> + Send {
        let mut rows = write(&self.rows);
        if let Some(sensor) = rows.by_id.remove(&id) {
            rows.by_name.remove(&sensor.name);
        }
        async { Ok(()) }
    }

    fn list(
        &self,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Sensor>, StoreError>> + Send {
        let page: Vec<Sensor> = read(&self.rows)
            .by_id
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        async { Ok(page) }
    }
}
