//! In-memory [`AttributeStore`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::RwLock;

use sensorhub_app::ports::AttributeStore;
use sensorhub_domain::attributes::{SensorAttributes, StoredAttributes};
use sensorhub_domain::error::StoreError;
use sensorhub_domain::id::SensorId;

use crate::{read, write};

/// Attribute documents held in memory, keyed by sensor id.
#[derive(Debug, Default)]
pub struct MemoryAttributeStore {
    documents: RwLock<HashMap<SensorId, StoredAttributes>>,
}

impl MemoryAttributeStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttributeStore for MemoryAttributeStore {
    fn upsert(
        &self,
        document: StoredAttributes,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        write(&self.documents).insert(document.sensor_id, document);
        async { Ok(()) }
    }

    fn find(
        &self,
        id: SensorId,
    ) -> impl Future<Output = Result<Option<SensorAttributes>, StoreError>> + Send {
        let found = read(&self.documents)
            .get(&id)
            .map(|doc| doc.attributes.clone());
        async { Ok(found) }
    }

    fn delete(&self, id: SensorId) -> impl Future<Output = Result<(), StoreError>> + Send {
        write(&self.documents).remove(&id);
        async { Ok(()) }
    }

    fn list_all(&self) -> impl Future<Output = Result<Vec<StoredAttributes>, StoreError>> + Send {
        let all: Vec<StoredAttributes> = read(&self.documents).values().cloned().collect();
        async { Ok(all) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(raw: i64, latitude: f64) -> StoredAttributes {
        StoredAttributes {
            sensor_id: SensorId::new(raw),
            sensor_name: format!("s{raw}"),
            attributes: SensorAttributes::builder()
                .location(latitude, 0.0)
                .field("model", "X100")
                .build()
                .unwrap(),
        }
    }

    #[tokio::test]
    async fn should_replace_document_on_upsert() {
        let store = MemoryAttributeStore::new();
        store.upsert(document(1, 10.0)).await.unwrap();
        store.upsert(document(1, 20.0)).await.unwrap();

        let found = store.find(SensorId::new(1)).await.unwrap().unwrap();
        assert!((found.latitude - 20.0).abs() < f64::EPSILON);
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_treat_missing_delete_as_success() {
        let store = MemoryAttributeStore::new();
        assert!(store.delete(SensorId::new(3)).await.is_ok());
        assert!(store.find(SensorId::new(3)).await.unwrap().is_none());
    }
}
