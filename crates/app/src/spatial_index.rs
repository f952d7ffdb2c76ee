//! In-memory spatial index over sensor locations.
//!
//! Points are kept in an array sorted by latitude. A box query binary-searches
//! the latitude band and filters the band linearly on longitude, so it never
//! scans sensors outside the band.
//!
//! The index is the only shared mutable structure in the process. It sits
//! behind a [`RwLock`]: queries share the read side, inserts and removals take
//! the write side, so no query observes a half-applied update. The lock is
//! never held across an `.await`.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use sensorhub_domain::attributes::StoredAttributes;
use sensorhub_domain::error::ValidationError;
use sensorhub_domain::geo::{BoundingBox, GeoPoint};
use sensorhub_domain::id::SensorId;

#[derive(Debug, Clone)]
struct Entry {
    point: GeoPoint,
    id: SensorId,
    name: String,
}

#[derive(Debug, Default)]
struct Inner {
    /// Sorted by `(latitude, id)` using `f64::total_cmp`.
    entries: Vec<Entry>,
    positions: HashMap<SensorId, GeoPoint>,
}

impl Inner {
    fn from_entries(entries: Vec<Entry>) -> Self {
        // Last document wins for a repeated id.
        let unique: HashMap<SensorId, Entry> = entries.into_iter().map(|e| (e.id, e)).collect();
        let mut entries: Vec<Entry> = unique.into_values().collect();
        entries.sort_by(|a, b| {
            a.point
                .latitude
                .total_cmp(&b.point.latitude)
                .then(a.id.cmp(&b.id))
        });
        let positions = entries.iter().map(|e| (e.id, e.point)).collect();
        Self { entries, positions }
    }

    fn slot(&self, latitude: f64, id: SensorId) -> usize {
        self.entries.partition_point(|e| {
            e.point
                .latitude
                .total_cmp(&latitude)
                .then(e.id.cmp(&id))
                .is_lt()
        })
    }

    fn remove(&mut self, id: SensorId) -> bool {
        let Some(point) = self.positions.remove(&id) else {
            return false;
        };
        let slot = self.slot(point.latitude, id);
        if self.entries.get(slot).is_some_and(|e| e.id == id) {
            self.entries.remove(slot);
        }
        true
    }

    fn insert(&mut self, entry: Entry) {
        self.remove(entry.id);
        let slot = self.slot(entry.point.latitude, entry.id);
        self.positions.insert(entry.id, entry.point);
        self.entries.insert(slot, entry);
    }

    fn hits(&self, bbox: &BoundingBox) -> Vec<IndexHit> {
        let start = self
            .entries
            .partition_point(|e| e.point.latitude < bbox.min_latitude);
        let end = self
            .entries
            .partition_point(|e| e.point.latitude <= bbox.max_latitude);
        if start >= end {
            return Vec::new();
        }
        let mut hits: Vec<IndexHit> = self.entries[start..end]
            .iter()
            .filter(|e| bbox.contains_longitude(e.point.longitude))
            .map(|e| IndexHit {
                id: e.id,
                name: e.name.clone(),
            })
            .collect();
        hits.sort_unstable_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        hits
    }
}

/// A sensor found by a box query.
///
/// The name is the one recorded in the attributes document the entry was
/// built from; only `id` identifies the sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexHit {
    pub id: SensorId,
    pub name: String,
}

/// Latitude-sorted point index mapping sensors to their location.
#[derive(Debug, Default)]
pub struct SpatialIndex {
    inner: RwLock<Inner>,
}

impl SpatialIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert a sensor, replacing its previous location if it was indexed.
    pub fn insert(&self, id: SensorId, name: impl Into<String>, point: GeoPoint) {
        let entry = Entry {
            point,
            id,
            name: name.into(),
        };
        self.write().insert(entry);
    }

    /// Remove a sensor; returns whether it was indexed.
    pub fn remove(&self, id: SensorId) -> bool {
        self.write().remove(id)
    }

    /// Replace the whole index with the given documents.
    ///
    /// The new contents are sorted before the write lock is taken, so readers
    /// are only blocked for the swap.
    pub fn rebuild(&self, documents: impl IntoIterator<Item = StoredAttributes>) {
        let entries = documents
            .into_iter()
            .map(|doc| Entry {
                point: doc.attributes.location(),
                id: doc.sensor_id,
                name: doc.sensor_name,
            })
            .collect();
        let rebuilt = Inner::from_entries(entries);
        *self.write() = rebuilt;
    }

    /// Names of sensors inside the inclusive box `[lat ± r] × [lon ± r]`,
    /// sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a negative or non-finite radius, or a
    /// non-finite centre.
    pub fn near(
        &self,
        latitude: f64,
        longitude: f64,
        radius: f64,
    ) -> Result<Vec<String>, ValidationError> {
        let bbox = BoundingBox::around(GeoPoint::new(latitude, longitude), radius)?;
        Ok(self.within(&bbox))
    }

    /// Names of sensors inside `bbox`, sorted by name.
    #[must_use]
    pub fn within(&self, bbox: &BoundingBox) -> Vec<String> {
        self.hits_within(bbox)
            .into_iter()
            .map(|hit| hit.name)
            .collect()
    }

    /// Entries inside `bbox`, sorted by name then id.
    #[must_use]
    pub fn hits_within(&self, bbox: &BoundingBox) -> Vec<IndexHit> {
        self.read().hits(bbox)
    }

    #[must_use]
    pub fn contains(&self, id: SensorId) -> bool {
        self.read().positions.contains_key(&id)
    }

    /// Indexed location of a sensor.
    #[must_use]
    pub fn location(&self, id: SensorId) -> Option<GeoPoint> {
        self.read().positions.get(&id).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorhub_domain::attributes::SensorAttributes;
    use std::sync::Arc;

    fn id(raw: i64) -> SensorId {
        SensorId::new(raw)
    }

    fn doc(raw: i64, name: &str, latitude: f64, longitude: f64) -> StoredAttributes {
        StoredAttributes {
            sensor_id: id(raw),
            sensor_name: name.to_string(),
            attributes: SensorAttributes::builder()
                .location(latitude, longitude)
                .build()
                .unwrap(),
        }
    }

    #[test]
    fn should_find_sensor_at_query_center() {
        let index = SpatialIndex::new();
        index.insert(id(1), "s1", GeoPoint::new(10.0, 20.0));

        assert_eq!(index.near(10.0, 20.0, 0.5).unwrap(), vec!["s1"]);
    }

    #[test]
    fn should_include_sensor_exactly_on_upper_latitude_bound() {
        let index = SpatialIndex::new();
        index.insert(id(1), "edge", GeoPoint::new(10.5, 20.0));

        assert_eq!(index.near(10.0, 20.0, 0.5).unwrap(), vec!["edge"]);
    }

    #[test]
    fn should_include_every_boundary_and_exclude_outside() {
        let index = SpatialIndex::new();
        index.insert(id(1), "north", GeoPoint::new(11.0, 20.0));
        index.insert(id(2), "south", GeoPoint::new(9.0, 20.0));
        index.insert(id(3), "east", GeoPoint::new(10.0, 21.0));
        index.insert(id(4), "west", GeoPoint::new(10.0, 19.0));
        index.insert(id(5), "far-north", GeoPoint::new(11.25, 20.0));
        index.insert(id(6), "far-east", GeoPoint::new(10.0, 21.25));

        let found = index.near(10.0, 20.0, 1.0).unwrap();
        assert_eq!(found, vec!["east", "north", "south", "west"]);
    }

    #[test]
    fn should_filter_on_longitude_inside_latitude_band() {
        let index = SpatialIndex::new();
        index.insert(id(1), "in", GeoPoint::new(10.0, 20.0));
        index.insert(id(2), "same-lat-far-lon", GeoPoint::new(10.0, 80.0));

        assert_eq!(index.near(10.0, 20.0, 0.5).unwrap(), vec!["in"]);
    }

    #[test]
    fn should_replace_location_on_reinsert() {
        let index = SpatialIndex::new();
        index.insert(id(1), "mover", GeoPoint::new(10.0, 20.0));
        index.insert(id(1), "mover", GeoPoint::new(-40.0, 100.0));

        assert_eq!(index.len(), 1);
        assert!(index.near(10.0, 20.0, 1.0).unwrap().is_empty());
        assert_eq!(index.near(-40.0, 100.0, 0.0).unwrap(), vec!["mover"]);
        assert_eq!(index.location(id(1)), Some(GeoPoint::new(-40.0, 100.0)));
    }

    #[test]
    fn should_remove_only_the_requested_sensor_among_equal_latitudes() {
        let index = SpatialIndex::new();
        index.insert(id(1), "a", GeoPoint::new(5.0, 1.0));
        index.insert(id(2), "b", GeoPoint::new(5.0, 2.0));
        index.insert(id(3), "c", GeoPoint::new(5.0, 3.0));

        assert!(index.remove(id(2)));
        assert!(!index.remove(id(2)));
        assert_eq!(index.near(5.0, 2.0, 1.0).unwrap(), vec!["a", "c"]);
        assert!(!index.contains(id(2)));
    }

    #[test]
    fn should_match_brute_force_filter() {
        let index = SpatialIndex::new();
        let mut points = Vec::new();
        for i in 0..200_i32 {
            let lat = f64::from((i * 37) % 180 - 90) * 0.5;
            let lon = f64::from((i * 53) % 360 - 180) * 0.5;
            let name = format!("s{i:03}");
            index.insert(id(i64::from(i)), name.clone(), GeoPoint::new(lat, lon));
            points.push((name, GeoPoint::new(lat, lon)));
        }

        let bbox = BoundingBox::around(GeoPoint::new(3.0, -7.5), 12.5).unwrap();
        let mut expected: Vec<String> = points
            .into_iter()
            .filter(|(_, p)| bbox.contains(*p))
            .map(|(name, _)| name)
            .collect();
        expected.sort();

        assert_eq!(index.within(&bbox), expected);
    }

    #[test]
    fn should_rebuild_from_documents() {
        let index = SpatialIndex::new();
        index.insert(id(99), "stale", GeoPoint::new(0.0, 0.0));

        index.rebuild(vec![doc(1, "s1", 10.0, 20.0), doc(2, "s2", 10.2, 20.2)]);

        assert_eq!(index.len(), 2);
        assert!(!index.contains(id(99)));
        assert_eq!(index.near(10.0, 20.0, 0.5).unwrap(), vec!["s1", "s2"]);
    }

    #[test]
    fn should_report_ids_of_entries_sharing_a_name() {
        let index = SpatialIndex::new();
        index.rebuild(vec![doc(2, "x", 10.1, 20.0), doc(1, "x", 10.0, 20.0)]);

        let bbox = BoundingBox::around(GeoPoint::new(10.0, 20.0), 0.5).unwrap();
        let ids: Vec<SensorId> = index.hits_within(&bbox).iter().map(|h| h.id).collect();

        assert_eq!(ids, vec![id(1), id(2)]);
    }

    #[test]
    fn should_reject_negative_radius() {
        let index = SpatialIndex::new();
        assert!(index.near(0.0, 0.0, -0.1).is_err());
    }

    #[test]
    fn should_serve_concurrent_readers_and_writers() {
        let index = Arc::new(SpatialIndex::new());
        let writers: Vec<_> = (0..4_i64)
            .map(|t| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || {
                    for i in 0..250 {
                        let raw = t * 1000 + i;
                        index.insert(id(raw), format!("s{raw}"), GeoPoint::new(1.0, 1.0));
                    }
                })
            })
            .collect();
        let reader = {
            let index = Arc::clone(&index);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    let found = index.near(1.0, 1.0, 0.0).unwrap();
                    assert!(found.len() <= 1000);
                }
            })
        };

        for handle in writers {
            handle.join().unwrap();
        }
        reader.join().unwrap();
        assert_eq!(index.len(), 1000);
    }
}
