//! Sensor view: the merged, never-persisted projection handed to callers.

use serde::Serialize;

use crate::attributes::SensorAttributes;
use crate::id::SensorId;
use crate::sensor::Sensor;
use crate::telemetry::TelemetryReading;
use crate::time::Timestamp;
use crate::value::ValueMap;

/// Identity, attributes and latest telemetry of one sensor, serialized flat:
/// `{id, name, latitude, longitude, ...extra, ...payload, recorded_at}`.
///
/// Attributes may be absent (a sensor whose document write never landed);
/// they are then simply omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorView {
    pub id: SensorId,
    pub name: String,
    #[serde(flatten)]
    pub attributes: Option<SensorAttributes>,
    #[serde(flatten)]
    pub telemetry: ValueMap,
    pub recorded_at: Timestamp,
}

impl SensorView {
    /// Merge the three parts of a sensor.
    #[must_use]
    pub fn merge(
        sensor: Sensor,
        attributes: Option<SensorAttributes>,
        reading: TelemetryReading,
    ) -> Self {
        Self {
            id: sensor.id,
            name: sensor.name,
            attributes,
            telemetry: reading.payload,
            recorded_at: reading.recorded_at,
        }
    }
}
