//! Telemetry: the latest reading of a sensor, owned by the telemetry cache.
//!
//! Only one reading per sensor exists at a time: every write replaces the
//! previous one in full.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::SensorId;
use crate::time::Timestamp;
use crate::value::{ValueMap, ensure_no_reserved_keys};

/// Latest reading for a sensor, stamped with the time it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryReading {
    pub sensor_id: SensorId,
    pub payload: ValueMap,
    pub recorded_at: Timestamp,
}

impl TelemetryReading {
    #[must_use]
    pub fn new(sensor_id: SensorId, payload: ValueMap, recorded_at: Timestamp) -> Self {
        Self {
            sensor_id,
            payload,
            recorded_at,
        }
    }
}

/// Check that a payload can be recorded.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyPayload`] for an empty map and
/// [`ValidationError::ReservedKey`] when a key collides with a view field.
pub fn validate_payload(payload: &ValueMap) -> Result<(), ValidationError> {
    if payload.is_empty() {
        return Err(ValidationError::EmptyPayload);
    }
    ensure_no_reserved_keys(payload)
}
