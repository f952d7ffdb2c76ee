//! Sensor attributes: static per-sensor metadata owned by the attribute store.
//!
//! Documents are keyed by the immutable [`SensorId`]; the sensor name is kept
//! alongside only so that listings can be read without a join.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::geo::GeoPoint;
use crate::id::SensorId;
use crate::value::{AttributeValue, ValueMap, ensure_no_reserved_keys};

/// Location plus arbitrary additional fields (model, firmware, …).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorAttributes {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(flatten)]
    pub extra: ValueMap,
}

impl SensorAttributes {
    /// Create a builder for constructing [`SensorAttributes`].
    #[must_use]
    pub fn builder() -> SensorAttributesBuilder {
        SensorAttributesBuilder::default()
    }

    #[must_use]
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when a coordinate is out of range or an
    /// extra field uses a reserved key.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.location().validate()?;
        ensure_no_reserved_keys(&self.extra)
    }
}

/// Step-by-step builder for [`SensorAttributes`].
#[derive(Debug, Default)]
pub struct SensorAttributesBuilder {
    location: Option<GeoPoint>,
    extra: ValueMap,
}

impl SensorAttributesBuilder {
    #[must_use]
    pub fn location(mut self, latitude: f64, longitude: f64) -> Self {
        self.location = Some(GeoPoint::new(latitude, longitude));
        self
    }

    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Consume the builder, validate, and return [`SensorAttributes`].
    ///
    /// A missing location defaults to `(0.0, 0.0)`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if invariants fail.
    pub fn build(self) -> Result<SensorAttributes, ValidationError> {
        let location = self.location.unwrap_or(GeoPoint::new(0.0, 0.0));
        let attributes = SensorAttributes {
            latitude: location.latitude,
            longitude: location.longitude,
            extra: self.extra,
        };
        attributes.validate()?;
        Ok(attributes)
    }
}

/// An attributes document as returned by the store's bulk listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAttributes {
    pub sensor_id: SensorId,
    pub sensor_name: String,
    pub attributes: SensorAttributes,
}
