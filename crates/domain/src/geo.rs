//! Geographic primitives: points and the inclusive box used by area queries.
//!
//! Area queries are box queries: latitude and longitude bounds are checked
//! independently, there is no circular distance computation.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check that both coordinates are finite and within WGS84 bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidLatitude`] or
    /// [`ValidationError::InvalidLongitude`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::InvalidLatitude(self.latitude));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::InvalidLongitude(self.longitude));
        }
        Ok(())
    }
}

/// Axis-aligned box `[lat ± r] × [lon ± r]`, inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl BoundingBox {
    /// Build the box centred on `center` extending `radius` degrees on each axis.
    ///
    /// The centre is not range-checked, so boxes may extend past the poles or
    /// the antimeridian; nothing wraps.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRadius`] if `radius` is negative or
    /// not finite, and a coordinate error if the centre is not finite.
    pub fn around(center: GeoPoint, radius: f64) -> Result<Self, ValidationError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(ValidationError::InvalidRadius(radius));
        }
        if !center.latitude.is_finite() {
            return Err(ValidationError::InvalidLatitude(center.latitude));
        }
        if !center.longitude.is_finite() {
            return Err(ValidationError::InvalidLongitude(center.longitude));
        }
        Ok(Self {
            min_latitude: center.latitude - radius,
            max_latitude: center.latitude + radius,
            min_longitude: center.longitude - radius,
            max_longitude: center.longitude + radius,
        })
    }

    /// Inclusive containment test (`gte`/`lte` on both axes).
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        self.contains_latitude(point.latitude) && self.contains_longitude(point.longitude)
    }

    #[must_use]
    pub fn contains_latitude(&self, latitude: f64) -> bool {
        self.min_latitude <= latitude && latitude <= self.max_latitude
    }

    #[must_use]
    pub fn contains_longitude(&self, longitude: f64) -> bool {
        self.min_longitude <= longitude && longitude <= self.max_longitude
    }
}
