//! Sensor identifiers.
//!
//! Sensor ids are assigned by the identity store (an auto-incrementing
//! integer) and never change afterwards. Names are human-assigned and unique,
//! so a sensor can be addressed by either one through [`SensorKey`].

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a [`Sensor`](crate::sensor::Sensor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SensorId(i64);

impl SensorId {
    /// Wrap a raw identifier handed out by the identity store.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Access the inner integer.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for SensorId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SensorId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// The two ways a caller can address a sensor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SensorKey {
    Id(SensorId),
    Name(String),
}

impl From<SensorId> for SensorKey {
    fn from(id: SensorId) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for SensorKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for SensorKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl fmt::Display for SensorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "#{id}"),
            Self::Name(name) => write!(f, "{name:?}"),
        }
    }
}
