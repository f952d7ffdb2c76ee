//! Outcome types of multi-store writes and consistency scans.

use std::fmt;

use serde::Serialize;

use crate::attributes::SensorAttributes;
use crate::id::SensorId;
use crate::sensor::Sensor;

/// Result of creating a sensor: identity plus the attributes that were stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    #[serde(flatten)]
    pub sensor: Sensor,
    #[serde(flatten)]
    pub attributes: SensorAttributes,
}

/// A dependent record that deletion could not remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupStep {
    Attributes,
    Telemetry,
}

impl fmt::Display for CleanupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Attributes => "attributes",
            Self::Telemetry => "telemetry",
        })
    }
}

/// One failed cleanup sub-step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupFailure {
    pub step: CleanupStep,
    pub reason: String,
}

/// Warning attached to a successful deletion: the identity row is gone but
/// some dependent records were left behind as orphans.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupIncomplete {
    pub failures: Vec<CleanupFailure>,
}

impl CleanupIncomplete {
    pub fn push(&mut self, step: CleanupStep, reason: impl fmt::Display) {
        self.failures.push(CleanupFailure {
            step,
            reason: reason.to_string(),
        });
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// `None` when every sub-step succeeded.
    #[must_use]
    pub fn into_warning(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }
}

/// Result of deleting a sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deletion {
    pub sensor: Sensor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup_incomplete: Option<CleanupIncomplete>,
}

impl Deletion {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cleanup_incomplete.is_none()
    }
}

/// Dependent records that have no identity row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrphanReport {
    pub attributes: Vec<SensorId>,
    pub telemetry: Vec<SensorId>,
}

impl OrphanReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.telemetry.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len() + self.telemetry.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_drop_empty_warning() {
        assert!(CleanupIncomplete::default().into_warning().is_none());
    }

    #[test]
    fn should_keep_non_empty_warning() {
        let mut warning = CleanupIncomplete::default();
        warning.push(CleanupStep::Telemetry, "timeout");
        let warning = warning.into_warning().unwrap();
        assert_eq!(warning.failures[0].step, CleanupStep::Telemetry);
        assert_eq!(warning.failures[0].reason, "timeout");
    }

    #[test]
    fn should_skip_absent_warning_when_serializing() {
        let deletion = Deletion {
            sensor: Sensor::new(SensorId::new(1), "s1"),
            cleanup_incomplete: None,
        };
        let json = serde_json::to_value(&deletion).unwrap();
        assert!(json.get("cleanup_incomplete").is_none());
        assert!(deletion.is_complete());
    }
}
