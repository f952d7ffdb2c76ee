//! Common error types used across the workspace.
//!
//! Ports return [`StoreError`]; the coordinator and facade wrap those into
//! [`SensorHubError`] so callers above the core never see a raw store error.

use std::fmt;

use crate::id::{SensorId, SensorKey};

/// Boxed error produced by a backing store client.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which of the three backing stores an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    Identity,
    Attributes,
    Telemetry,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Identity => "identity",
            Self::Attributes => "attributes",
            Self::Telemetry => "telemetry",
        })
    }
}

/// Error returned by a port implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The write hit a uniqueness constraint.
    #[error("{store} store rejected a conflicting write")]
    Conflict { store: StoreKind },

    /// Transport or backend failure.
    #[error("{store} store unavailable")]
    Unavailable {
        store: StoreKind,
        #[source]
        source: BoxError,
    },
}

impl StoreError {
    /// Wrap a backend error as [`StoreError::Unavailable`].
    pub fn unavailable(store: StoreKind, source: impl Into<BoxError>) -> Self {
        Self::Unavailable {
            store,
            source: source.into(),
        }
    }

    /// The store this error originated from.
    #[must_use]
    pub fn store(&self) -> StoreKind {
        match self {
            Self::Conflict { store } | Self::Unavailable { store, .. } => *store,
        }
    }
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("name must not start or end with whitespace")]
    UntrimmedName,

    #[error("name must be at most {max} characters")]
    NameTooLong { max: usize },

    #[error("latitude {0} is outside -90..=90")]
    InvalidLatitude(f64),

    #[error("longitude {0} is outside -180..=180")]
    InvalidLongitude(f64),

    #[error("radius {0} must be a finite, non-negative number")]
    InvalidRadius(f64),

    #[error("telemetry payload must not be empty")]
    EmptyPayload,

    #[error("key {0:?} is reserved")]
    ReservedKey(String),
}

/// Top-level error for every operation the core exposes.
#[derive(Debug, thiserror::Error)]
pub enum SensorHubError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("a sensor named {name:?} already exists")]
    DuplicateSensor { name: String },

    #[error("sensor {0} not found")]
    SensorNotFound(SensorKey),

    #[error("no telemetry recorded for sensor #{0}")]
    TelemetryNotFound(SensorId),

    /// The attributes document could not be written during creation.
    /// `rolled_back` tells whether the identity row was removed again.
    #[error("failed to write attributes for sensor {name:?}")]
    AttributesWriteFailed {
        name: String,
        rolled_back: bool,
        #[source]
        source: StoreError,
    },

    #[error("backing store unavailable")]
    StoreUnavailable(#[from] StoreError),

    /// A write sequence could not run to its end state because the runtime
    /// shut down underneath it.
    #[error("write sequence interrupted")]
    Interrupted,
}

impl SensorHubError {
    /// `true` for failures the caller can fix by changing the request.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::DuplicateSensor { .. }
                | Self::SensorNotFound(_)
                | Self::TelemetryNotFound(_)
        )
    }
}
