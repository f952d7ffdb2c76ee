//! # sensorhub-domain
//!
//! Pure domain model for the sensorhub registry and telemetry service.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Sensors** (identity: store-assigned id + unique name)
//! - Define **Attributes** (static per-sensor metadata, including location)
//! - Define **Telemetry** (latest reading per sensor, no history)
//! - Define **Views** (the merged, presentation-only sensor projection)
//! - Define **Geo** primitives (points and inclusive bounding boxes)
//! - Define the **Consistency** reports produced by multi-store writes
//! - Contain all invariant enforcement and validation
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod attributes;
pub mod consistency;
pub mod geo;
pub mod sensor;
pub mod telemetry;
pub mod value;
pub mod view;

/// Keys that attribute documents and telemetry payloads may not use, because
/// the merged [`view::SensorView`] already owns them.
pub const RESERVED_KEYS: [&str; 5] = ["id", "name", "latitude", "longitude", "recorded_at"];
