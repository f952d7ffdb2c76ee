//! # sensorhub-adapter-memory
//!
//! In-process implementations of the storage ports.
//!
//! ## Provided stores
//!
//! | Store | Port | Notes |
//! |-------|------|-------|
//! | [`MemoryIdentityStore`] | `IdentityStore` | Sequential ids starting at 1, unique names |
//! | [`MemoryAttributeStore`] | `AttributeStore` | Documents keyed by sensor id |
//! | [`MemoryTelemetryCache`] | `TelemetryCache` | Latest reading per sensor, lost on restart |
//!
//! The telemetry cache is the default cache backend of `sensorhubd`: latest
//! readings are volatile by nature, like a Redis key. The identity and
//! attribute stores are meant for ephemeral deployments and tests.
//!
//! Locks are plain `std::sync::RwLock`s released before any future is
//! returned, so nothing is held across an `.await`.
//!
//! ## Dependency rule
//!
//! Depends on `sensorhub-app` (port traits) and `sensorhub-domain` only.

mod attributes;
mod identity;
mod telemetry;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use attributes::MemoryAttributeStore;
pub use identity::MemoryIdentityStore;
pub use telemetry::MemoryTelemetryCache;

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
