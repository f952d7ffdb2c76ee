//! # sensorhub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `IdentityStore` — sensor id/name identity (relational store)
//!   - `AttributeStore` — static per-sensor documents (document store)
//!   - `TelemetryCache` — latest reading per sensor (key-value store)
//! - Define **driving/inbound ports** as use-case structs:
//!   - `SensorCoordinator` — ordered multi-store writes with compensation
//!   - `QueryFacade` — merged reads and area queries
//! - Provide **in-process infrastructure** that doesn't need IO
//!   (the spatial index)
//!
//! ## Dependency rule
//! Depends on `sensorhub-domain` only (plus `tokio` for task spawning and joins).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod services;
pub mod spatial_index;

#[cfg(test)]
pub(crate) mod testing;
